//! EPUB 3 package assembler.
//!
//! Validates a [`Package`], renders the metainfo documents, and writes the
//! archive in the order readers expect: `mimetype` (stored), the container
//! descriptor, the package document, the navigation document, the legacy
//! NCX, and then every manifest file.

use std::collections::HashSet;
use std::io::{self, Seek, Write};
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::epub::{CONTAINER_PATH, MIMETYPE, MIMETYPE_PATH, check_well_formed};
use crate::error::{Error, Result};
use crate::io::ContentSource;
use crate::model::{DepthPolicy, Outline, Package};
use crate::util::{join_archive_path, sanitize_path, strip_fragment};

use super::container::render_container_xml;
use super::nav::build_nav_document;
use super::ncx::render_ncx;
use super::opf::{NAV_ID, NCX_ID, render_package_document};
use super::template::{NavTemplates, PackageTemplates};

const PACKAGE_HREF: &str = "content.opf";
const NAV_HREF: &str = "nav.xhtml";
const NCX_HREF: &str = "toc.ncx";

/// Configuration for EPUB assembly.
#[derive(Debug, Clone)]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
    /// Archive directory holding the package document and all manifest files.
    /// Empty places them at the archive root.
    pub content_dir: String,
    /// Treatment of outline entries that skip levels going down.
    pub depth_policy: DepthPolicy,
    /// Drop outline entries deeper than this before rendering.
    pub toc_depth: Option<usize>,
    /// Emit the navigation document as the first spine item.
    pub nav_in_spine: bool,
    pub nav_templates: NavTemplates,
    pub package_templates: PackageTemplates,
}

impl Default for EpubConfig {
    fn default() -> Self {
        Self {
            compression_level: None,
            content_dir: "OEBPS".to_string(),
            depth_policy: DepthPolicy::default(),
            toc_depth: None,
            nav_in_spine: true,
            nav_templates: NavTemplates::default(),
            package_templates: PackageTemplates::default(),
        }
    }
}

/// The rendered metainfo documents of one build.
#[derive(Debug, Clone)]
pub struct MetainfoDocuments {
    pub container: String,
    pub package: String,
    pub nav: String,
    pub ncx: String,
}

/// EPUB package assembler.
///
/// # Example
///
/// ```no_run
/// use bindery::export::EpubAssembler;
/// use bindery::io::DirSource;
/// use bindery::{OutlineEntry, Package, PackageMetadata};
///
/// let metadata = PackageMetadata::new("Manual")
///     .with_language("en")
///     .with_creator("Docs Team")
///     .with_publisher("Docs Team")
///     .with_rights("CC-BY")
///     .with_identifier("urn:uuid:0f1e2d3c")
///     .with_date("2024-01-01")
///     .with_modified("2024-01-01T00:00:00Z");
/// let mut package = Package::new(metadata);
/// package.add_document("index", "index.xhtml");
/// package.outline.push(OutlineEntry::new(1, "Welcome", "index.xhtml"));
///
/// EpubAssembler::new().write_to_path(&package, &DirSource::new("_build/epub"), "manual.epub")?;
/// # Ok::<(), bindery::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct EpubAssembler {
    config: EpubConfig,
}

impl EpubAssembler {
    /// Create a new assembler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the assembler with custom settings.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EpubConfig {
        &self.config
    }

    fn package_path(&self) -> String {
        join_archive_path(&self.config.content_dir, PACKAGE_HREF)
    }

    /// Normalize the outline according to the configured policy and depth.
    pub fn prepare_outline(&self, outline: &Outline) -> Result<Outline> {
        let outline = outline.clone().normalize(self.config.depth_policy)?;
        Ok(match self.config.toc_depth {
            Some(max) => outline.truncate_depth(max),
            None => outline,
        })
    }

    /// Validate the package and render every metainfo document.
    ///
    /// Nothing is written; every failure surfaces here, before the archive
    /// is started.
    pub fn render<S: ContentSource>(
        &self,
        package: &Package,
        source: &S,
    ) -> Result<MetainfoDocuments> {
        package.metadata.validate()?;
        let outline = self.prepare_outline(&package.outline)?;
        self.validate_manifest(package, source)?;

        let metadata = &package.metadata;
        let nav = build_nav_document(
            &outline,
            &metadata.language,
            &metadata.toc_title,
            &self.config.nav_templates,
        )?;

        let package_doc = render_package_document(
            metadata,
            &package.manifest,
            &package.spine,
            &package.guide,
            self.config.nav_in_spine,
            &self.config.package_templates,
        );
        check_well_formed(&package_doc)?;

        let ncx = render_ncx(metadata, &outline);
        check_well_formed(&ncx)?;

        Ok(MetainfoDocuments {
            container: render_container_xml(&self.package_path()),
            package: package_doc,
            nav,
            ncx,
        })
    }

    /// Check manifest, spine, and guide consistency against the content source.
    pub fn validate_manifest<S: ContentSource>(&self, package: &Package, source: &S) -> Result<()> {
        let generated = [PACKAGE_HREF, NAV_HREF, NCX_HREF];

        let mut ids: HashSet<&str> = HashSet::new();
        let mut hrefs: HashSet<String> = HashSet::new();
        for item in &package.manifest {
            let href = sanitize_path(&item.href);
            if item.id == NAV_ID || item.id == NCX_ID {
                return Err(Error::Reserved(item.id.clone()));
            }
            let entry = join_archive_path(&self.config.content_dir, &href);
            if generated.contains(&href.as_str())
                || entry == MIMETYPE_PATH
                || entry == CONTAINER_PATH
            {
                return Err(Error::Reserved(item.href.clone()));
            }
            if !ids.insert(item.id.as_str()) {
                return Err(Error::DuplicateId(item.id.clone()));
            }
            if !source.contains(&item.href) {
                return Err(Error::MissingFile(item.href.clone()));
            }
            if !hrefs.insert(href) {
                return Err(Error::DuplicateHref(item.href.clone()));
            }
        }

        let mut spined: HashSet<&str> = HashSet::new();
        if self.config.nav_in_spine {
            spined.insert(NAV_ID);
        }
        for entry in &package.spine {
            let idref = entry.idref.as_str();
            if !ids.contains(idref) && idref != NAV_ID {
                return Err(Error::UnknownSpineRef(entry.idref.clone()));
            }
            if !spined.insert(idref) {
                return Err(Error::DuplicateSpineRef(entry.idref.clone()));
            }
        }
        if let Some(item) = package
            .manifest
            .iter()
            .find(|item| item.is_content_document() && !spined.contains(item.id.as_str()))
        {
            return Err(Error::UnspinedDocument(item.id.clone()));
        }

        for reference in &package.guide {
            let target = sanitize_path(strip_fragment(&reference.href));
            if !hrefs.contains(&target) && target != NAV_HREF && target != NCX_HREF {
                return Err(Error::UnknownGuideTarget(reference.href.clone()));
            }
        }

        Ok(())
    }

    /// Assemble the package into any [`Write`] + [`Seek`] destination.
    pub fn assemble<W: Write + Seek, S: ContentSource>(
        &self,
        package: &Package,
        source: &S,
        writer: &mut W,
    ) -> Result<()> {
        let _span = tracing::info_span!("assemble", title = %package.metadata.title).entered();

        let docs = self.render(package, source)?;
        let content_dir = &self.config.content_dir;

        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64));

        // mimetype must be first and uncompressed
        zip.start_file(MIMETYPE_PATH, stored)?;
        zip.write_all(MIMETYPE)?;

        zip.start_file(CONTAINER_PATH, deflated)?;
        zip.write_all(docs.container.as_bytes())?;

        let generated = [
            (PACKAGE_HREF, &docs.package),
            (NAV_HREF, &docs.nav),
            (NCX_HREF, &docs.ncx),
        ];
        for (href, body) in generated {
            zip.start_file(join_archive_path(content_dir, href), deflated)?;
            zip.write_all(body.as_bytes())?;
        }

        for item in &package.manifest {
            let data = source.read(&item.href).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => Error::MissingFile(item.href.clone()),
                _ => Error::Io(e),
            })?;
            let path = join_archive_path(content_dir, &item.href);
            tracing::debug!(%path, bytes = data.len(), "adding file");
            zip.start_file(path, deflated)?;
            zip.write_all(&data)?;
        }

        zip.finish()?;
        tracing::info!(
            files = package.manifest.len(),
            spine = package.spine.len(),
            outline = package.outline.len(),
            "package assembled"
        );
        Ok(())
    }

    /// Assemble the package to `path`.
    ///
    /// The archive is written to a temporary file beside `path` and renamed
    /// into place only after it is complete; on failure the temporary file
    /// is removed and `path` is left untouched.
    pub fn write_to_path<S: ContentSource, P: AsRef<Path>>(
        &self,
        package: &Package,
        source: &S,
        path: P,
    ) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.assemble(package, source, tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::info!(path = %path.display(), "wrote package");
        Ok(())
    }
}

/// Assemble a package to a file on disk with default settings.
pub fn write_epub<S: ContentSource, P: AsRef<Path>>(
    package: &Package,
    source: &S,
    path: P,
) -> Result<()> {
    EpubAssembler::new().write_to_path(package, source, path)
}

/// Assemble a package into any [`Write`] + [`Seek`] destination with default settings.
pub fn write_epub_to_writer<W: Write + Seek, S: ContentSource>(
    package: &Package,
    source: &S,
    writer: &mut W,
) -> Result<()> {
    EpubAssembler::new().assemble(package, source, writer)
}
