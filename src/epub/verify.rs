//! Read-back verification of assembled archives.

use std::collections::HashSet;
use std::io::{Read, Seek};
use std::path::Path;

use percent_encoding::percent_decode_str;
use zip::{CompressionMethod, ZipArchive};

use crate::error::{Error, Result};
use crate::util::decode_text;

use super::parser::{check_well_formed, has_element, parse_container_xml, parse_package_document};
use super::{CONTAINER_PATH, MIMETYPE, MIMETYPE_PATH};

/// Summary of a verified archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// Archive path of the package document.
    pub package_path: String,
    /// Archive path of the navigation document.
    pub nav_path: String,
    pub unique_identifier: String,
    pub manifest_items: usize,
    pub spine_items: usize,
    pub archive_entries: usize,
}

/// Verify an EPUB file on disk.
pub fn verify_epub_file<P: AsRef<Path>>(path: P) -> Result<Verification> {
    let file = std::fs::File::open(path)?;
    verify_epub(file)
}

/// Check the internal consistency invariants of an archive.
///
/// Fails with [`Error::InvalidEpub`] naming the first violation:
/// - the first entry is `mimetype`, stored, holding the exact marker
/// - `container.xml` names a package document present in the archive
/// - the unique identifier binding resolves to a `dc:identifier`
/// - every manifest href is in the archive and every other file is declared
/// - every spine idref resolves to a manifest id
/// - the navigation document is well-formed and has a `nav` element
pub fn verify_epub<R: Read + Seek>(reader: R) -> Result<Verification> {
    let mut archive = ZipArchive::new(reader)?;

    check_mimetype(&mut archive)?;

    let container = read_entry(&mut archive, CONTAINER_PATH)?;
    let package_path = parse_container_xml(&decode_text(&container, None))?;
    let package_dir = Path::new(&package_path)
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    let opf = read_entry(&mut archive, &package_path)?;
    let package = parse_package_document(&decode_text(&opf, None))?;

    if package.unique_identifier.is_empty() {
        return invalid("package has no unique-identifier attribute");
    }
    let bound = package
        .identifiers
        .iter()
        .any(|(id, value)| {
            id.as_deref() == Some(package.unique_identifier.as_str()) && !value.is_empty()
        });
    if !bound {
        return invalid(format!(
            "unique-identifier {:?} does not match any dc:identifier id",
            package.unique_identifier
        ));
    }

    let names: HashSet<String> = archive.file_names().map(str::to_string).collect();
    let mut ids = HashSet::new();
    let mut declared = HashSet::new();
    for item in &package.manifest {
        if !ids.insert(item.id.as_str()) {
            return invalid(format!("duplicate manifest id {:?}", item.id));
        }
        let href = percent_decode_str(&item.href).decode_utf8_lossy();
        let path = resolve(&package_dir, &href);
        if !names.contains(&path) {
            return invalid(format!("manifest href {:?} is not in the archive", item.href));
        }
        declared.insert(path);
    }

    for name in &names {
        let fixed = name == MIMETYPE_PATH || name == CONTAINER_PATH || *name == package_path;
        if !fixed && !name.ends_with('/') && !declared.contains(name) {
            return invalid(format!("archive entry {name:?} is not in the manifest"));
        }
    }

    for idref in &package.spine {
        if package.item(idref).is_none() {
            return invalid(format!("spine idref {idref:?} does not resolve"));
        }
    }

    let Some(nav) = package.nav_item() else {
        return invalid("no manifest item carries the nav property");
    };
    let nav_href = percent_decode_str(&nav.href).decode_utf8_lossy();
    let nav_path = resolve(&package_dir, &nav_href);
    let nav_bytes = read_entry(&mut archive, &nav_path)?;
    let nav_doc = decode_text(&nav_bytes, None);
    check_well_formed(&nav_doc)?;
    if !has_element(&nav_doc, b"nav")? {
        return invalid("navigation document has no nav element");
    }

    tracing::debug!(package = %package_path, entries = names.len(), "verified archive");

    Ok(Verification {
        package_path,
        nav_path,
        unique_identifier: package.unique_identifier,
        manifest_items: package.manifest.len(),
        spine_items: package.spine.len(),
        archive_entries: archive.len(),
    })
}

fn check_mimetype<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<()> {
    if archive.is_empty() {
        return invalid("archive is empty");
    }
    let mut first = archive.by_index(0)?;
    if first.name() != MIMETYPE_PATH {
        return invalid(format!("first entry is {:?}, not mimetype", first.name()));
    }
    if first.compression() != CompressionMethod::Stored {
        return invalid("mimetype entry is compressed");
    }
    let mut content = Vec::new();
    first.read_to_end(&mut content)?;
    if content != MIMETYPE {
        return invalid(format!(
            "mimetype entry holds {:?}",
            String::from_utf8_lossy(&content)
        ));
    }
    Ok(())
}

/// Archive entry name of an href relative to the package directory.
///
/// Resolution is literal: an href only matches the entry spelled exactly
/// like it below the package directory.
fn resolve(dir: &str, href: &str) -> String {
    if dir.is_empty() {
        href.to_string()
    } else {
        format!("{dir}/{href}")
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(name)
        .map_err(|_| Error::InvalidEpub(format!("missing archive entry {name:?}")))?;
    let mut buf = Vec::new();
    file.read_to_end(&mut buf)?;
    Ok(buf)
}

fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::InvalidEpub(msg.into()))
}
