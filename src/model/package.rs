//! Package description inputs: metadata, manifest, spine, and guide.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::util::{is_xml_id, media_type_for};

use super::outline::Outline;

/// Page progression direction stamped on the spine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(try_from = "String"))]
pub enum ReadingDirection {
    #[default]
    Ltr,
    Rtl,
}

impl ReadingDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl fmt::Display for ReadingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ltr" => Ok(Self::Ltr),
            "rtl" => Ok(Self::Rtl),
            other => Err(Error::InvalidDirection(other.to_string())),
        }
    }
}

impl TryFrom<String> for ReadingDirection {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Publication metadata. All text fields are expected to be markup-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct PackageMetadata {
    pub language: String,
    pub title: String,
    pub creator: String,
    pub publisher: String,
    pub rights: String,
    /// The unique identifier value (e.g. `urn:uuid:...`).
    pub identifier: String,
    /// XML id binding shared by `package@unique-identifier` and `dc:identifier@id`.
    pub identifier_id: String,
    /// Publication date (`dc:date`).
    pub date: String,
    /// Last modification timestamp (`dcterms:modified`).
    pub modified: String,
    pub direction: ReadingDirection,
    /// Heading of the navigation document.
    pub toc_title: String,
}

impl Default for PackageMetadata {
    fn default() -> Self {
        Self {
            language: String::new(),
            title: String::new(),
            creator: String::new(),
            publisher: String::new(),
            rights: String::new(),
            identifier: String::new(),
            identifier_id: "BookId".to_string(),
            date: String::new(),
            modified: String::new(),
            direction: ReadingDirection::Ltr,
            toc_title: "Table of Contents".to_string(),
        }
    }
}

impl PackageMetadata {
    /// Create metadata with the given title and defaults elsewhere.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    pub fn with_publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = publisher.into();
        self
    }

    pub fn with_rights(mut self, rights: impl Into<String>) -> Self {
        self.rights = rights.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    pub fn with_identifier_id(mut self, id: impl Into<String>) -> Self {
        self.identifier_id = id.into();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_modified(mut self, modified: impl Into<String>) -> Self {
        self.modified = modified.into();
        self
    }

    pub fn with_direction(mut self, direction: ReadingDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_toc_title(mut self, toc_title: impl Into<String>) -> Self {
        self.toc_title = toc_title.into();
        self
    }

    /// Check that every required field is present.
    ///
    /// A package cannot be produced with partial metadata, so this runs
    /// before anything is written.
    pub fn validate(&self) -> Result<()> {
        let required: [(&'static str, &str); 9] = [
            ("language", &self.language),
            ("title", &self.title),
            ("creator", &self.creator),
            ("publisher", &self.publisher),
            ("rights", &self.rights),
            ("identifier", &self.identifier),
            ("date", &self.date),
            ("modified", &self.modified),
            ("toc_title", &self.toc_title),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(Error::MetadataIncomplete(field));
            }
        }
        if !is_xml_id(&self.identifier_id) {
            return Err(Error::InvalidIdentifier(self.identifier_id.clone()));
        }
        Ok(())
    }
}

/// A file declared in the package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
pub struct ManifestItem {
    pub id: String,
    /// Path relative to the package document.
    pub href: String,
    pub media_type: String,
    /// Space-separated manifest properties (e.g. `cover-image`).
    #[cfg_attr(feature = "cli", serde(default))]
    pub properties: Option<String>,
}

impl ManifestItem {
    pub fn new(
        id: impl Into<String>,
        href: impl Into<String>,
        media_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            href: href.into(),
            media_type: media_type.into(),
            properties: None,
        }
    }

    /// Create an item whose media type is guessed from the href extension.
    pub fn guess(id: impl Into<String>, href: impl Into<String>) -> Self {
        let href = href.into();
        let media_type = media_type_for(&href);
        Self::new(id, href, media_type)
    }

    pub fn with_properties(mut self, properties: impl Into<String>) -> Self {
        self.properties = Some(properties.into());
        self
    }

    /// Whether this item is a content document that must be in the spine.
    pub fn is_content_document(&self) -> bool {
        self.media_type == "application/xhtml+xml"
    }
}

/// Reference from the spine to a manifest item.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
pub struct SpineEntry {
    pub idref: String,
    /// `false` marks auxiliary content outside the linear reading order.
    #[cfg_attr(feature = "cli", serde(default = "default_linear"))]
    pub linear: bool,
}

#[cfg(feature = "cli")]
fn default_linear() -> bool {
    true
}

impl SpineEntry {
    pub fn new(idref: impl Into<String>) -> Self {
        Self {
            idref: idref.into(),
            linear: true,
        }
    }

    pub fn non_linear(idref: impl Into<String>) -> Self {
        Self {
            idref: idref.into(),
            linear: false,
        }
    }
}

/// A landmark in the package `guide` block.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
pub struct GuideReference {
    /// Reference type, e.g. `toc`, `cover`, or `text`.
    #[cfg_attr(feature = "cli", serde(rename = "type"))]
    pub kind: String,
    pub title: String,
    pub href: String,
}

impl GuideReference {
    pub fn new(
        kind: impl Into<String>,
        title: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            href: href.into(),
        }
    }
}

/// Everything one build needs, as supplied by the orchestrator.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "cli", derive(serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct Package {
    pub metadata: PackageMetadata,
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<SpineEntry>,
    pub guide: Vec<GuideReference>,
    pub outline: Outline,
}

impl Package {
    pub fn new(metadata: PackageMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    /// Declare a content document and append it to the spine.
    pub fn add_document(&mut self, id: impl Into<String>, href: impl Into<String>) {
        let id = id.into();
        self.manifest
            .push(ManifestItem::new(id.clone(), href, "application/xhtml+xml"));
        self.spine.push(SpineEntry::new(id));
    }

    /// Declare a non-document resource (stylesheet, image, font).
    pub fn add_resource(&mut self, item: ManifestItem) {
        self.manifest.push(item);
    }
}
