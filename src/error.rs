//! Error types for package assembly.

use thiserror::Error;

/// Errors that can occur while rendering or archiving a package.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Malformed outline at entry {index}: depth {depth} cannot follow depth {previous}")]
    MalformedOutline {
        index: usize,
        depth: usize,
        previous: usize,
    },

    #[error("Manifest file missing: {0}")]
    MissingFile(String),

    #[error("Missing required metadata field: {0}")]
    MetadataIncomplete(&'static str),

    #[error("Invalid unique identifier binding: {0:?}")]
    InvalidIdentifier(String),

    #[error("Invalid reading direction: {0:?} (expected \"ltr\" or \"rtl\")")]
    InvalidDirection(String),

    #[error("Duplicate manifest id: {0}")]
    DuplicateId(String),

    #[error("Duplicate manifest href: {0}")]
    DuplicateHref(String),

    #[error("Manifest id or href is reserved for a generated document: {0}")]
    Reserved(String),

    #[error("Spine references unknown manifest id: {0}")]
    UnknownSpineRef(String),

    #[error("Spine references manifest id more than once: {0}")]
    DuplicateSpineRef(String),

    #[error("Content document is not in the spine: {0}")]
    UnspinedDocument(String),

    #[error("Guide reference points outside the manifest: {0}")]
    UnknownGuideTarget(String),

    #[error("Generated document is not well-formed: {0}")]
    InvalidMarkup(String),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// I/O failures of the destination surface as `Io` whichever layer hit them.
impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(e) => Error::Io(e),
            other => Error::Zip(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
