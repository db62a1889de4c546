//! EPUB container constants, parsing, and verification.

mod parser;
mod verify;

pub use parser::{
    PackageDocument, ParsedItem, check_well_formed, has_element, parse_container_xml,
    parse_package_document,
};
pub use verify::{Verification, verify_epub, verify_epub_file};

/// Content of the `mimetype` entry.
pub const MIMETYPE: &[u8] = b"application/epub+zip";

/// Name of the first, uncompressed archive entry.
pub const MIMETYPE_PATH: &str = "mimetype";

/// Fixed location of the container descriptor.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";
