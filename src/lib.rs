//! # bindery
//!
//! Assembles EPUB 3 packages from a flat, depth-tagged document outline plus
//! pre-rendered content files.
//!
//! ## Features
//!
//! - Rebuild nested navigation (`nav.xhtml`, `toc.ncx`) from `(depth, title, target)` records
//! - Render the package document with manifest, spine, and guide
//! - Enforce container invariants: stored `mimetype` first, complete manifest,
//!   resolvable spine, well-formed navigation markup
//! - Read an archive back and verify those invariants
//!
//! ## Quick Start
//!
//! ```
//! use std::io::Cursor;
//! use bindery::io::MemorySource;
//! use bindery::{OutlineEntry, Package, PackageMetadata, verify_epub, write_epub_to_writer};
//!
//! let metadata = PackageMetadata::new("My Book")
//!     .with_language("en")
//!     .with_creator("Author Name")
//!     .with_publisher("Publisher")
//!     .with_rights("All rights reserved")
//!     .with_identifier("urn:uuid:6c1d2f4e-0000-4000-8000-000000000001")
//!     .with_date("2024-01-01")
//!     .with_modified("2024-01-01T00:00:00Z");
//!
//! let mut package = Package::new(metadata);
//! package.add_document("ch1", "chapter1.xhtml");
//! package.outline.push(OutlineEntry::new(1, "Chapter 1", "chapter1.xhtml"));
//! package.outline.push(OutlineEntry::new(2, "Section 1.1", "chapter1.xhtml#s1"));
//!
//! let source = MemorySource::new().with_file("chapter1.xhtml", b"<html/>".to_vec());
//! let mut out = Cursor::new(Vec::new());
//! write_epub_to_writer(&package, &source, &mut out)?;
//!
//! out.set_position(0);
//! let report = verify_epub(out)?;
//! assert_eq!(report.package_path, "OEBPS/content.opf");
//! # Ok::<(), bindery::Error>(())
//! ```

pub mod epub;
pub mod error;
pub mod export;
pub mod io;
pub mod model;
pub mod util;

pub use epub::{Verification, verify_epub, verify_epub_file};
pub use error::{Error, Result};
pub use export::{EpubAssembler, EpubConfig, write_epub, write_epub_to_writer};
pub use model::{
    DepthPolicy, GuideReference, ManifestItem, NavPoint, Outline, OutlineEntry, Package,
    PackageMetadata, ReadingDirection, SpineEntry,
};
