//! Content sources for package assembly.
//!
//! The assembler never walks the filesystem itself. It asks a
//! [`ContentSource`] for each manifest href, which keeps archive I/O testable
//! with in-memory content.

mod source;

pub use source::{ContentSource, DirSource, MemorySource};
