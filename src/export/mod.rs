//! Rendering of the metainfo documents and archive assembly.
//!
//! # Architecture
//!
//! Every renderer is a pure function of its inputs plus a template struct:
//! - [`render_nav_document`] turns an [`Outline`](crate::Outline) into `nav.xhtml`
//! - [`render_ncx`] derives the legacy `toc.ncx` from the same outline
//! - [`render_package_document`] writes `content.opf`
//!
//! [`EpubAssembler`] validates a [`Package`](crate::Package), runs the
//! renderers, and writes the archive to any `Write + Seek` destination.

mod container;
mod epub;
mod nav;
mod ncx;
mod opf;
mod template;

pub use container::render_container_xml;
pub use epub::{EpubAssembler, EpubConfig, MetainfoDocuments, write_epub, write_epub_to_writer};
pub use nav::{build_nav_document, render_nav_document, render_nav_list};
pub use ncx::render_ncx;
pub use opf::{NAV_ID, NCX_ID, render_package_document};
pub use template::{NavTemplates, PackageTemplates, fill, fill_into};
