//! Core data model for package builds.
//!
//! This module contains:
//! - The flat outline and its tree reconstruction
//! - Package metadata, manifest, spine, and guide inputs

mod outline;
mod package;

pub use outline::{DepthPolicy, NavPoint, Outline, OutlineEntry};
pub use package::{
    GuideReference, ManifestItem, Package, PackageMetadata, ReadingDirection, SpineEntry,
};
