//! PDF page backend for pagemark, built on lopdf.
//!
//! Implements the `PageBackend` seam from `pagemark-core`: byte-level
//! rotate/delete/extract/reorder/merge plus page geometry extraction.
//! Content streams are never rewritten here; annotations stay in the
//! sidecar payload the core persists.

mod backend;

pub use backend::LopdfBackend;
