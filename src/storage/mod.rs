//! Blob storage backends.
//!
//! The blob store is the sole durable owner of documents; everything the
//! index holds is derived facts, rebuildable at any time. Backends are
//! addressed by `(workspace, path)` where `path` is the document path
//! without extension; how a backend lays keys out physically is its own
//! concern.

mod blob;
mod fs;
mod memory;

pub use blob::{BlobMetadata, BlobPage, BlobStore};
pub use fs::FilesystemBlobStore;
pub(crate) use fs::is_safe_segment_path;
pub use memory::MemoryBlobStore;
