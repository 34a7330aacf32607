//! Google Cloud Storage client.
//!
//! This crate provides:
//! - Byte uploads returning both the `gs://` URI and the public URL
//! - Object reads
//! - Content-addressed image naming
//! - The `presets.json` registry (load, save, merge-and-write)

pub mod client;
pub mod error;
pub mod registry;
pub mod store;

pub use client::{GcsClient, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use registry::{load_presets, load_presets_or_fallback, save_presets, update_presets};
pub use store::{content_key, public_url_for, upload_image, ObjectStore, StoredObject};
