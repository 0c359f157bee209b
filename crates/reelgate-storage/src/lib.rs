//! Blob sink abstraction for Reelgate.
//!
//! Uploaded payloads are handed to a `Storage` implementation and referenced
//! from upload records by an opaque storage key. The only backend in this
//! design is the local filesystem; the trait keeps the range-streaming
//! responder decoupled from where bytes actually live.
//!
//! **Key format:** keys are tenant-scoped: `media/{tenant_id}/{filename}`.

mod local;
mod traits;

pub use local::LocalStorage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
