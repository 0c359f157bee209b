pub mod event;
pub mod upload;

pub use event::LifecycleEvent;
pub use upload::{UploadAck, UploadRecord, UploadResponse, UploadState, Verdict};
