pub mod events_ws;
pub mod health;
pub mod login;
pub mod video_get;
pub mod video_stream;
pub mod video_upload;
