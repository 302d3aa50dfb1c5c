pub mod check;
pub mod delete;
pub mod stream;
pub mod upload;

// Re-export the main handler functions
pub use check::check_audio;
pub use delete::{delete_audio, delete_missing_token, method_not_allowed};
pub use stream::stream_audio;
pub use upload::upload_audio;
