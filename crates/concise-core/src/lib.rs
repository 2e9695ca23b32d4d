pub mod attachment;
pub mod config;
pub mod conversation;
pub mod error;
pub mod response;

// Re-export common error type
pub use error::ConciseError;
