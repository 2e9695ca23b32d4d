//! Configuration and secret file storage.

mod config_storage;
mod secret_storage;

pub use config_storage::ConfigStorage;
pub use secret_storage::{
    GEMINI_API_KEY_ENV, GOOGLE_API_KEY_ENV, OPENAI_API_KEY_ENV, OPENAI_MODEL_ENV, SecretStorage,
};
