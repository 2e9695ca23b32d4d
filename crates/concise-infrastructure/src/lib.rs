pub mod attachment_policy;
pub mod extraction;
pub mod paths;
pub mod storage;

pub use crate::attachment_policy::AttachmentPolicy;
pub use crate::extraction::{BatchExtractor, ExtractionOutcome, format_for_ai};
pub use crate::paths::ConcisePaths;
pub use crate::storage::{ConfigStorage, SecretStorage};
