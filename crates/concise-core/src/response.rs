use serde::{Deserialize, Serialize};

/// A generated answer: a short synopsis shown by default and the full text
/// revealed on expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiResponse {
    pub short: String,
    pub expanded: String,
}

impl AiResponse {
    pub fn new(short: impl Into<String>, expanded: impl Into<String>) -> Self {
        Self {
            short: short.into(),
            expanded: expanded.into(),
        }
    }
}
