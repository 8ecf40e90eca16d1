use serde::{Deserialize, Serialize};

/// Top-1 prediction for one image, as produced by the classifier service.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClassificationResult {
    pub class: String,
    /// Probability of `class` after softmax, rounded to 4 decimal digits.
    pub confidence: f32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TriggerResponse {
    pub status: String,
    pub result: ClassificationResult,
}

impl TriggerResponse {
    pub fn ok(result: ClassificationResult) -> Self {
        TriggerResponse {
            status: "ok".to_string(),
            result,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
        }
    }
}
