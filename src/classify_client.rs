use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FeedError;
use crate::io_struct::{ClassificationResult, ErrorBody};

/// Capability the feed needs from a classifier: one image in, one
/// label/confidence pair out.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn predict(
        &self,
        file_name: &str,
        image: Bytes,
    ) -> Result<ClassificationResult, FeedError>;
}

/// Talks to the classifier service over HTTP, posting the image as a
/// multipart form the way the `/predict` endpoint expects it.
pub struct HttpClassifier {
    client: reqwest::Client,
    predict_url: String,
}

impl HttpClassifier {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        HttpClassifier {
            client,
            predict_url: format!("{}/predict", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn predict(
        &self,
        file_name: &str,
        image: Bytes,
    ) -> Result<ClassificationResult, FeedError> {
        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name(file_name.to_string())
            .mime_str("image/jpeg")
            .map_err(|e| FeedError::Internal(format!("building multipart payload: {e}")))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let resp = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FeedError::ClassificationFault("classifier request timed out".to_string())
                } else {
                    FeedError::ClassificationFault(format!("classifier request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if status.is_success() {
            return resp.json::<ClassificationResult>().await.map_err(|e| {
                FeedError::ClassificationFault(format!("malformed classifier response: {e}"))
            });
        }

        // A client-error status with a structured body means the classifier
        // rejected the payload; anything else is an invocation fault.
        let message = match resp.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("classifier returned status {status}"),
        };
        if status.is_client_error() {
            Err(FeedError::InvalidImage)
        } else {
            Err(FeedError::ClassificationFault(message))
        }
    }
}
