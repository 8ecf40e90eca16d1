use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use image::ImageFormat;
use rand::Rng;

use crate::classify_client::{Classifier, HttpClassifier};
use crate::error::FeedError;
use crate::image_source::{DirImageSource, ImageSource, is_image_file};
use crate::io_struct::ClassificationResult;
use crate::latest_cache::{LatestCache, LatestEntry};

#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub host: String,
    pub port: u16,
    pub images_dir: PathBuf,
    pub classifier_url: String,
    pub timeout: u64,
    pub log_interval: u64,
}

#[derive(Clone)]
pub struct FeedState {
    pub source: Arc<dyn ImageSource>,
    pub classifier: Arc<dyn Classifier>,
    pub cache: Arc<LatestCache>,
    pub log_interval: u64,
}

impl FeedState {
    pub fn new(config: &FeedConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(FeedState {
            source: Arc::new(DirImageSource::new(config.images_dir.clone())),
            classifier: Arc::new(HttpClassifier::new(client, &config.classifier_url)),
            cache: Arc::new(LatestCache::new()),
            log_interval: config.log_interval,
        })
    }

    /// Wire the state from explicit collaborators. Tests use this to swap in
    /// deterministic sources and canned classifiers.
    pub fn from_parts(source: Arc<dyn ImageSource>, classifier: Arc<dyn Classifier>) -> Self {
        FeedState {
            source,
            classifier,
            cache: Arc::new(LatestCache::new()),
            log_interval: 60,
        }
    }

    /// Pick a random source image, classify it, and publish the new
    /// (image, result) pair. Any failure leaves the cache untouched.
    pub async fn trigger(&self) -> Result<ClassificationResult, FeedError> {
        let names = self.source.list()?;
        let mut candidates: Vec<String> = names.into_iter().filter(|n| is_image_file(n)).collect();
        if candidates.is_empty() {
            return Err(FeedError::NoImagesAvailable);
        }

        let index = rand::rng().random_range(0..candidates.len());
        let chosen = candidates.swap_remove(index);
        let raw = self.source.read(&chosen)?;

        let jpeg = tokio::task::spawn_blocking(move || normalize_to_jpeg(&raw))
            .await
            .map_err(|e| FeedError::Internal(format!("image task failed: {e}")))??;

        // The inference call can take a while; the cache is only touched once
        // the result is in hand.
        let result = self.classifier.predict(&chosen, jpeg.clone()).await?;

        self.cache.publish(LatestEntry {
            image: jpeg,
            result: result.clone(),
        });
        Ok(result)
    }

    /// The most recent (image, result) pair, or `None` before the first
    /// successful trigger.
    pub fn latest(&self) -> Option<Arc<LatestEntry>> {
        self.cache.snapshot()
    }

    /// Just the image portion of the latest entry.
    pub fn latest_image(&self) -> Option<Bytes> {
        self.cache.snapshot().map(|entry| entry.image.clone())
    }
}

/// Decode arbitrary image bytes, collapse any color mode to three-channel
/// RGB, and re-encode as JPEG. This is what gets sent to the classifier and
/// what the cache serves back.
pub fn normalize_to_jpeg(bytes: &[u8]) -> Result<Bytes, FeedError> {
    let decoded = image::load_from_memory(bytes).map_err(|_| FeedError::InvalidImage)?;
    let rgb = decoded.to_rgb8();

    let mut out = Vec::new();
    image::DynamicImage::ImageRgb8(rgb)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
        .map_err(|e| FeedError::Internal(format!("jpeg encode failed: {e}")))?;
    Ok(Bytes::from(out))
}
