//! Deterministic fakes and image fixtures shared by unit and integration
//! tests.

use std::collections::BTreeMap;
use std::io::{self, Cursor};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb, Rgba};

use crate::classify_client::Classifier;
use crate::error::FeedError;
use crate::image_source::ImageSource;
use crate::io_struct::ClassificationResult;

/// Solid-color PNG bytes.
pub fn png_fixture(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(rgb)));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Solid-color JPEG bytes.
pub fn jpeg_fixture(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(width, height, Rgb(rgb)));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Jpeg)
        .unwrap();
    out
}

/// Semi-transparent PNG bytes, for exercising RGB normalization.
pub fn rgba_png_fixture(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgba8(ImageBuffer::from_pixel(
        width,
        height,
        Rgba([200, 40, 40, 128]),
    ));
    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

/// Fixed in-memory image source.
#[derive(Debug, Default)]
pub struct StaticImageSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl StaticImageSource {
    pub fn new(files: impl IntoIterator<Item = (String, Vec<u8>)>) -> Self {
        StaticImageSource {
            files: files.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        StaticImageSource::default()
    }
}

impl ImageSource for StaticImageSource {
    fn list(&self) -> io::Result<Vec<String>> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, name.to_string()))
    }
}

/// Classifier that always answers with the same result and remembers how it
/// was called.
pub struct FixedClassifier {
    result: ClassificationResult,
    pub calls: AtomicUsize,
    pub last_file_name: Mutex<Option<String>>,
}

impl FixedClassifier {
    pub fn new(class: &str, confidence: f32) -> Self {
        FixedClassifier {
            result: ClassificationResult {
                class: class.to_string(),
                confidence,
            },
            calls: AtomicUsize::new(0),
            last_file_name: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Classifier for FixedClassifier {
    async fn predict(
        &self,
        file_name: &str,
        _image: Bytes,
    ) -> Result<ClassificationResult, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_file_name.lock().unwrap() = Some(file_name.to_string());
        Ok(self.result.clone())
    }
}

/// Classifier whose answer is derived from the file name it was handed,
/// so tests can check that image and result always travel together.
pub struct EchoClassifier;

#[async_trait]
impl Classifier for EchoClassifier {
    async fn predict(
        &self,
        file_name: &str,
        _image: Bytes,
    ) -> Result<ClassificationResult, FeedError> {
        Ok(ClassificationResult {
            class: file_name.to_string(),
            confidence: 0.75,
        })
    }
}

/// Classifier that can be flipped into a failing mode mid-test.
pub struct FlakyClassifier {
    inner: FixedClassifier,
    pub failing: std::sync::atomic::AtomicBool,
}

impl FlakyClassifier {
    pub fn new(class: &str, confidence: f32) -> Self {
        FlakyClassifier {
            inner: FixedClassifier::new(class, confidence),
            failing: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Classifier for FlakyClassifier {
    async fn predict(
        &self,
        file_name: &str,
        image: Bytes,
    ) -> Result<ClassificationResult, FeedError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(FeedError::ClassificationFault(
                "classifier unavailable".to_string(),
            ));
        }
        self.inner.predict(file_name, image).await
    }
}
