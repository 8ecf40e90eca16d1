//! Core image transformations for the classifier input pipeline.

use image::RgbImage;
use image::imageops::{self, FilterType};
use tract_onnx::prelude::*;

use crate::error::ClassifierError;

/// Decode arbitrary image bytes into three-channel RGB. Palette, grayscale
/// and alpha modes are all collapsed to RGB8.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, ClassifierError> {
    let decoded = image::load_from_memory(bytes).map_err(|_| ClassifierError::InvalidImage)?;
    Ok(decoded.to_rgb8())
}

/// Resize so the shorter side equals `edge`, preserving aspect ratio.
pub fn resize_shortest_edge(img: &RgbImage, edge: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let scale = edge as f32 / w.min(h) as f32;
    let new_w = (w as f32 * scale).round().max(1.0) as u32;
    let new_h = (h as f32 * scale).round().max(1.0) as u32;
    imageops::resize(img, new_w, new_h, FilterType::Triangle)
}

/// Crop a centered `size` x `size` square.
pub fn center_crop(img: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = img.dimensions();
    let x = w.saturating_sub(size) / 2;
    let y = h.saturating_sub(size) / 2;
    imageops::crop_imm(img, x, y, size, size).to_image()
}

/// NCHW float tensor: pixel values scaled to `[0, 1]`, then normalized per
/// channel with the model's calibration mean and std.
pub fn to_tensor(img: &RgbImage, mean: &[f32; 3], std: &[f32; 3]) -> Tensor {
    let (w, h) = img.dimensions();
    tract_ndarray::Array4::from_shape_fn((1, 3, h as usize, w as usize), |(_, c, y, x)| {
        let v = img.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
        (v - mean[c]) / std[c]
    })
    .into()
}

/// Max-shifted softmax over the class logits.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Confidences are reported with 4 decimal digits.
pub fn round_confidence(p: f32) -> f32 {
    (p * 10_000.0).round() / 10_000.0
}
