use std::path::Path;

use tract_onnx::prelude::*;

use super::config::ModelConfig;
use super::transforms;
use crate::error::ClassifierError;
use crate::io_struct::ClassificationResult;

/// A fixed ONNX classifier plus the label set it was trained on.
pub struct ImageModel {
    plan: SimplePlan<TypedFact, Box<dyn TypedOp>, TypedModel>,
    labels: Vec<String>,
    config: ModelConfig,
}

impl ImageModel {
    pub fn load(config: ModelConfig) -> anyhow::Result<Self> {
        let crop = config.crop_size as usize;
        let plan = tract_onnx::onnx()
            .model_for_path(&config.model_path)?
            .with_input_fact(0, f32::fact([1, 3, crop, crop]).into())?
            .into_optimized()?
            .into_runnable()?;

        let labels = load_labels(&config.labels_path)?;
        anyhow::ensure!(
            !labels.is_empty(),
            "labels file {} is empty",
            config.labels_path.display()
        );

        Ok(ImageModel {
            plan,
            labels,
            config,
        })
    }

    /// Decode, preprocess, run the model, and return the top-1 class with
    /// its softmax probability. Deterministic: identical bytes give
    /// identical results.
    pub fn classify(&self, image_bytes: &[u8]) -> Result<ClassificationResult, ClassifierError> {
        let rgb = transforms::decode_rgb(image_bytes)?;
        let resized = transforms::resize_shortest_edge(&rgb, self.config.resize_edge);
        let cropped = transforms::center_crop(&resized, self.config.crop_size);
        let input = transforms::to_tensor(&cropped, &self.config.mean, &self.config.std);

        let outputs = self
            .plan
            .run(tvec!(input.into_tvalue()))
            .map_err(|e| ClassifierError::Model(e.to_string()))?;
        let logits = outputs[0]
            .to_array_view::<f32>()
            .map_err(|e| ClassifierError::Model(e.to_string()))?;
        let logits: Vec<f32> = logits.iter().copied().collect();

        let probs = transforms::softmax(&logits);
        let (index, prob) = probs
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or_else(|| ClassifierError::Model("model produced no logits".to_string()))?;
        let class = self.labels.get(index).cloned().ok_or_else(|| {
            ClassifierError::Model(format!(
                "class index {index} out of range for {} labels",
                self.labels.len()
            ))
        })?;

        Ok(ClassificationResult {
            class,
            confidence: transforms::round_confidence(prob),
        })
    }
}

fn load_labels(path: &Path) -> anyhow::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_trimmed_and_blank_lines_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.txt");
        std::fs::write(&path, "tench\n goldfish \n\ngreat white shark\n").unwrap();

        let labels = load_labels(&path).unwrap();
        assert_eq!(labels, vec!["tench", "goldfish", "great white shark"]);
    }

    #[test]
    fn missing_labels_file_is_an_error() {
        assert!(load_labels(Path::new("/no/such/labels.txt")).is_err());
    }
}
