use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// On-disk form of a trained oblivious-tree ensemble.
///
/// Produced offline from the trained model and read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    #[serde(default = "default_model_name")]
    pub name: String,

    #[serde(default = "default_model_version")]
    pub version: String,

    /// Class emitted for each score index
    pub class_labels: Vec<i64>,

    /// Per-class starting score; zeros when absent
    #[serde(default)]
    pub bias: Vec<f64>,

    pub trees: Vec<TreeArtifact>,
}

/// One symmetric tree: every level shares the same split
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeArtifact {
    /// Split `i` sets bit `1 << i` of the leaf index
    pub splits: Vec<Split>,

    /// `2^depth` rows of per-class scores
    pub leaf_values: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Split {
    /// True when the numeric feature is strictly greater than `border`
    Float { feature: String, border: f64 },

    /// True when the categorical feature equals `value`
    OneHot { feature: String, value: String },
}

impl Split {
    pub fn feature(&self) -> &str {
        match self {
            Split::Float { feature, .. } | Split::OneHot { feature, .. } => feature,
        }
    }
}

/// Summary of a loaded model, reported by `/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: String,
    pub n_trees: usize,
    pub n_classes: usize,
    pub max_depth: usize,
}

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("Model file {0} not found")]
    NotFound(PathBuf),

    #[error("Failed to read model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to deserialize model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model: {0}")]
    Invalid(String),
}

fn default_model_name() -> String {
    "travel-satisfaction".to_string()
}

fn default_model_version() -> String {
    "unversioned".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_tagging() {
        let splits: Vec<Split> = serde_json::from_value(json!([
            {"type": "float", "feature": "Age", "border": 40.5},
            {"type": "one_hot", "feature": "Travel_Class", "value": "Economy"}
        ]))
        .unwrap();

        assert_eq!(
            splits[0],
            Split::Float {
                feature: "Age".to_string(),
                border: 40.5
            }
        );
        assert_eq!(splits[1].feature(), "Travel_Class");
    }

    #[test]
    fn test_artifact_defaults() {
        let artifact: ModelArtifact = serde_json::from_value(json!({
            "class_labels": [0, 1, 2],
            "trees": []
        }))
        .unwrap();

        assert_eq!(artifact.version, "unversioned");
        assert!(artifact.bias.is_empty());
    }
}
