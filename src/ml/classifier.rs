use crate::error::{AppError, Result};
use crate::ml::models::{ModelArtifact, ModelLoadError, ModelMetadata, Split, TreeArtifact};
use crate::models::{FeatureRecord, FeatureValue};
use ndarray::{Array1, Array2};

/// Trait for classifiers
pub trait Classifier: Send + Sync {
    /// Predict the class label for a single record
    fn predict(&self, record: &FeatureRecord) -> Result<i64>;

    /// Get model metadata
    fn metadata(&self) -> &ModelMetadata;
}

/// Symmetric tree with its leaf table
#[derive(Debug, Clone)]
struct ObliviousTree {
    splits: Vec<Split>,
    /// Shape: (2^depth, n_classes)
    leaf_values: Array2<f64>,
}

impl ObliviousTree {
    fn from_artifact(index: usize, tree: TreeArtifact, n_classes: usize) -> std::result::Result<Self, ModelLoadError> {
        let depth = tree.splits.len();
        if depth >= usize::BITS as usize {
            return Err(ModelLoadError::Invalid(format!(
                "tree {index} is too deep ({depth} levels)"
            )));
        }

        let n_leaves = 1usize << depth;
        if tree.leaf_values.len() != n_leaves {
            return Err(ModelLoadError::Invalid(format!(
                "tree {index} has {} leaves, expected {n_leaves} for depth {depth}",
                tree.leaf_values.len()
            )));
        }

        for split in &tree.splits {
            let expect_numeric = matches!(split, Split::Float { .. });
            match FeatureRecord::is_numeric_column(split.feature()) {
                None => {
                    return Err(ModelLoadError::Invalid(format!(
                        "tree {index} splits on unknown feature '{}'",
                        split.feature()
                    )))
                }
                Some(is_numeric) if is_numeric != expect_numeric => {
                    return Err(ModelLoadError::Invalid(format!(
                        "tree {index} uses a {} split on '{}'",
                        if expect_numeric { "float" } else { "one-hot" },
                        split.feature()
                    )))
                }
                Some(_) => {}
            }
        }

        let mut flat = Vec::with_capacity(n_leaves * n_classes);
        for (leaf, values) in tree.leaf_values.into_iter().enumerate() {
            if values.len() != n_classes {
                return Err(ModelLoadError::Invalid(format!(
                    "tree {index} leaf {leaf} has {} scores, expected {n_classes}",
                    values.len()
                )));
            }
            flat.extend(values);
        }

        let leaf_values = Array2::from_shape_vec((n_leaves, n_classes), flat)
            .map_err(|e| ModelLoadError::Invalid(format!("tree {index}: {e}")))?;

        Ok(Self {
            splits: tree.splits,
            leaf_values,
        })
    }

    fn leaf_index(&self, record: &FeatureRecord) -> Result<usize> {
        let mut index = 0usize;

        for (level, split) in self.splits.iter().enumerate() {
            let goes_right = match (split, record.feature(split.feature())) {
                (Split::Float { border, .. }, Some(FeatureValue::Numeric(value))) => value > *border,
                (Split::OneHot { value, .. }, Some(FeatureValue::Categorical(category))) => {
                    category == value.as_str()
                }
                _ => {
                    return Err(AppError::Prediction(format!(
                        "feature '{}' does not match its split type",
                        split.feature()
                    )))
                }
            };

            if goes_right {
                index |= 1 << level;
            }
        }

        Ok(index)
    }
}

/// Gradient-boosted ensemble of oblivious trees (CatBoost layout)
#[derive(Debug, Clone)]
pub struct ForestClassifier {
    metadata: ModelMetadata,
    class_labels: Vec<i64>,
    bias: Array1<f64>,
    trees: Vec<ObliviousTree>,
}

impl ForestClassifier {
    /// Build a classifier from a deserialized artifact, checking its shape
    pub fn from_artifact(artifact: ModelArtifact) -> std::result::Result<Self, ModelLoadError> {
        let n_classes = artifact.class_labels.len();
        if n_classes == 0 {
            return Err(ModelLoadError::Invalid("no class labels".to_string()));
        }

        let bias = if artifact.bias.is_empty() {
            Array1::zeros(n_classes)
        } else if artifact.bias.len() == n_classes {
            Array1::from(artifact.bias)
        } else {
            return Err(ModelLoadError::Invalid(format!(
                "bias has {} entries, expected {n_classes}",
                artifact.bias.len()
            )));
        };

        let trees = artifact
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, tree)| ObliviousTree::from_artifact(index, tree, n_classes))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let metadata = ModelMetadata {
            name: artifact.name,
            version: artifact.version,
            n_trees: trees.len(),
            n_classes,
            max_depth: trees.iter().map(|t| t.splits.len()).max().unwrap_or(0),
        };

        Ok(Self {
            metadata,
            class_labels: artifact.class_labels,
            bias,
            trees,
        })
    }

    /// Summed raw scores for each class
    pub fn raw_scores(&self, record: &FeatureRecord) -> Result<Array1<f64>> {
        let mut scores = self.bias.clone();

        for tree in &self.trees {
            let leaf = tree.leaf_index(record)?;
            scores += &tree.leaf_values.row(leaf);
        }

        Ok(scores)
    }
}

impl Classifier for ForestClassifier {
    fn predict(&self, record: &FeatureRecord) -> Result<i64> {
        let scores = self.raw_scores(record)?;

        // First maximum wins on ties
        let best = scores
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &score)| match best {
                Some((_, top)) if score <= top => best,
                _ if score.is_nan() => best,
                _ => Some((i, score)),
            })
            .map(|(i, _)| i)
            .ok_or_else(|| AppError::Prediction("model produced no finite scores".to_string()))?;

        Ok(self.class_labels[best])
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PredictRequest;
    use serde_json::json;

    fn record(body: serde_json::Value) -> FeatureRecord {
        PredictRequest::from_json(&body).unwrap().into()
    }

    fn artifact(value: serde_json::Value) -> ModelArtifact {
        serde_json::from_value(value).unwrap()
    }

    /// Two trees: age splits High from Medium, economy class pushes towards Low
    fn sample_forest() -> ForestClassifier {
        ForestClassifier::from_artifact(artifact(json!({
            "name": "sample",
            "version": "1",
            "class_labels": [0, 1, 2],
            "trees": [
                {
                    "splits": [{"type": "float", "feature": "Age", "border": 40.0}],
                    "leaf_values": [[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]
                },
                {
                    "splits": [{"type": "one_hot", "feature": "Travel_Class", "value": "Economy"}],
                    "leaf_values": [[0.0, 0.0, 0.0], [0.0, 2.0, 0.0]]
                }
            ]
        })))
        .unwrap()
    }

    #[test]
    fn test_forest_leaf_selection() {
        let forest = sample_forest();

        assert_eq!(forest.predict(&record(json!({"age": 55}))).unwrap(), 0);
        assert_eq!(forest.predict(&record(json!({"age": 25}))).unwrap(), 2);
        assert_eq!(
            forest
                .predict(&record(json!({"age": 55, "travel_class": "Economy"})))
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_border_is_exclusive() {
        let forest = sample_forest();
        let scores = forest.raw_scores(&record(json!({"age": 40}))).unwrap();
        assert_eq!(scores.to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_multi_level_tree_index() {
        let forest = ForestClassifier::from_artifact(artifact(json!({
            "class_labels": [0, 1, 2, 7],
            "trees": [{
                "splits": [
                    {"type": "float", "feature": "Total_Price", "border": 500.0},
                    {"type": "one_hot", "feature": "Loyalty_Program_Member", "value": "Yes"}
                ],
                "leaf_values": [
                    [1.0, 0.0, 0.0, 0.0],
                    [0.0, 1.0, 0.0, 0.0],
                    [0.0, 0.0, 1.0, 0.0],
                    [0.0, 0.0, 0.0, 1.0]
                ]
            }]
        })))
        .unwrap();

        let both = record(json!({"total_price": 900, "loyalty_program_member": "Yes"}));
        assert_eq!(forest.predict(&both).unwrap(), 7);

        let loyal_only = record(json!({"total_price": 100, "loyalty_program_member": "Yes"}));
        assert_eq!(forest.predict(&loyal_only).unwrap(), 2);

        assert_eq!(forest.metadata().max_depth, 2);
    }

    #[test]
    fn test_bias_only_model() {
        let forest = ForestClassifier::from_artifact(artifact(json!({
            "class_labels": [0, 1, 2],
            "bias": [0.1, 0.5, 0.2],
            "trees": []
        })))
        .unwrap();

        assert_eq!(forest.predict(&record(json!({}))).unwrap(), 1);
    }

    #[test]
    fn test_rejects_wrong_leaf_count() {
        let result = ForestClassifier::from_artifact(artifact(json!({
            "class_labels": [0, 1, 2],
            "trees": [{
                "splits": [{"type": "float", "feature": "Age", "border": 40.0}],
                "leaf_values": [[0.0, 0.0, 1.0]]
            }]
        })));

        assert!(matches!(result, Err(ModelLoadError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unknown_feature() {
        let result = ForestClassifier::from_artifact(artifact(json!({
            "class_labels": [0, 1],
            "trees": [{
                "splits": [{"type": "float", "feature": "Shoe_Size", "border": 9.0}],
                "leaf_values": [[0.0, 1.0], [1.0, 0.0]]
            }]
        })));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Shoe_Size"));
    }

    #[test]
    fn test_rejects_split_type_mismatch() {
        let result = ForestClassifier::from_artifact(artifact(json!({
            "class_labels": [0, 1],
            "trees": [{
                "splits": [{"type": "one_hot", "feature": "Age", "value": "30"}],
                "leaf_values": [[0.0, 1.0], [1.0, 0.0]]
            }]
        })));

        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_mismatched_bias() {
        let result = ForestClassifier::from_artifact(artifact(json!({
            "class_labels": [0, 1, 2],
            "bias": [0.0, 1.0],
            "trees": []
        })));

        assert!(result.is_err());
    }
}
