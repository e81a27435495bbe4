use crate::ml::classifier::{Classifier, ForestClassifier};
use crate::ml::models::{ModelArtifact, ModelLoadError};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

/// Shared, read-only classifier handle. `None` when loading failed.
pub type ModelHandle = Option<Arc<dyn Classifier>>;

/// Read and validate the model artifact at `path`
pub fn load_model(path: &Path) -> Result<ForestClassifier, ModelLoadError> {
    if !path.exists() {
        return Err(ModelLoadError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let artifact: ModelArtifact = serde_json::from_slice(&bytes)?;
    ForestClassifier::from_artifact(artifact)
}

/// Load the model for serving. Failures are logged and yield an empty handle
/// so the server can still start.
pub fn load_model_handle(path: &Path) -> ModelHandle {
    match load_model(path) {
        Ok(model) => {
            let meta = model.metadata();
            info!(
                path = %path.display(),
                name = %meta.name,
                version = %meta.version,
                trees = meta.n_trees,
                classes = meta.n_classes,
                "✅ Model loaded"
            );
            crate::metrics::MODEL_LOADED.set(1.0);
            let model: Arc<dyn Classifier> = Arc::new(model);
            Some(model)
        }
        Err(e) => {
            error!(path = %path.display(), "Error loading model: {}", e);
            crate::metrics::MODEL_LOADED.set(0.0);
            None
        }
    }
}
