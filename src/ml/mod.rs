//! Satisfaction classifier: artifact format, loading and inference.
//!
//! The model is trained offline and exported as a JSON oblivious-tree
//! ensemble. It is loaded once at startup and shared read-only between
//! request handlers.

pub mod classifier;
pub mod loader;
pub mod models;

pub use classifier::{Classifier, ForestClassifier};
pub use loader::{load_model, load_model_handle, ModelHandle};
pub use models::{ModelArtifact, ModelLoadError, ModelMetadata, Split, TreeArtifact};
