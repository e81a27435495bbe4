use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

/// Satisfaction band derived from the classifier's output class
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, IntoStaticStr,
)]
pub enum SatisfactionClass {
    High,
    Medium,
    Low,
    Unknown,
}

impl SatisfactionClass {
    /// Map a raw model class to its band.
    ///
    /// The model was trained with labels encoded alphabetically, hence
    /// `1 => Low` and `2 => Medium`.
    pub fn from_class(class: i64) -> Self {
        match class {
            0 => SatisfactionClass::High,
            1 => SatisfactionClass::Low,
            2 => SatisfactionClass::Medium,
            _ => SatisfactionClass::Unknown,
        }
    }

    /// Score shown on the report page
    pub fn score(self) -> f64 {
        match self {
            SatisfactionClass::High => 4.5,
            SatisfactionClass::Medium => 3.0,
            SatisfactionClass::Low => 1.5,
            SatisfactionClass::Unknown => 3.0,
        }
    }

    /// UI color tag
    pub fn color(self) -> DisplayColor {
        match self {
            SatisfactionClass::High => DisplayColor::Success,
            SatisfactionClass::Medium => DisplayColor::Info,
            SatisfactionClass::Low => DisplayColor::Danger,
            SatisfactionClass::Unknown => DisplayColor::Warning,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Bootstrap-style contextual color used by the templates
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DisplayColor {
    Success,
    Info,
    Danger,
    Warning,
}

impl DisplayColor {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Outcome of one prediction, kept in the session for the report page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub satisfaction_score: f64,
    pub satisfaction_class: SatisfactionClass,
    pub color: DisplayColor,
    /// Request body exactly as the client sent it
    pub input_data: serde_json::Value,
}

impl PredictionResult {
    pub fn from_class(class: i64, input_data: serde_json::Value) -> Self {
        let satisfaction_class = SatisfactionClass::from_class(class);

        Self {
            satisfaction_score: satisfaction_class.score(),
            satisfaction_class,
            color: satisfaction_class.color(),
            input_data,
        }
    }
}

/// Success envelope returned by `POST /predict`
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: PredictionResult,
}

impl From<PredictionResult> for PredictionResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            success: true,
            result,
        }
    }
}
