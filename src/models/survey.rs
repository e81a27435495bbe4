use crate::error::Result;
use serde::de::{Deserializer, Error as DeError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Value stored in `Special_Requests` when the traveller asked for nothing
pub const NO_SPECIAL_REQUESTS: &str = "No";

/// Column names, in the order the model was trained on
pub const FEATURE_COLUMNS: [&str; 14] = [
    "Age",
    "Gender",
    "Occupation",
    "Travel_Class",
    "State_of_Residence",
    "Duration_of_Stay_(Days)",
    "Number_of_Companions",
    "Purpose_of_Travel",
    "Special_Requests",
    "Loyalty_Program_Member",
    "Total_Price",
    "Destination_City",
    "Destination_Country",
    "Days_Before_Travel",
];

/// A single survey submission in the shape the classifier expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Occupation")]
    pub occupation: String,
    #[serde(rename = "Travel_Class")]
    pub travel_class: String,
    #[serde(rename = "State_of_Residence")]
    pub state_of_residence: String,
    #[serde(rename = "Duration_of_Stay_(Days)")]
    pub duration_of_stay_days: f64,
    #[serde(rename = "Number_of_Companions")]
    pub number_of_companions: f64,
    #[serde(rename = "Purpose_of_Travel")]
    pub purpose_of_travel: String,
    #[serde(rename = "Special_Requests")]
    pub special_requests: String,
    #[serde(rename = "Loyalty_Program_Member")]
    pub loyalty_program_member: String,
    #[serde(rename = "Total_Price")]
    pub total_price: f64,
    #[serde(rename = "Destination_City")]
    pub destination_city: String,
    #[serde(rename = "Destination_Country")]
    pub destination_country: String,
    #[serde(rename = "Days_Before_Travel")]
    pub days_before_travel: f64,
}

/// A column value as seen by the classifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Numeric(f64),
    Categorical(&'a str),
}

impl FeatureRecord {
    /// Look a column up by its training name
    pub fn feature(&self, column: &str) -> Option<FeatureValue<'_>> {
        use FeatureValue::{Categorical, Numeric};

        let value = match column {
            "Age" => Numeric(self.age),
            "Gender" => Categorical(&self.gender),
            "Occupation" => Categorical(&self.occupation),
            "Travel_Class" => Categorical(&self.travel_class),
            "State_of_Residence" => Categorical(&self.state_of_residence),
            "Duration_of_Stay_(Days)" => Numeric(self.duration_of_stay_days),
            "Number_of_Companions" => Numeric(self.number_of_companions),
            "Purpose_of_Travel" => Categorical(&self.purpose_of_travel),
            "Special_Requests" => Categorical(&self.special_requests),
            "Loyalty_Program_Member" => Categorical(&self.loyalty_program_member),
            "Total_Price" => Numeric(self.total_price),
            "Destination_City" => Categorical(&self.destination_city),
            "Destination_Country" => Categorical(&self.destination_country),
            "Days_Before_Travel" => Numeric(self.days_before_travel),
            _ => return None,
        };

        Some(value)
    }

    /// Whether `column` holds a number (`Some(true)`), a category (`Some(false)`) or is unknown
    pub fn is_numeric_column(column: &str) -> Option<bool> {
        match column {
            "Age"
            | "Duration_of_Stay_(Days)"
            | "Number_of_Companions"
            | "Total_Price"
            | "Days_Before_Travel" => Some(true),
            c if FEATURE_COLUMNS.contains(&c) => Some(false),
            _ => None,
        }
    }
}

/// Body of `POST /predict`.
///
/// Every field is optional. Missing numbers become `0`, missing categories
/// become an empty string and missing special requests become `"No"`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PredictRequest {
    #[serde(deserialize_with = "lenient_number")]
    pub age: Option<f64>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub gender: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub occupation: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub travel_class: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub state_of_residence: Option<String>,

    #[serde(deserialize_with = "lenient_number")]
    pub duration_of_stays: Option<f64>,

    #[serde(deserialize_with = "lenient_number")]
    pub number_of_companions: Option<f64>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub purpose_of_travel: Option<String>,

    #[serde(deserialize_with = "text_list")]
    #[validate(length(max = 32))]
    pub special_request: Option<Vec<String>>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub loyalty_program_member: Option<String>,

    #[serde(deserialize_with = "lenient_number")]
    pub total_price: Option<f64>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub destination_city: Option<String>,

    #[serde(deserialize_with = "lenient_text")]
    #[validate(length(max = 256))]
    pub destination_country: Option<String>,

    #[serde(deserialize_with = "lenient_number")]
    pub days_before_travel: Option<f64>,
}

impl PredictRequest {
    /// Parse and validate a raw JSON body
    pub fn from_json(body: &Value) -> Result<Self> {
        if !body.is_object() {
            return Err(crate::error::AppError::Validation(
                "request body must be a JSON object".to_string(),
            ));
        }

        let request: PredictRequest = serde_json::from_value(body.clone())?;
        request.validate()?;
        Ok(request)
    }
}

impl From<PredictRequest> for FeatureRecord {
    fn from(request: PredictRequest) -> Self {
        let special_requests = match request.special_request {
            Some(items) if !items.is_empty() => items.join(", "),
            _ => NO_SPECIAL_REQUESTS.to_string(),
        };

        Self {
            age: request.age.unwrap_or(0.0),
            gender: request.gender.unwrap_or_default(),
            occupation: request.occupation.unwrap_or_default(),
            travel_class: request.travel_class.unwrap_or_default(),
            state_of_residence: request.state_of_residence.unwrap_or_default(),
            duration_of_stay_days: request.duration_of_stays.unwrap_or(0.0),
            number_of_companions: request.number_of_companions.unwrap_or(0.0),
            purpose_of_travel: request.purpose_of_travel.unwrap_or_default(),
            special_requests,
            loyalty_program_member: request.loyalty_program_member.unwrap_or_default(),
            total_price: request.total_price.unwrap_or(0.0),
            destination_city: request.destination_city.unwrap_or_default(),
            destination_country: request.destination_country.unwrap_or_default(),
            days_before_travel: request.days_before_travel.unwrap_or(0.0),
        }
    }
}

/// Accepts a JSON number, a numeric string such as `"42"` or `" 3.5 "`, or a
/// boolean (1.0 / 0.0). An explicit `null` is rejected; only an absent field
/// falls back to 0.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("number out of range: {n}"))),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("could not convert string to float: '{s}'"))),
        Value::Bool(b) => Ok(Some(if b { 1.0 } else { 0.0 })),
        Value::Null => Err(D::Error::custom(
            "float() argument must be a number, not null",
        )),
        other => Err(D::Error::custom(format!(
            "expected a number, found {other}"
        ))),
    }
}

/// Accepts a string; numbers are kept in their textual form.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

/// Accepts a list of strings, or a lone string treated as a one-item list.
fn text_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(vec![s])),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(D::Error::custom(format!(
                    "special_request items must be strings, found {other}"
                ))),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(D::Error::custom(format!(
            "expected a list of strings, found {other}"
        ))),
    }
}
