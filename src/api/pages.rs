//! Server-rendered pages
//!
//! Templates are compiled into the binary. Placeholders have the form
//! `{{name}}` and are replaced with HTML-escaped values.

use crate::models::PredictionResult;
use crate::session::Session;
use axum::{
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde_json::Value;

const HOME_TEMPLATE: &str = include_str!("../../templates/home.html");
const ANALYTICS_TEMPLATE: &str = include_str!("../../templates/analytics.html");
const REPORTS_TEMPLATE: &str = include_str!("../../templates/reports.html");

pub async fn home() -> Html<&'static str> {
    Html(HOME_TEMPLATE)
}

pub async fn analytics() -> Html<&'static str> {
    Html(ANALYTICS_TEMPLATE)
}

/// Report for the session's latest prediction; sends the client back to the
/// form when there is none.
pub async fn reports(session: Session) -> Response {
    match session.prediction().await {
        Some(prediction) => Html(render_report(&prediction)).into_response(),
        None => (StatusCode::FOUND, [(LOCATION, "/analytics")]).into_response(),
    }
}

pub fn render_report(prediction: &PredictionResult) -> String {
    let score = format!("{:.1}", prediction.satisfaction_score);
    let rows = input_rows(&prediction.input_data);

    render(
        REPORTS_TEMPLATE,
        &[
            ("satisfaction_class", prediction.satisfaction_class.as_str()),
            ("satisfaction_score", score.as_str()),
            ("color", prediction.color.as_str()),
        ],
    )
    // Rows are assembled from escaped fragments already
    .replace("{{input_rows}}", &rows)
}

/// Replace each `{{key}}` with the escaped value
fn render(template: &str, values: &[(&str, &str)]) -> String {
    values.iter().fold(template.to_string(), |page, (key, value)| {
        page.replace(&format!("{{{{{key}}}}}"), &escape_html(value))
    })
}

fn input_rows(input: &Value) -> String {
    let Some(fields) = input.as_object() else {
        return String::new();
    };

    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "<tr><th scope=\"row\">{}</th><td>{}</td></tr>",
                escape_html(&field_label(key)),
                escape_html(&display_value(value))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `days_before_travel` -> `Days Before Travel`
fn field_label(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) if s.is_empty() => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => "None".to_string(),
        Value::Array(items) => items
            .iter()
            .map(display_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
