//! Bulk response parsing.
//!
//! The bulk endpoint answers with per-item two-tuples:
//!
//! ```json
//! { "responses": [ [ { "data": { ... } }, 201 ],
//!                  [ { "error": "invalid entity" }, 400 ] ] }
//! ```
//!
//! Position in `responses` corresponds to position in the submitted batch;
//! callers rely on that to cross-reference outcomes with heartbeats.

use serde::Deserialize;
use serde_json::Value;

use pulse_heartbeat::{Heartbeat, Outcome};

use crate::{ApiError, Result};

#[derive(Deserialize)]
struct ResponsesBody {
    responses: Option<Vec<(Value, u16)>>,
}

/// Parse the aggregated body returned by the bulk endpoint.
///
/// # Errors
///
/// A missing `responses` key or any per-item shape mismatch fails the whole
/// parse with the raw body attached for diagnosis.
pub fn parse_heartbeat_responses(data: &[u8]) -> Result<Vec<Outcome>> {
    let raw = || String::from_utf8_lossy(data).to_string();

    let body: ResponsesBody = serde_json::from_slice(data)
        .map_err(|err| ApiError::parse(format!("failed to parse json response body: {err}"), raw()))?;

    let responses = body
        .responses
        .ok_or_else(|| ApiError::parse("missing responses key in body", raw()))?;

    let mut outcomes = Vec::with_capacity(responses.len());

    for (n, (item, status)) in responses.into_iter().enumerate() {
        let outcome = parse_item(item, status)
            .map_err(|message| ApiError::parse(format!("failed parsing result #{n}: {message}"), raw()))?;
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

fn parse_item(item: Value, status: u16) -> std::result::Result<Outcome, String> {
    if status >= 400 {
        return Ok(Outcome {
            status,
            errors: parse_item_errors(&item)?,
            heartbeat: None,
        });
    }

    let heartbeat = match item.get("data") {
        Some(data) => Some(
            serde_json::from_value::<Heartbeat>(data.clone())
                .map_err(|err| format!("failed to parse json heartbeat: {err}"))?,
        ),
        None => None,
    };

    Ok(Outcome {
        status,
        errors: Vec::new(),
        heartbeat,
    })
}

fn parse_item_errors(item: &Value) -> std::result::Result<Vec<String>, String> {
    // singular form: {"error": "<message>"}
    if let Some(message) = item.get("error").and_then(Value::as_str) {
        return Ok(vec![message.to_string()]);
    }

    // field map form: {"errors": {"<field>": ["<msg>", ...]}}
    let Some(fields) = item.get("errors").and_then(Value::as_object) else {
        return Err("failed to detect any errors despite invalid response status".to_string());
    };

    let mut errors = Vec::new();

    for (field, messages) in fields {
        // dependency errors are filtered client-side and never surfaced
        if field == "dependencies" {
            continue;
        }

        let joined = match messages {
            Value::Array(items) => items
                .iter()
                .map(|m| match m {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
            other => other.to_string(),
        };

        errors.push(format!("{field}: {joined}"));
    }

    Ok(errors)
}

#[cfg(test)]
#[path = "response_test.rs"]
mod tests;
