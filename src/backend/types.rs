//! Wire types for the library ask endpoint.

use serde::{Deserialize, Deserializer, Serialize};

/// JSON body of an ask request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    query: String,
    model: String,
    library_id: String,
    stream: bool,
}

impl AskRequest {
    /// Creates a non-streaming ask request.
    pub fn new(
        query: impl Into<String>,
        model: impl Into<String>,
        library_id: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            model: model.into(),
            library_id: library_id.into(),
            stream: false,
        }
    }

    /// Returns the query text.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// A supporting document returned with an answer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Document {
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
}

impl Document {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}

/// Decoded result of an ask call.
///
/// `answer` is always text: a JSON string is kept as is, `null` or a missing
/// field becomes empty, and any other value is rendered as its JSON text.
/// A `null` or missing `documents` list decodes as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnswerResponse {
    #[serde(default, deserialize_with = "answer_text")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub documents: Vec<Document>,
    #[serde(rename = "totalElapsedMs", default)]
    pub total_elapsed_ms: Option<f64>,
}

impl AnswerResponse {
    /// Creates a response with no timing information.
    pub fn new(answer: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            answer: answer.into(),
            documents,
            total_elapsed_ms: None,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn answer_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}
