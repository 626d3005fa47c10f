//! Search response parser
//!
//! The backend answers with a JSON object whose `results` field lists the
//! hits. A missing or null `results` field means the page has no hits.

use crate::FetchError;
use serde_json::Value;

/// One raw hit as returned by the backend
///
/// Fields that are absent or not strings are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl SearchHit {
    /// Converts the hit into a storable item, if both fields are usable
    pub fn into_item(self) -> Option<ResultItem> {
        ResultItem::new(self.title?, self.url?)
    }
}

/// A well-formed (title, URL) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultItem {
    pub title: String,
    pub url: String,
}

impl ResultItem {
    /// Trims both fields; returns `None` if either ends up empty
    pub fn new(title: impl AsRef<str>, url: impl AsRef<str>) -> Option<Self> {
        let title = title.as_ref().trim();
        let url = url.as_ref().trim();
        if title.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            url: url.to_string(),
        })
    }
}

/// Parses a response body into its list of hits
///
/// # Returns
///
/// * `Ok(Vec<SearchHit>)` - The hits, possibly empty
/// * `Err(FetchError::Decode)` - The body is not a JSON object, or
///   `results` is present but not a list
pub fn parse_results(body: &str) -> Result<Vec<SearchHit>, FetchError> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let Some(object) = json.as_object() else {
        return Err(FetchError::Decode(
            "expected a JSON object at the top level".to_string(),
        ));
    };

    match object.get("results") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(results)) => Ok(results.iter().map(hit_from_value).collect()),
        Some(_) => Err(FetchError::Decode("`results` is not a list".to_string())),
    }
}

fn hit_from_value(value: &Value) -> SearchHit {
    SearchHit {
        title: string_field(value, "title"),
        url: string_field(value, "url"),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}
