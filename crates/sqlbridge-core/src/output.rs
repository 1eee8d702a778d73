//! Output formats for fetched rows.
//!
//! A select can be fetched as ordered map rows, JSON object rows, a flat
//! first-column list, or a (pretty-printed) JSON string. Format tags are
//! matched case-insensitively at the facade boundary; an unrecognized
//! tag is an invalid-argument error, never a silent fallback.

use serde_json::{Map, Value as Json};

use crate::connection::ResultSet;
use crate::error::{Error, Result};

/// Requested shape for fetched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One ordered column-name → value map per row.
    #[default]
    Assoc,
    /// One JSON object per row.
    Obj,
    /// Flat list of first-column values.
    Column,
    /// Compact JSON string.
    Json,
    /// Pretty-printed JSON string.
    JsonPretty,
}

impl OutputFormat {
    /// Parses a format tag, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for unrecognized tags.
    pub fn parse(tag: &str) -> Result<Self> {
        match tag.to_ascii_uppercase().as_str() {
            "ASSOC" => Ok(Self::Assoc),
            "OBJ" => Ok(Self::Obj),
            "COLUMN" => Ok(Self::Column),
            "JSON" => Ok(Self::Json),
            "JSONPP" => Ok(Self::JsonPretty),
            other => Err(Error::InvalidArgument(format!(
                "unknown output format: {other}"
            ))),
        }
    }

    /// Returns the canonical tag.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Assoc => "ASSOC",
            Self::Obj => "OBJ",
            Self::Column => "COLUMN",
            Self::Json => "JSON",
            Self::JsonPretty => "JSONPP",
        }
    }
}

/// The result of a fetch, shaped per the requested [`OutputFormat`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    /// Ordered map rows.
    Assoc(Vec<Map<String, Json>>),
    /// JSON object rows.
    Obj(Vec<Json>),
    /// Flat list of first-column values.
    Column(Vec<Json>),
    /// Rendered JSON text (compact or pretty).
    Json(String),
}

impl QueryOutput {
    /// Shapes a result set into the requested format.
    #[must_use]
    pub fn render(rows: &ResultSet, format: OutputFormat) -> Self {
        match format {
            OutputFormat::Assoc => Self::Assoc(row_maps(rows)),
            OutputFormat::Obj => Self::Obj(row_objects(rows)),
            OutputFormat::Column => Self::Column(
                rows.rows
                    .iter()
                    .filter_map(|row| row.first().map(crate::Value::to_json))
                    .collect(),
            ),
            OutputFormat::Json => {
                // row_maps never holds non-string keys; serialization
                // cannot fail
                Self::Json(serde_json::to_string(&row_maps(rows)).unwrap_or_default())
            }
            OutputFormat::JsonPretty => {
                Self::Json(serde_json::to_string_pretty(&row_maps(rows)).unwrap_or_default())
            }
        }
    }

    /// The empty result in the requested shape, used when a statement
    /// failed outside a transaction.
    #[must_use]
    pub fn empty(format: OutputFormat) -> Self {
        Self::render(&ResultSet::default(), format)
    }

    /// Returns the JSON text when the format was JSON/JSONPP.
    #[must_use]
    pub fn as_json(&self) -> Option<&str> {
        match self {
            Self::Json(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the map rows when the format was ASSOC.
    #[must_use]
    pub fn as_rows(&self) -> Option<&[Map<String, Json>]> {
        match self {
            Self::Assoc(rows) => Some(rows),
            _ => None,
        }
    }

    /// Number of rows (or column values) carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Assoc(rows) => rows.len(),
            Self::Obj(rows) => rows.len(),
            Self::Column(values) => values.len(),
            Self::Json(text) => serde_json::from_str::<Vec<Json>>(text)
                .map(|v| v.len())
                .unwrap_or(0),
        }
    }

    /// Whether the output carries no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn row_maps(rows: &ResultSet) -> Vec<Map<String, Json>> {
    rows.rows
        .iter()
        .map(|row| {
            let mut map = Map::new();
            for (name, value) in rows.columns.iter().zip(row.iter()) {
                map.insert(name.clone(), value.to_json());
            }
            map
        })
        .collect()
}

fn row_objects(rows: &ResultSet) -> Vec<Json> {
    row_maps(rows).into_iter().map(Json::Object).collect()
}
