//! Declarative report definitions as accepted over the wire.

use serde::{Deserialize, Deserializer, Serialize};

/// A multi-entity report definition.
///
/// ```json
/// {
///   "baseEntity": "user_data",
///   "columns": ["first_name", "loan_data.loan_amount"],
///   "filters": [{ "key": "loan_data.status", "op": "=", "value": "approved" }],
///   "joins": [{ "rightEntity": "loan_data", "on": "user_id=user_id" }]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub base_entity: Option<String>,

    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub filters: Vec<ReportFilter>,

    #[serde(default)]
    pub joins: Vec<ReportJoin>,
}

impl ReportRequest {
    /// Start a request over `base_entity`.
    pub fn new(base_entity: &str) -> Self {
        Self {
            base_entity: Some(base_entity.into()),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_filter(mut self, key: &str, op: &str, value: Option<&str>) -> Self {
        self.filters.push(ReportFilter {
            key: key.into(),
            op: op.into(),
            value: value.map(Into::into),
        });
        self
    }

    pub fn with_join(mut self, right_entity: &str, on: &str) -> Self {
        self.joins.push(ReportJoin {
            right_entity: Some(right_entity.into()),
            on: Some(on.into()),
        });
        self
    }
}

/// A `{key, op, value}` predicate on one attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFilter {
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub op: String,

    /// Scalars are accepted in any JSON form and carried as text.
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub value: Option<String>,
}

/// A left join to another entity: `on` is `left=right`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportJoin {
    #[serde(default)]
    pub right_entity: Option<String>,

    #[serde(default)]
    pub on: Option<String>,
}

fn scalar_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_json::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "filter value must be a scalar, got {}",
            other
        ))),
    }
}
