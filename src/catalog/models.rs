// catalog/models.rs
// Data structures served by the catalog service

use super::geometry::{self, Geometry};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Name of one dataset profile, as listed by the service.
pub type SchemaId = String;

/// Profile-scoped OpenAPI document. Kept opaque apart from a few summary accessors.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ApiSpecification(pub Value);

/// One documented path and the HTTP methods it accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub path: String,
    pub methods: Vec<String>,
}

impl ApiSpecification {
    pub fn title(&self) -> Option<&str> {
        self.0.pointer("/info/title").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.0.pointer("/info/version").and_then(Value::as_str)
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        let Some(paths) = self.0.get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };
        let mut endpoints: Vec<Endpoint> = paths
            .iter()
            .map(|(path, ops)| Endpoint {
                path: path.clone(),
                methods: ops
                    .as_object()
                    .map(|o| o.keys().map(|k| k.to_uppercase()).collect())
                    .unwrap_or_default(),
            })
            .collect();
        endpoints.sort_by(|a, b| a.path.cmp(&b.path));
        endpoints
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct MetadataRecord {
    pub schema_name: SchemaId,
    #[serde(default)]
    pub crawl_date: Option<String>,
    #[serde(default)]
    pub data_date: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default, alias = "license")]
    pub licence: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub tables: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_byte_count")]
    pub size: Option<u64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub temporal_start: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub temporal_end: Option<String>,
    #[serde(default, deserialize_with = "geometry::deserialize_lenient")]
    pub concave_hull_geometry: Option<Geometry>,
}

impl MetadataRecord {
    pub fn has_temporal(&self) -> bool {
        self.temporal_start.is_some() || self.temporal_end.is_some()
    }

    pub fn has_spatial(&self) -> bool {
        self.concave_hull_geometry.is_some()
    }

    /// Both temporal bounds, when present and parseable.
    pub fn temporal_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let start = parse_date(self.temporal_start.as_deref()?)?;
        let end = parse_date(self.temporal_end.as_deref()?)?;
        Some((start, end))
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` and RFC 3339.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

// Postgres `numeric` sums come back as numbers or strings depending on the service settings.
fn deserialize_byte_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| *f >= 0.0).map(|f| f as u64),
        _ => None,
    })
}
