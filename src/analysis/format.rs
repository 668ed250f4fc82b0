// analysis/format.rs
// Dataset form classification and human readable sizes

use crate::catalog::models::MetadataRecord;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataFormat {
    TemporalAndSpatial,
    Temporal,
    Spatial,
    Relational,
}

impl DataFormat {
    pub fn classify(record: &MetadataRecord) -> Self {
        match (record.has_temporal(), record.has_spatial()) {
            (true, true) => DataFormat::TemporalAndSpatial,
            (true, false) => DataFormat::Temporal,
            (false, true) => DataFormat::Spatial,
            (false, false) => DataFormat::Relational,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataFormat::TemporalAndSpatial => "Temporal & Spatial",
            DataFormat::Temporal => "Temporal",
            DataFormat::Spatial => "Spatial",
            DataFormat::Relational => "Relational",
        }
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Decimal units throughout. Fractions are truncated to two places so a value
/// never rounds up into the next unit's range.
pub fn format_size(bytes: u64) -> String {
    let bytes = u128::from(bytes);
    let mut tier = 0;
    while tier + 1 < UNITS.len() && bytes >= 1000u128.pow(tier as u32 + 1) {
        tier += 1;
    }
    if tier == 0 {
        return format!("{} B", bytes);
    }
    let hundredths = bytes * 100 / 1000u128.pow(tier as u32);
    format!("{}.{:02} {}", hundredths / 100, hundredths % 100, UNITS[tier])
}
