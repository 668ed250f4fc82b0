// export/exporter.rs
// Handles exporting a catalog snapshot to files

use crate::analysis::format::DataFormat;
use crate::analysis::timeline::{build_timeline, TimelineBucket};
use crate::catalog::models::{MetadataRecord, SchemaId};
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::Write;

#[derive(Serialize, Debug, Clone)]
pub struct ExportedRecord {
    #[serde(flatten)]
    pub record: MetadataRecord,
    pub data_format: DataFormat,
}

#[derive(Serialize, Debug, Clone)]
pub struct CatalogSnapshot {
    pub exported_at: DateTime<Utc>,
    pub source: String,
    pub schemas: Vec<SchemaId>,
    pub records: Vec<ExportedRecord>,
    pub timeline: Vec<TimelineBucket>,
}

impl CatalogSnapshot {
    /// `records` must already be sorted by schema name.
    pub fn new(source: &str, schemas: Vec<SchemaId>, records: Vec<MetadataRecord>) -> Self {
        let timeline = build_timeline(&records, None).unwrap_or_default();
        Self {
            exported_at: Utc::now(),
            source: source.to_string(),
            schemas,
            records: records
                .into_iter()
                .map(|record| ExportedRecord {
                    data_format: DataFormat::classify(&record),
                    record,
                })
                .collect(),
            timeline,
        }
    }
}

pub struct SnapshotExporter;

impl SnapshotExporter {
    pub fn serialize(&self, snapshot: &CatalogSnapshot, format: &str) -> Result<String> {
        Ok(match format {
            "json" => serde_json::to_string_pretty(snapshot)?,
            "yaml" | "yml" => serde_yaml::to_string(snapshot)?,
            _ => return Err(anyhow!("Unsupported format '{}'. Supported formats: json, yaml", format)),
        })
    }

    pub fn export_snapshot_to_file(&self, snapshot: &CatalogSnapshot, output_file: &str, format: &str) -> Result<()> {
        let serialized = self.serialize(snapshot, format)?;
        let mut file = File::create(output_file).with_context(|| format!("Failed to create {}", output_file))?;
        file.write_all(serialized.as_bytes())?;
        Ok(())
    }
}
