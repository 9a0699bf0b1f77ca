use anyhow::{Context, Result};
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use crate::context::Season;

const HEADER: [&str; 8] = [
    "timestamp",
    "location",
    "predicted_price",
    "confidence",
    "demand",
    "event_count",
    "season",
    "source",
];

/// Where a logged price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Model,
    Fallback,
}

impl std::fmt::Display for PriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceSource::Model => write!(f, "model"),
            PriceSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// One audited prediction. Context fields are absent for fallback estimates.
#[derive(Debug, Clone)]
pub struct PredictionRecord {
    pub location: String,
    pub predicted_price: f64,
    pub confidence: f64,
    pub demand: Option<u32>,
    pub event_count: Option<u32>,
    pub season: Option<Season>,
    pub source: PriceSource,
}

/// Append-only CSV audit of served predictions.
pub struct PredictionLogger {
    writer: Mutex<csv::Writer<File>>,
}

impl PredictionLogger {
    pub fn new(log_path: &str) -> Result<Self> {
        let exists = Path::new(log_path).exists();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open prediction log: {}", log_path))?;

        let mut writer = csv::Writer::from_writer(file);
        if !exists {
            writer.write_record(HEADER)?;
            writer.flush()?;
        }

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }

    /// Blocking; callers on the async runtime go through `spawn_blocking`.
    pub fn log_prediction(&self, record: &PredictionRecord) -> Result<()> {
        let optional = |v: Option<u32>| v.map(|v| v.to_string()).unwrap_or_default();
        let row = [
            Utc::now().to_rfc3339(),
            record.location.clone(),
            format!("{:.2}", record.predicted_price),
            format!("{:.1}", record.confidence),
            optional(record.demand),
            optional(record.event_count),
            optional(record.season.map(|s| u32::from(s.code()))),
            record.source.to_string(),
        ];

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("prediction log lock poisoned"))?;
        writer.write_record(&row)?;
        writer.flush()?;

        Ok(())
    }
}
