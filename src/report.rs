use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grinder::Hotspot;
use crate::manager::SweepStats;

/// Deaths per chunk before a chunk is listed as a grinder hotspot.
pub const HOTSPOT_THRESHOLD: u32 = 5;

/// State of the run right after one sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    pub scenario: String,
    /// 1-based sweep number.
    pub sweep: u64,
    pub tick: u64,
    pub clock_millis: u64,
    pub stats: SweepStats,
    pub live_monsters: usize,
    pub live_animals: usize,
    pub tracked_entities: usize,
    pub tracked_chunks: usize,
    pub suspended: bool,
    #[serde(default)]
    pub hotspots: Vec<Hotspot>,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode report")]
    Encode(#[from] serde_json::Error),
}

/// Writes every `interval`-th report as pretty JSON under
/// `<dir>/<scenario>/sweep_NNNNNN.json`. An interval of 0 writes nothing.
pub struct ReportWriter {
    output_dir: PathBuf,
    interval: u64,
}

impl ReportWriter {
    pub fn new(output_dir: impl AsRef<Path>, interval: u64) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            interval,
        }
    }

    pub fn maybe_write(&self, report: &SweepReport) -> Result<Option<PathBuf>, ReportError> {
        if self.interval == 0 || report.sweep % self.interval != 0 {
            return Ok(None);
        }
        let dir = self.output_dir.join(&report.scenario);
        fs::create_dir_all(&dir).map_err(|source| ReportError::Io {
            path: dir.clone(),
            source,
        })?;
        let path = dir.join(format!("sweep_{:06}.json", report.sweep));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).map_err(|source| ReportError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Some(path))
    }
}
