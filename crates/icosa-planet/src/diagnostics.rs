//! Per-rebuild diagnostics.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use icosa_mesh::MeshSnapshot;
use serde::{Deserialize, Serialize};

use crate::error::PlanetError;

/// What one mesh rebuild produced and how long it took.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildSample {
    pub leaf_count: usize,
    pub vertex_count: usize,
    pub index_count: usize,
    pub duration_us: u64,
}

impl RebuildSample {
    pub fn from_snapshot(snapshot: &MeshSnapshot) -> Self {
        Self {
            leaf_count: snapshot.leaf_count,
            vertex_count: snapshot.vertices.len(),
            index_count: snapshot.indices.len(),
            duration_us: u64::try_from(snapshot.build_time.as_micros()).unwrap_or(u64::MAX),
        }
    }
}

/// Receives a sample after every published rebuild, on the worker thread.
pub trait DiagnosticSink: Send {
    fn record(&mut self, sample: &RebuildSample) -> Result<(), PlanetError>;
}

/// Appends one JSON object per line to a file.
pub struct JsonLinesSink {
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    /// Open `path` for appending, creating it and its parent directory.
    pub fn create(path: &Path) -> Result<Self, PlanetError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(PlanetError::Diagnostics)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(PlanetError::Diagnostics)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl DiagnosticSink for JsonLinesSink {
    fn record(&mut self, sample: &RebuildSample) -> Result<(), PlanetError> {
        serde_json::to_writer(&mut self.writer, sample)
            .map_err(|e| PlanetError::Diagnostics(e.into()))?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .map_err(PlanetError::Diagnostics)
    }
}

/// Keeps samples in memory. Clones share the same buffer, so a caller can
/// hand one clone to the planet and read through another.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    samples: Arc<Mutex<Vec<RebuildSample>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> Vec<RebuildSample> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&mut self, sample: &RebuildSample) -> Result<(), PlanetError> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*sample);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sample(leaves: usize) -> RebuildSample {
        RebuildSample {
            leaf_count: leaves,
            vertex_count: 12,
            index_count: 60,
            duration_us: 250,
        }
    }

    #[test]
    fn test_sample_from_snapshot() {
        let mut snapshot = MeshSnapshot::empty();
        snapshot.leaf_count = 20;
        snapshot.indices = vec![0; 60];
        snapshot.build_time = Duration::from_micros(1500);
        let sample = RebuildSample::from_snapshot(&snapshot);
        assert_eq!(sample.leaf_count, 20);
        assert_eq!(sample.vertex_count, 0);
        assert_eq!(sample.index_count, 60);
        assert_eq!(sample.duration_us, 1500);
    }

    #[test]
    fn test_json_lines_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("rebuilds.jsonl");

        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.record(&sample(20)).unwrap();
        drop(sink);
        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.record(&sample(23)).unwrap();
        drop(sink);

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<RebuildSample> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(parsed, vec![sample(20), sample(23)]);
    }

    #[test]
    fn test_memory_sink_clones_share_buffer() {
        let reader = MemorySink::new();
        let mut writer = reader.clone();
        assert!(reader.is_empty());
        writer.record(&sample(4)).unwrap();
        assert_eq!(reader.samples(), vec![sample(4)]);
    }
}
