//! CSV time-series export of species counts.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;

use crate::tracker::SpeciesTracker;

/// One row of the long-format counts file.
#[derive(Debug, Clone, Serialize)]
pub struct CountRecord {
    /// Simulation time (seconds)
    pub time_sec: f64,
    /// Species name (`<gene>_protein` / `<gene>_ribosome` for derived rows)
    pub species: String,
    pub count: i64,
}

/// CSV exporter for species counts over time.
pub struct CountsExporter {
    writer: csv::Writer<File>,
    /// Sample interval in seconds
    sample_interval_sec: f64,
    /// Last sample time
    last_sample_time: f64,
    /// Path to output file
    path: PathBuf,
}

impl CountsExporter {
    /// Create a new exporter with the given sample interval.
    ///
    /// Creates the output directory if it doesn't exist; the filename is
    /// auto-generated with a timestamp.
    pub fn new<P: AsRef<Path>>(sample_interval_sec: f64, dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("counts_{}.csv", timestamp);
        let path = dir.join(&filename);

        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval_sec,
            last_sample_time: -sample_interval_sec, // Ensure first sample is recorded
            path,
        })
    }

    /// Record a sample if the interval has elapsed.
    pub fn maybe_record(&mut self, time_sec: f64, tracker: &SpeciesTracker) -> Result<bool> {
        if time_sec - self.last_sample_time >= self.sample_interval_sec {
            self.record(time_sec, tracker)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Force record a sample regardless of interval.
    pub fn record(&mut self, time_sec: f64, tracker: &SpeciesTracker) -> Result<()> {
        // Rows are written in sorted species order so files diff cleanly
        // between seeded runs.
        let mut rows: Vec<CountRecord> = tracker
            .species()
            .iter()
            .map(|(species, &count)| CountRecord {
                time_sec,
                species: species.clone(),
                count,
            })
            .collect();
        rows.extend(tracker.proteins().iter().map(|(gene, &count)| CountRecord {
            time_sec,
            species: format!("{}_protein", gene),
            count,
        }));
        rows.extend(
            tracker
                .ribosomes_per_gene()
                .iter()
                .map(|(gene, &count)| CountRecord {
                    time_sec,
                    species: format!("{}_ribosome", gene),
                    count,
                }),
        );
        rows.sort_by(|a, b| a.species.cmp(&b.species));

        for row in rows {
            self.writer.serialize(row)?;
        }
        self.last_sample_time = time_sec;
        Ok(())
    }

    /// Finish writing and return the output path.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush()?;
        log::info!("CSV export completed: {}", self.path.display());
        Ok(self.path)
    }

    /// Get the output path.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
