use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{CallbackAction, DEIntermediate};

/// Errors raised while saving a recording
#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("cannot create record directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write records: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot flush records: {0}")]
    Io(#[from] std::io::Error),
}

/// Records optimization progress via DE callbacks
///
/// Clones share the same storage, so one clone can be handed to the optimizer
/// while another is kept to save the records afterwards.
#[derive(Debug, Clone)]
pub struct OptimizationRecorder {
    /// Run name (used for CSV filename)
    name: String,
    /// Shared records storage
    records: Arc<Mutex<Vec<OptimizationRecord>>>,
}

/// A single optimization iteration record
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationRecord {
    /// Iteration number
    pub iteration: usize,
    /// Best x found so far
    pub x: Vec<f64>,
    /// Best function result so far
    pub best_result: f64,
    /// Convergence measure (standard deviation of population)
    pub convergence: f64,
    /// Whether this iteration improved the best known result
    pub is_improvement: bool,
}

impl OptimizationRecorder {
    /// Create a new optimization recorder for the given run name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), records: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OptimizationRecord>> {
        // a panic while holding the lock leaves the vector itself intact
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append one generation
    pub fn record(&self, intermediate: &DEIntermediate) {
        let mut records = self.lock();
        let is_improvement = match records.last() {
            Some(last) => intermediate.fun < last.best_result,
            None => true,
        };
        records.push(OptimizationRecord {
            iteration: intermediate.iter,
            x: intermediate.x.to_vec(),
            best_result: intermediate.fun,
            convergence: intermediate.convergence,
            is_improvement,
        });
    }

    /// Create a callback function that records optimization progress
    pub fn create_callback(&self) -> Box<dyn FnMut(&DEIntermediate) -> CallbackAction + Send> {
        let recorder = self.clone();
        Box::new(move |intermediate: &DEIntermediate| -> CallbackAction {
            recorder.record(intermediate);
            CallbackAction::Continue
        })
    }

    /// Save all recorded iterations to `<output_dir>/<name>.csv` and return the path
    pub fn save_to_csv(&self, output_dir: &Path) -> Result<PathBuf, RecorderError> {
        create_dir_all(output_dir).map_err(|source| RecorderError::CreateDir {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let filename = output_dir.join(format!("{}.csv", self.name));
        let records = self.lock();
        let mut writer = csv::Writer::from_path(&filename)?;

        let num_dimensions = records.first().map_or(0, |r| r.x.len());
        let mut header = vec!["iteration".to_string()];
        header.extend((0..num_dimensions).map(|i| format!("x{}", i)));
        header.extend(["best_result", "convergence", "is_improvement"].map(String::from));
        writer.write_record(&header)?;

        for record in records.iter() {
            let mut row = Vec::with_capacity(num_dimensions + 4);
            row.push(record.iteration.to_string());
            row.extend(record.x.iter().map(|xi| format!("{:.16}", xi)));
            row.push(format!("{:.16}", record.best_result));
            row.push(format!("{:.16}", record.convergence));
            row.push(record.is_improvement.to_string());
            writer.write_record(&row)?;
        }
        writer.flush()?;

        Ok(filename)
    }

    /// Get a copy of all recorded iterations
    pub fn get_records(&self) -> Vec<OptimizationRecord> {
        self.lock().clone()
    }

    /// Get the number of iterations recorded
    pub fn num_iterations(&self) -> usize {
        self.lock().len()
    }

    /// Clear all recorded iterations
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Get the final best solution if any iterations were recorded
    pub fn get_best_solution(&self) -> Option<(Vec<f64>, f64)> {
        self.lock().last().map(|r| (r.x.clone(), r.best_result))
    }
}
