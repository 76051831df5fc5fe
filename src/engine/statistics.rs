use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// append-only `epoch,elapsed_seconds,fitness` log. writes are best-effort:
/// a failure is logged and the epoch carries on.
#[derive(Clone, Debug, Default)]
pub struct StatisticsLog {
    path: Option<PathBuf>,
}

impl StatisticsLog {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn record(&self, epoch: u64, elapsed: Duration, fitness: f64) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = append_line(path, epoch, elapsed, fitness) {
            tracing::warn!("statistics write to {} failed: {}", path.display(), e);
        }
    }
}

fn append_line(path: &Path, epoch: u64, elapsed: Duration, fitness: f64) -> std::io::Result<()> {
    profiling::scope!("statistics::append_line");
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{},{:.3},{}", epoch, elapsed.as_secs_f64(), fitness)
}
