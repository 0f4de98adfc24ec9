//! Implements AppointmentLogPort using a JSON Lines file.
//!
//! One booking per line, appended and synced on each record. Nothing is held in memory.

use crate::domain::{AppointmentRecord, DomainError};
use crate::ports::AppointmentLogPort;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Append-only appointment log.
pub struct JsonAppointmentLog {
    path: PathBuf,
    /// Serializes appends so lines never interleave.
    write_lock: Mutex<()>,
}

impl JsonAppointmentLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every booking back from disk. A missing file is an empty log.
    pub async fn records(&self) -> Result<Vec<AppointmentRecord>, DomainError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::AppointmentLog(format!(
                    "read {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line).map_err(|e| {
                    DomainError::AppointmentLog(format!(
                        "parse {} line {}: {}",
                        self.path.display(),
                        i + 1,
                        e
                    ))
                })
            })
            .collect()
    }

    async fn append(&self, line: &str) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| DomainError::AppointmentLog(format!("create dir: {}", e)))?;
            }
        }

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| DomainError::AppointmentLog(format!("open: {}", e)))?;
        f.write_all(line.as_bytes())
            .await
            .map_err(|e| DomainError::AppointmentLog(format!("write: {}", e)))?;
        f.sync_data()
            .await
            .map_err(|e| DomainError::AppointmentLog(format!("sync: {}", e)))
    }
}

#[async_trait::async_trait]
impl AppointmentLogPort for JsonAppointmentLog {
    async fn record(&self, appointment: &AppointmentRecord) -> Result<(), DomainError> {
        let mut line = serde_json::to_string(appointment)
            .map_err(|e| DomainError::AppointmentLog(e.to_string()))?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.append(&line).await {
            warn!(path = %self.path.display(), error = %e, "appointment log append failed");
            return Err(e);
        }
        Ok(())
    }
}
