use std::fs::{File, OpenOptions};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::JsonFields;
use tracing_subscriber::prelude::*;

use crate::config;

/// Handle to the open log file, used by the periodic flush timer.
pub struct LogHandle {
    file: File,
}

impl LogHandle {
    /// Pushes buffered log output to disk. Errors are ignored; losing a
    /// flush must never take the server down.
    pub fn flush(&self) {
        let _ = self.file.sync_data();
    }
}

pub fn init(log_file: Option<PathBuf>) -> anyhow::Result<LogHandle> {
    let log_path = match log_file {
        Some(path) => path,
        None => {
            let data_dir = config::data_dir();
            std::fs::create_dir_all(&data_dir).inspect_err(|e| {
                eprintln!("Failed to create data directory: {}", e);
            })?;
            config::log_path()
        }
    };

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .inspect_err(|e| {
            eprintln!("Failed to open log file {:?}: {}", log_path, e);
        })?;
    let handle = LogHandle {
        file: log_file.try_clone()?,
    };

    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(log_file)
        .fmt_fields(JsonFields::default());

    // Use RUST_LOG if set, otherwise default to INFO
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .init();

    Ok(handle)
}
