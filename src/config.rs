use std::path::PathBuf;
use std::time::Duration;

/// How often the log file is flushed to disk by the background timer.
pub const LOG_FLUSH_INTERVAL: Duration = Duration::from_secs(3);

/// Returns the path to the data directory for quickinfo-lsp.
/// Uses $XDG_DATA_HOME/quickinfo-lsp if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/quickinfo-lsp,
/// or ./quickinfo-lsp if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("quickinfo-lsp.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("quickinfo-lsp")
}
