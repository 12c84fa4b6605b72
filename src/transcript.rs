//! Conversation transcript log
//!
//! Appends timestamped speaker lines to a plain text file when enabled.
//! Logging failures are reported via tracing and never fail a turn.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::config::Config;

/// File-backed conversation transcript
#[derive(Debug, Clone)]
pub struct TranscriptLog {
    enabled: bool,
    path: PathBuf,
}

impl TranscriptLog {
    /// Create a transcript log, writing a session header when enabled
    #[must_use]
    pub fn new(enabled: bool, path: PathBuf) -> Self {
        let log = Self { enabled, path };
        if log.enabled {
            log.append(&format!(
                "\n--- New conversation session: {} ---\n",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ));
        }
        log
    }

    /// Create a transcript log from configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.log_conversation, config.log_path.clone())
    }

    /// Create a disabled transcript log that never touches the filesystem
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            path: PathBuf::new(),
        }
    }

    /// Record one speaker line
    pub fn record(&self, speaker: &str, text: &str) {
        if !self.enabled {
            return;
        }
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        self.append(&format!("[{timestamp}] {speaker}: {text}\n"));
    }

    fn append(&self, line: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = result {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to write transcript"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_log_path() -> PathBuf {
        std::env::temp_dir().join(format!("parlance-transcript-{}.txt", uuid::Uuid::new_v4()))
    }

    #[test]
    fn records_speaker_lines_when_enabled() {
        let path = temp_log_path();
        let log = TranscriptLog::new(true, path.clone());
        log.record("User", "hello");
        log.record("AI", "hi there");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("--- New conversation session:"));
        assert!(contents.contains("User: hello"));
        assert!(contents.contains("AI: hi there"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let path = temp_log_path();
        let log = TranscriptLog::new(false, path.clone());
        log.record("User", "hello");
        assert!(!path.exists());
    }
}
