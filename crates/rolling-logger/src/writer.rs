//! Size-rotated log file with an in-memory tail.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

/// Rotation and buffer limits
#[derive(Debug, Clone, Copy)]
pub struct RollingConfig {
    /// Rotate once the active file reaches this many bytes
    pub max_file_bytes: u64,
    /// Rotated files kept as `<name>.1` .. `<name>.N`
    pub max_files: usize,
    /// Lines kept in memory for `recent_lines`
    pub buffer_lines: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 2 * 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
        }
    }
}

struct RollingState {
    path: PathBuf,
    file: File,
    written: u64,
    config: RollingConfig,
    recent: VecDeque<String>,
    partial: String,
}

impl RollingState {
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        for index in (1..self.config.max_files).rev() {
            let from = rotated_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, rotated_path(&self.path, index + 1))?;
            }
        }
        if self.config.max_files > 0 {
            fs::rename(&self.path, rotated_path(&self.path, 1))?;
        }
        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }

    fn remember(&mut self, buf: &[u8]) {
        if self.config.buffer_lines == 0 {
            return;
        }
        self.partial.push_str(&String::from_utf8_lossy(buf));
        while let Some(newline) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=newline).collect();
            if self.recent.len() == self.config.buffer_lines {
                self.recent.pop_front();
            }
            self.recent.push_back(line.trim_end().to_string());
        }
    }
}

fn rotated_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Shared handle to the rolling file; cloned into every writer
#[derive(Clone)]
pub struct RollingFile {
    state: Arc<Mutex<RollingState>>,
}

impl RollingFile {
    /// Open `<dir>/<app_name>.log` for appending
    pub fn open(dir: &Path, app_name: &str, config: RollingConfig) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", app_name));
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            state: Arc::new(Mutex::new(RollingState {
                path,
                file,
                written,
                config,
                recent: VecDeque::with_capacity(config.buffer_lines),
                partial: String::new(),
            })),
        })
    }

    /// Path of the active log file
    pub fn path(&self) -> PathBuf {
        self.lock().map(|s| s.path.clone()).unwrap_or_default()
    }

    /// The most recent complete lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.lock().map(|s| s.recent.iter().cloned().collect()).unwrap_or_default()
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, RollingState>> {
        self.state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.lock()?;
        if state.written > 0 && state.written + buf.len() as u64 > state.config.max_file_bytes {
            state.rotate()?;
        }
        state.file.write_all(buf)?;
        state.written += buf.len() as u64;
        state.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingFile {
    type Writer = RollingFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> RollingConfig {
        RollingConfig {
            max_file_bytes: 32,
            max_files: 2,
            buffer_lines: 3,
        }
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", small()).unwrap();

        for i in 0..6 {
            file.write_all(format!("line number {:02} here\n", i).as_bytes()).unwrap();
        }
        file.flush().unwrap();

        let active = dir.path().join("app.log");
        assert!(active.exists());
        assert!(dir.path().join("app.log.1").exists());
        assert!(dir.path().join("app.log.2").exists());
        assert!(!dir.path().join("app.log.3").exists());
        assert!(fs::read_to_string(active).unwrap().contains("05"));
    }

    #[test]
    fn test_ring_buffer_keeps_latest_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", small()).unwrap();

        write!(file, "a\nb\nc\nd").unwrap();
        assert_eq!(file.recent_lines(), vec!["a", "b", "c"]);

        // "d" only lands once its line is finished
        write!(file, "\ne\n").unwrap();
        assert_eq!(file.recent_lines(), vec!["c", "d", "e"]);
    }
}
