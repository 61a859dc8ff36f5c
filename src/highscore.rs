//! Best-effort high score persistence
//!
//! The file holds a single decimal integer and nothing else.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const FILE_NAME: &str = "highscore.txt";

/// Somewhere a single best score can be read from and written to
pub trait HighScoreStore {
    /// Read the stored score; anything unreadable counts as 0
    fn load(&self) -> u64;
    /// Persist a new best score
    fn save(&mut self, score: u64) -> io::Result<()>;
}

/// High score kept in a plain text file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: Option<PathBuf>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Use `override_path` if set, otherwise the platform data directory
    pub fn locate(override_path: Option<&Path>) -> Self {
        let path = override_path.map(Path::to_path_buf).or_else(|| {
            ProjectDirs::from("com", "blocktris", "blocktris")
                .map(|dirs| dirs.data_dir().join(FILE_NAME))
        });
        match path {
            Some(path) => Self::new(path),
            None => {
                tracing::warn!("No data directory available, high score will not persist");
                Self { path: None }
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> u64 {
        let Some(path) = &self.path else {
            return 0;
        };
        match fs::read_to_string(path) {
            Ok(contents) => parse_score(&contents),
            Err(_) => 0,
        }
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no high score location",
            ));
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, score.to_string())
    }
}

/// High score that lives only as long as the process
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub score: u64,
}

#[cfg(test)]
impl HighScoreStore for MemoryStore {
    fn load(&self) -> u64 {
        self.score
    }

    fn save(&mut self, score: u64) -> io::Result<()> {
        self.score = score;
        Ok(())
    }
}

/// First line as a decimal integer, 0 if it isn't one
fn parse_score(contents: &str) -> u64 {
    contents
        .lines()
        .next()
        .and_then(|line| line.trim().parse().ok())
        .unwrap_or(0)
}
