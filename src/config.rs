use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// String lookups by key, supplied by the host application
pub trait ConfigProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Configuration from the process environment, falling back to a `.env` file.
///
/// Variables already set in the environment win over the file. The file is re-read on
/// every lookup and the process environment is never modified.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    env_file: Option<PathBuf>,
}

impl EnvConfig {
    /// Look for `.env` in the current directory and its parents
    pub fn new() -> Self {
        EnvConfig { env_file: None }
    }

    /// Use an explicit env file
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        EnvConfig {
            env_file: Some(path.into()),
        }
    }

    fn env_file_value(&self, key: &str) -> Option<String> {
        let entries = match &self.env_file {
            Some(path) => dotenvy::from_path_iter(path),
            None => dotenvy::dotenv_iter(),
        };

        let entries = match entries {
            Ok(entries) => entries,
            Err(e) => {
                debug!(error = %e, "No readable .env file");
                return None;
            }
        };

        for entry in entries {
            match entry {
                Ok((name, value)) if name == key => return Some(value),
                Ok(_) => continue,
                Err(dotenvy::Error::LineParse(line, index)) => {
                    warn!(line = %line, index, "Skipping malformed line in .env file");
                    continue;
                }
                Err(e) => {
                    warn!(error = %e, "Could not read .env file");
                    return None;
                }
            }
        }

        None
    }
}

impl ConfigProvider for EnvConfig {
    fn get(&self, key: &str) -> Option<String> {
        match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env_file_value(key),
        }
    }
}

impl ConfigProvider for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}
