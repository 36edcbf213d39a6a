use crate::error::Result;
use crate::fit::FitOptions;
use crate::session::SessionConfig;
use crate::target::TargetGenerator;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Fixed seed for replayable target sequences
    pub seed: Option<u64>,
    pub max_fit_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionConfig::default();
        Self {
            canvas_width: session.canvas_width,
            canvas_height: session.canvas_height,
            seed: None,
            max_fit_iterations: FitOptions::default().max_iterations,
        }
    }
}

impl Config {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
        }
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions::default().with_max_iterations(self.max_fit_iterations)
    }

    pub fn target_generator(&self) -> TargetGenerator {
        match self.seed {
            Some(seed) => TargetGenerator::seeded(seed),
            None => TargetGenerator::from_entropy(),
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "fittr") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("fittr_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Config>(&bytes).ok())
            .unwrap_or_default()
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
