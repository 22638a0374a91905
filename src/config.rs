use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::Result;
use crate::models::{AppState, Survey};
use crate::store::DEFAULT_STATE_KEY;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    #[serde(default = "default_state_key")]
    pub state_key: String,

    /// Template used when nothing has been saved yet.
    #[serde(default)]
    pub survey: Option<Survey>,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".survey")
}

fn default_state_key() -> String {
    DEFAULT_STATE_KEY.into()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_dir: default_store_dir(),
            state_key: default_state_key(),
            survey: None,
        }
    }
}

impl Config {
    /// Loads the config file, or the defaults if there is none.
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(config) => {
                let config: Config = toml::de::from_str(&config)?;
                if let Some(survey) = &config.survey {
                    survey.check()?;
                }
                Ok(config)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using default configuration", path.display());
                Ok(Config::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn default_state(&self) -> AppState {
        match &self.survey {
            None => AppState::default(),
            Some(survey) => AppState::new(survey.clone()),
        }
    }
}
