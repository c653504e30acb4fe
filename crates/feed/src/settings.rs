use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};

use crate::scroll::{DEFAULT_BOTTOM_THRESHOLD, ScrollBehavior};

pub const SETTINGS_DIRECTORY_NAME: &str = "parlor";
pub const SETTINGS_FILE_NAME: &str = "feed.json";
/// Environment overrides, e.g. `PARLOR_FEED_BOTTOM_THRESHOLD=80`.
pub const SETTINGS_ENV_PREFIX: &str = "PARLOR_FEED_";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_bottom_threshold")]
    pub bottom_threshold: f32,
    #[serde(default)]
    pub scroll_behavior: ScrollBehavior,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            bottom_threshold: default_bottom_threshold(),
            scroll_behavior: ScrollBehavior::default(),
        }
    }
}

impl FeedSettings {
    /// Defaults, then the JSON file at `path` when present, then environment overrides.
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Json::file(path))
            .merge(Env::prefixed(SETTINGS_ENV_PREFIX))
    }

    pub fn load(path: &Path) -> SettingsResult<Self> {
        let settings: Self = Self::figment(path).extract().context(ExtractSnafu {
            stage: "extract-feed-settings",
            path: path.to_path_buf(),
        })?;
        settings.validated()
    }

    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                tracing::debug!(?settings, "loaded feed settings from {:?}", path);
                settings
            }
            Err(error) => {
                tracing::warn!("{error}. using default feed settings");
                Self::default()
            }
        }
    }

    pub fn validated(self) -> SettingsResult<Self> {
        ensure!(
            self.bottom_threshold.is_finite() && self.bottom_threshold >= 0.0,
            InvalidThresholdSnafu {
                stage: "validate-feed-settings",
                value: self.bottom_threshold,
            }
        );
        Ok(self)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to read feed settings from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
    #[snafu(display("bottom threshold {value} is not a finite non-negative distance on `{stage}`"))]
    InvalidThreshold { stage: &'static str, value: f32 },
}

pub type SettingsResult<T> = Result<T, SettingsError>;

fn default_bottom_threshold() -> f32 {
    DEFAULT_BOTTOM_THRESHOLD
}
