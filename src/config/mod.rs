use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::{debug, trace, LevelFilter};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    config_error,
    core::{ResolveError, ResolveResult},
    hierarchy::{LayerSet, SourceDomain},
};

/// Runtime scope. `Dev` parses sources on every call; the others go through
/// the two cache tiers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    #[serde(alias = "development")]
    Dev,
    #[serde(alias = "production")]
    Prod,
    Test,
}

impl Scope {
    pub fn is_dev(self) -> bool {
        self == Scope::Dev
    }
}

impl FromStr for Scope {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Scope::Dev),
            "prod" | "production" => Ok(Scope::Prod),
            "test" => Ok(Scope::Test),
            other => Err(config_error!("unknown scope '{}'", other)),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = match self {
            Scope::Dev => "dev",
            Scope::Prod => "prod",
            Scope::Test => "test",
        };
        write!(f, "{scope}")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "Settings::validate_identifiers"))]
pub struct Settings {
    /// Physical location of the project on the server
    pub project_root: PathBuf,
    #[serde(default)]
    pub scope: Scope,
    /// Where the `.cache` directory lives, defaults to `project_root`
    pub cache_dir: Option<PathBuf>,
    pub bundle: Option<String>,
    pub project: Option<String>,
    #[serde(default = "Settings::default_language")]
    #[validate(length(min = 2, max = 5))]
    pub language: String,
    #[validate(nested)]
    #[serde(default)]
    pub log: Log,
}

// Settings file load and validation
impl Settings {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            scope: Scope::default(),
            cache_dir: None,
            bundle: None,
            project: None,
            language: Self::default_language(),
            log: Log::default(),
        }
    }

    pub fn load_from_yaml<P>(path: P) -> ResolveResult<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let conf_str = fs::read_to_string(path).map_err(|e| {
            config_error!("Unable to read settings file {}: {}", path.display(), e)
        })?;
        debug!("Settings file read from {}", path.display());
        Self::from_yaml(&conf_str)
    }

    pub fn from_yaml(conf_str: &str) -> ResolveResult<Self> {
        trace!("Read settings: {conf_str}");
        let settings: Settings = serde_yaml::from_str(conf_str)
            .map_err(|e| config_error!("Unable to parse settings: {}", e))?;

        trace!("Loaded settings: {settings:?}");

        settings.validate()?;

        Ok(settings)
    }

    pub fn to_yaml(&self) -> ResolveResult<String> {
        serde_yaml::to_string(self).map_err(|e| config_error!("Unable to render settings: {}", e))
    }

    pub fn cache_base(&self) -> &Path {
        self.cache_dir.as_deref().unwrap_or(&self.project_root)
    }

    /// Layers of `domain` for this project, bundle and project context
    pub fn layer_set(&self, domain: SourceDomain) -> LayerSet {
        LayerSet::new(
            domain,
            &self.project_root,
            self.bundle.as_deref(),
            self.project.as_deref(),
        )
    }

    fn default_language() -> String {
        "en".to_string()
    }

    fn validate_identifiers(&self) -> Result<(), ValidationError> {
        for name in [&self.bundle, &self.project].into_iter().flatten() {
            if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
                let mut err = ValidationError::new("invalid_package_name");
                err.add_param("name".into(), name);
                return Err(err);
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
pub struct Log {
    #[serde(default = "Log::default_level")]
    #[validate(custom(function = "validate_level"))]
    pub level: String,
    /// Log file; stderr when unset
    pub path: Option<PathBuf>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            path: None,
        }
    }
}

impl Log {
    fn default_level() -> String {
        "info".to_string()
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.level.parse().unwrap_or(LevelFilter::Info)
    }
}

fn validate_level(level: &str) -> Result<(), ValidationError> {
    if level.parse::<LevelFilter>().is_err() {
        return Err(ValidationError::new("invalid_log_level"));
    }
    Ok(())
}
