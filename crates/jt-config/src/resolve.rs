//! Model path resolution.
//!
//! Precedence: explicit CLI path → `JT_MODEL` → `$XDG_CONFIG_HOME/junction-tree/model.json`
//! → built-in student network.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable naming a model file.
pub const MODEL_ENV_VAR: &str = "JT_MODEL";

/// File name looked up in the user config directory.
pub const MODEL_FILE_NAME: &str = "model.json";

/// Where the model in use came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum ModelSource {
    /// `--model` on the command line
    Cli(PathBuf),
    /// `JT_MODEL`
    Env(PathBuf),
    /// User config directory
    Xdg(PathBuf),
    /// Embedded student network
    Builtin,
}

impl ModelSource {
    pub fn path(&self) -> Option<&Path> {
        match self {
            ModelSource::Cli(p) | ModelSource::Env(p) | ModelSource::Xdg(p) => Some(p),
            ModelSource::Builtin => None,
        }
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Cli(p) => write!(f, "{} (--model)", p.display()),
            ModelSource::Env(p) => write!(f, "{} ({MODEL_ENV_VAR})", p.display()),
            ModelSource::Xdg(p) => write!(f, "{} (config dir)", p.display()),
            ModelSource::Builtin => write!(f, "built-in student network"),
        }
    }
}

/// Resolve the model source from the process environment.
pub fn resolve_model_path(cli: Option<&Path>) -> ModelSource {
    let env = std::env::var_os(MODEL_ENV_VAR).map(PathBuf::from);
    let config_dir = dirs::config_dir().map(|d| d.join("junction-tree"));
    resolve_with(cli, env, config_dir.as_deref())
}

/// Resolution with every input made explicit (used by tests).
///
/// CLI and env paths are taken as given even if missing, so a typo
/// surfaces as a load error instead of a silent fallback. The config
/// directory entry only counts when the file exists.
pub fn resolve_with(
    cli: Option<&Path>,
    env: Option<PathBuf>,
    config_dir: Option<&Path>,
) -> ModelSource {
    if let Some(path) = cli {
        return ModelSource::Cli(path.to_path_buf());
    }
    if let Some(path) = env.filter(|p| !p.as_os_str().is_empty()) {
        return ModelSource::Env(path);
    }
    if let Some(dir) = config_dir {
        let candidate = dir.join(MODEL_FILE_NAME);
        if candidate.is_file() {
            return ModelSource::Xdg(candidate);
        }
    }
    ModelSource::Builtin
}
