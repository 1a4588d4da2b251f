//! Where doc-narrator keeps its files.
//!
//! ```text
//! <config_dir>/doc-narrator/settings.toml
//! <data_local_dir>/doc-narrator/models/ggml-*.bin
//! ```
//!
//! `config_dir` and `data_local_dir` come from `dirs` (`~/.config` and
//! `~/.local/share` on Linux, `Application Support` on macOS, `%APPDATA%` and
//! `%LOCALAPPDATA%` on Windows). Job working directories are not here; they
//! live under `PipelineConfig::work_root`.

use std::path::{Path, PathBuf};

const APP_DIR: &str = "doc-narrator";
const SETTINGS_FILE: &str = "settings.toml";
const MODELS_DIR: &str = "models";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    /// GGML Whisper models, see [`crate::stt::ModelPaths`].
    pub models_dir: PathBuf,
}

impl AppPaths {
    /// Platform locations; the current directory stands in for any the
    /// platform does not define.
    pub fn new() -> Self {
        let here = || PathBuf::from(".");
        Self::rooted(
            &dirs::config_dir().unwrap_or_else(here),
            &dirs::data_local_dir().unwrap_or_else(here),
        )
    }

    /// Lay the application directories out under explicit roots.
    pub fn rooted(config_root: &Path, data_root: &Path) -> Self {
        let config_dir = config_root.join(APP_DIR);
        Self {
            settings_file: config_dir.join(SETTINGS_FILE),
            config_dir,
            models_dir: data_root.join(APP_DIR).join(MODELS_DIR),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_layout() {
        let paths = AppPaths::rooted(Path::new("/cfg"), Path::new("/data"));
        assert_eq!(paths.config_dir, PathBuf::from("/cfg/doc-narrator"));
        assert_eq!(
            paths.settings_file,
            PathBuf::from("/cfg/doc-narrator/settings.toml")
        );
        assert_eq!(paths.models_dir, PathBuf::from("/data/doc-narrator/models"));
    }

    #[test]
    fn platform_paths_end_in_app_layout() {
        let paths = AppPaths::new();
        assert!(paths.settings_file.ends_with("doc-narrator/settings.toml"));
        assert!(paths.models_dir.ends_with("doc-narrator/models"));
    }

    #[test]
    fn model_paths_follow_app_paths() {
        let paths = AppPaths::rooted(Path::new("/cfg"), Path::new("/data"));
        let models = crate::stt::ModelPaths::from_app_paths(&paths);
        assert_eq!(
            models.resolve("tiny"),
            PathBuf::from("/data/doc-narrator/models/ggml-tiny.bin")
        );
    }
}
