use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

/// Centralized, process-wide configuration.
///
/// Only the `git` binary location is needed here: the engine itself never
/// shells out, but the text listener's `--log` mode does (see
/// `listeners::text`), and that shell-out needs a real `git` to invoke.
pub struct Config {
    git_path: String,
}

#[derive(Deserialize, Default)]
struct FileConfig {
    #[serde(default)]
    git_path: Option<String>,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    /// Access the global configuration, lazily initializing it on first use.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(build_config)
    }

    /// Returns the command to invoke for the one deliberate shell-out.
    pub fn git_cmd(&self) -> &str {
        &self.git_path
    }
}

fn build_config() -> Config {
    let file_cfg = load_file_config();
    Config {
        git_path: resolve_git_path(&file_cfg),
    }
}

fn resolve_git_path(file_cfg: &Option<FileConfig>) -> String {
    if let Some(cfg) = file_cfg {
        if let Some(path) = cfg.git_path.as_ref() {
            let trimmed = path.trim();
            if !trimmed.is_empty() && is_executable(Path::new(trimmed)) {
                return trimmed.to_string();
            }
        }
    }

    let candidates: &[&str] = &[
        "/opt/homebrew/bin/git",
        "/usr/local/bin/git",
        "/usr/bin/git",
        "/bin/git",
        "/usr/local/sbin/git",
        "/usr/sbin/git",
        r"C:\Program Files\Git\bin\git.exe",
        r"C:\Program Files (x86)\Git\bin\git.exe",
    ];

    if let Some(found) = candidates.iter().map(Path::new).find(|p| is_executable(p)) {
        return found.to_string_lossy().to_string();
    }

    // Fall back to bare "git" and let PATH resolution decide; only the
    // `--log` CLI mode depends on this, so there is nothing fatal about
    // deferring the failure to that command's invocation.
    "git".to_string()
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_file_path()?;
    let data = fs::read(&path).ok()?;
    serde_json::from_slice::<FileConfig>(&data).ok()
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("GIT_DEPS_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".git-deps").join("config.json"))
}

fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_git_path_falls_back_to_bare_git() {
        let path = resolve_git_path(&None);
        assert!(!path.is_empty());
    }
}
