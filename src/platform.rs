//! # Platform-specific utilities
//!
//! Locates optional external optimizers. A tool is looked up in the
//! directory named by `TOOLS_DIR` first (bundled builds), then on `PATH`.
//! A missing tool is not an error: the strategy that needs it is disabled.

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable pointing at a directory of bundled tools
pub const TOOLS_DIR_ENV: &str = "TOOLS_DIR";

pub const PNGQUANT: &str = "pngquant";

/// Resolves external tool executables
pub struct ToolLocator {
    tools_dir: Option<PathBuf>,
}

impl ToolLocator {
    /// Locator honouring `TOOLS_DIR`
    pub fn from_env() -> Self {
        Self::new(env::var_os(TOOLS_DIR_ENV).map(PathBuf::from))
    }

    pub fn new(tools_dir: Option<PathBuf>) -> Self {
        Self { tools_dir }
    }

    /// Resolve `tool_name` to an executable path
    pub fn resolve(&self, tool_name: &str) -> Option<PathBuf> {
        if let Some(ref tools_dir) = self.tools_dir {
            let bundled = Self::bundled_path(tools_dir, tool_name);
            if bundled.is_file() {
                debug!("Using bundled tool: {} -> {}", tool_name, bundled.display());
                return Some(bundled);
            }
            debug!("Bundled path does not exist: {}", bundled.display());
        }

        match which::which(tool_name) {
            Ok(path) => {
                debug!("Using system tool: {} -> {}", tool_name, path.display());
                Some(path)
            }
            Err(e) => {
                debug!("Tool not found: {} ({})", tool_name, e);
                None
            }
        }
    }

    fn bundled_path(tools_dir: &Path, tool_name: &str) -> PathBuf {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        tools_dir.join(format!("{}{}", tool_name, extension))
    }
}

/// Resolve `pngquant` using the process environment
pub fn find_pngquant() -> Option<PathBuf> {
    ToolLocator::from_env().resolve(PNGQUANT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_tool_is_preferred() {
        let temp_dir = TempDir::new().unwrap();
        let name = if cfg!(windows) { "pngquant.exe" } else { "pngquant" };
        let bundled = temp_dir.path().join(name);
        std::fs::write(&bundled, b"").unwrap();

        let locator = ToolLocator::new(Some(temp_dir.path().to_path_buf()));
        assert_eq!(locator.resolve(PNGQUANT), Some(bundled));
    }

    #[test]
    fn test_unknown_tool_is_none() {
        let temp_dir = TempDir::new().unwrap();
        let locator = ToolLocator::new(Some(temp_dir.path().to_path_buf()));
        assert!(locator.resolve("definitely-not-an-installed-tool-42").is_none());
    }
}
