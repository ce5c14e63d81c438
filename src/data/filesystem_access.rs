//! Represents the user directories where models are looked up by default.
use std::path::PathBuf;

#[derive(Debug, Clone, Copy)]
pub enum FsAccess {
    Cache,
    Home,
}

impl FsAccess {
    /// Lookup order for model files.
    pub const MODEL_DIRS: [FsAccess; 2] = [FsAccess::Cache, FsAccess::Home];

    /// Retrieves the `bvr` directory under the user's cache or home directory.
    fn get_path(&self) -> anyhow::Result<PathBuf> {
        let base_path = match self {
            FsAccess::Cache => dirs::cache_dir(),
            FsAccess::Home => dirs::home_dir(),
        };

        let mut path = base_path.ok_or_else(|| {
            anyhow::anyhow!("Unsupported operating system. Supported OS: Linux, MacOS, Windows.")
        })?;

        match self {
            FsAccess::Cache => path.push("bvr"),
            FsAccess::Home => path.push(".bvr"),
        }
        Ok(path)
    }

    /// Constructs a path under the `bvr` directory without touching the filesystem.
    ///
    /// Examples:
    /// `~/.cache/bvr/models`, `~/.bvr/models`.
    pub fn path_with_subs(&self, subs: &[&str]) -> anyhow::Result<PathBuf> {
        let mut d = self.get_path()?;
        for sub in subs {
            d.push(sub);
        }
        Ok(d)
    }

    /// Finds `file_name` under `models/` in the cache directory, then in `~/.bvr`.
    /// When neither exists the cache location is returned so the error names it.
    pub fn locate_model(file_name: &str) -> anyhow::Result<PathBuf> {
        let mut candidates = Vec::with_capacity(Self::MODEL_DIRS.len());
        for dir in Self::MODEL_DIRS {
            if let Ok(path) = dir.path_with_subs(&["models", file_name]) {
                if path.is_file() {
                    return Ok(path);
                }
                candidates.push(path);
            }
        }
        candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no user directory available to look up {}", file_name))
    }
}
