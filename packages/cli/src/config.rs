use anyhow::Context;
use pagetree_common::FileSystem;
use pagetree_project::ProjectLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "pagetree.config.json";

/// Pagetree configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Project that owns the pages and sections in this directory
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Directory of stored section definitions
    #[serde(default = "default_sections_dir")]
    pub sections_dir: String,

    /// Directory of stored page outlines
    #[serde(default = "default_pages_dir")]
    pub pages_dir: String,

    /// Label table
    #[serde(default = "default_labels_file")]
    pub labels_file: String,
}

fn default_project_id() -> String {
    "project".to_string()
}

fn default_sections_dir() -> String {
    "sections".to_string()
}

fn default_pages_dir() -> String {
    "pages".to_string()
}

fn default_labels_file() -> String {
    "labels.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(fs: &dyn FileSystem, cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if fs.exists(&config_path) {
            let content = fs
                .read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn layout(&self, cwd: &Path) -> ProjectLayout {
        ProjectLayout::new(cwd)
            .with_sections_dir(&self.sections_dir)
            .with_labels_file(&self.labels_file)
    }

    pub fn get_pages_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.pages_dir)
    }

    /// A page argument as given, or else relative to the pages directory
    pub fn page_path(&self, fs: &dyn FileSystem, cwd: &Path, page: &Path) -> PathBuf {
        let direct = cwd.join(page);
        if fs.exists(&direct) {
            return direct;
        }
        let in_pages = self.get_pages_dir(cwd).join(page);
        if fs.exists(&in_pages) || page.extension().is_some() {
            in_pages
        } else {
            in_pages.with_extension("json")
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: default_project_id(),
            sections_dir: default_sections_dir(),
            pages_dir: default_pages_dir(),
            labels_file: default_labels_file(),
        }
    }
}
