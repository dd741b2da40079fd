//! # Project store
//!
//! A project owns the reusable section definitions its pages include and a
//! table of labels naming its pages. Pages never hold on to definitions:
//! they ask for a fresh copy through [`SectionSource`] whenever they include
//! one.
//!
//! ## On-disk layout
//!
//! ```text
//! <root>/
//!   sections/
//!     footer.json     outline of the "footer" section
//!     header.json
//!   labels.json       {"home": 1, "docs": ["lib", 4]}
//! ```
//!
//! Section files hold exactly what the outline serializer writes; change
//! tokens and other derived state are recomputed on load.

use crate::resolver::{ReferenceResolver, SectionSource};
use chrono::Utc;
use crc32fast::Hasher;
use pagetree_common::FileSystem;
use pagetree_markup::{
    Addressable, BuildError, EmbeddedContext, Ident, Location, Outline, Registries, Section,
    TreeBuilder, WidgetRegistry,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Section '{name}' not found in project")]
    SectionNotFound { name: String },

    #[error("Section '{section}' uses the name '{name}' more than once")]
    NameCollision { section: String, name: String },

    #[error("Invalid reference '{reference}'")]
    InvalidReference { reference: String },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid section in {path}: {source}")]
    Build { path: PathBuf, source: BuildError },

    #[error("Invalid labels file {path}: {message}")]
    InvalidLabels { path: PathBuf, message: String },
}

impl ProjectError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where a project keeps its files
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    /// Relative to `root`
    pub sections_dir: PathBuf,
    /// Relative to `root`
    pub labels_file: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sections_dir: PathBuf::from("sections"),
            labels_file: PathBuf::from("labels.json"),
        }
    }

    pub fn with_sections_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sections_dir = dir.into();
        self
    }

    pub fn with_labels_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.labels_file = file.into();
        self
    }

    pub fn sections_path(&self) -> PathBuf {
        self.root.join(&self.sections_dir)
    }

    pub fn section_path(&self, name: &str) -> PathBuf {
        self.sections_path().join(format!("{}.json", name))
    }

    pub fn labels_path(&self) -> PathBuf {
        self.root.join(&self.labels_file)
    }
}

/// Token identifying one saved revision of a section: CRC32 of its outline
/// followed by the save time in milliseconds, both hex
pub fn change_token(section: &Section, owner: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(section.outline(owner).to_string().as_bytes());
    format!(
        "{:08x}{:x}",
        hasher.finalize(),
        Utc::now().timestamp_millis()
    )
}

/// Section definitions and page labels of one project
#[derive(Debug, Clone, Default)]
pub struct Project {
    id: String,
    sections: BTreeMap<String, Section>,
    labels: BTreeMap<String, Ident>,
}

impl Project {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sections: BTreeMap::new(),
            labels: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Store a definition under `name`, replacing any previous one, and
    /// return its new change token.
    ///
    /// Widget and placeholder names must be unique inside a section; a
    /// definition that repeats one is refused and nothing is stored.
    pub fn save_section(
        &mut self,
        name: impl Into<String>,
        mut section: Section,
    ) -> ProjectResult<String> {
        let name = name.into();
        section.clear_addresses();
        section.name = name.clone();

        let mut addressed = section.clone();
        addressed.assign_address(
            &name,
            &Location::root(),
            &mut Registries::new(),
            &EmbeddedContext::default(),
        );
        if let Some(duplicate) = addressed.collisions.first() {
            return Err(ProjectError::NameCollision {
                section: name,
                name: duplicate.clone(),
            });
        }

        section.change_token = change_token(&section, &self.id);
        let token = section.change_token.clone();
        debug!(section = %name, token = %token, "Saved section");
        self.sections.insert(name, section);
        Ok(token)
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn remove_section(&mut self, name: &str) -> ProjectResult<Section> {
        self.sections
            .remove(name)
            .ok_or_else(|| ProjectError::SectionNotFound {
                name: name.to_string(),
            })
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn set_label(&mut self, label: impl Into<String>, ident: Ident) {
        self.labels.insert(label.into(), ident);
    }

    /// Label a page given its textual reference (`"4"`, `"lib,4"`)
    pub fn add_label(&mut self, label: impl Into<String>, reference: &str) -> ProjectResult<()> {
        let ident =
            Ident::parse(reference, &self.id).ok_or_else(|| ProjectError::InvalidReference {
                reference: reference.to_string(),
            })?;
        self.labels.insert(label.into(), ident);
        Ok(())
    }

    pub fn labels(&self) -> &BTreeMap<String, Ident> {
        &self.labels
    }

    /// Resolve a label or textual reference within this project
    pub fn resolve(&self, id_or_label: &str) -> Option<Ident> {
        self.labels.resolve_reference(id_or_label, &self.id)
    }

    /// Read a project's sections and labels through `fs`
    pub fn load(
        fs: &dyn FileSystem,
        layout: &ProjectLayout,
        project_id: &str,
        widgets: &WidgetRegistry,
    ) -> ProjectResult<Self> {
        let mut project = Project::new(project_id);
        let builder = TreeBuilder::new(project_id, widgets);

        let sections_dir = layout.sections_path();
        if fs.exists(&sections_dir) {
            let files = fs
                .list_dir(&sections_dir)
                .map_err(|e| ProjectError::io(&sections_dir, e))?;
            for path in files {
                if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                    continue;
                }
                let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                    continue;
                };
                let value = read_json(fs, &path)?;
                let section = builder
                    .build_section(&value)
                    .map_err(|source| ProjectError::Build {
                        path: path.clone(),
                        source,
                    })?;
                project.save_section(name, section)?;
            }
        }

        let labels_path = layout.labels_path();
        if fs.exists(&labels_path) {
            let value = read_json(fs, &labels_path)?;
            let entries = value
                .as_object()
                .ok_or_else(|| ProjectError::InvalidLabels {
                    path: labels_path.clone(),
                    message: "expected an object".to_string(),
                })?;
            for (label, reference) in entries {
                let ident = Ident::from_outline(reference, project_id).ok_or_else(|| {
                    ProjectError::InvalidLabels {
                        path: labels_path.clone(),
                        message: format!("label '{}' is not a reference", label),
                    }
                })?;
                project.labels.insert(label.clone(), ident);
            }
        }

        info!(
            project = %project.id,
            sections = project.sections.len(),
            labels = project.labels.len(),
            "Loaded project"
        );
        Ok(project)
    }

    /// Write every section and the label table back through `fs`
    pub fn store(&self, fs: &dyn FileSystem, layout: &ProjectLayout) -> ProjectResult<()> {
        for (name, section) in &self.sections {
            let path = layout.section_path(name);
            write_json(fs, &path, &section.outline(&self.id))?;
        }

        let labels: Map<String, Value> = self
            .labels
            .iter()
            .map(|(label, ident)| (label.clone(), ident.outline(&self.id)))
            .collect();
        write_json(fs, &layout.labels_path(), &Value::Object(labels))?;

        info!(project = %self.id, sections = self.sections.len(), "Stored project");
        Ok(())
    }
}

fn read_json(fs: &dyn FileSystem, path: &Path) -> ProjectResult<Value> {
    let text = fs
        .read_to_string(path)
        .map_err(|e| ProjectError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| ProjectError::json(path, e))
}

fn write_json(fs: &dyn FileSystem, path: &Path, value: &Value) -> ProjectResult<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| ProjectError::json(path, e))?;
    fs.write(path, &text).map_err(|e| ProjectError::io(path, e))
}

impl SectionSource for Project {
    fn section(&self, name: &str) -> Option<Section> {
        self.sections.get(name).cloned()
    }
}

impl ReferenceResolver for Project {
    fn resolve_reference(&self, id_or_label: &str, owner: &str) -> Option<Ident> {
        self.labels
            .get(id_or_label)
            .cloned()
            .or_else(|| Ident::parse(id_or_label, owner))
    }
}
