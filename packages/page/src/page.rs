//! # Page
//!
//! A page is two markup roots, `head` and `body`, owned by a project page
//! `ident`. Roots are addressed from the base ids `{ident}_head` and
//! `{ident}_body`.
//!
//! ## Registries
//!
//! After [`Page::address`] the page knows where each of its widgets and
//! placeholders lives, and [`Page::resolve_sections`] adds the included
//! section copies by alias. Registries store locations, never nodes, so they
//! stay valid only until the tree changes shape; every mutating entry point
//! here re-addresses before returning.
//!
//! Widgets inside an included section are *not* page widgets. They are found
//! through [`Page::section_widget`], so a page widget `w` and a widget `w`
//! inside section copy `f_0` never collide.
//!
//! ## Concurrency
//!
//! Addressing and inclusion mutate the registries in place and take
//! `&mut self`. Distinct pages share nothing and can be processed in
//! parallel.

use crate::error::{PageError, PageResult};
use crate::inclusion::{section_locations, DependencySink, InclusionEngine, InclusionReport};
use crate::uniquify::uniquify;
use pagetree_markup::{
    assign_address, BuildError, Ident, IdGenerator, Location, Node, Outline, Part, Section,
    SectionPlaceHolder, TreeBuilder, Widget, WidgetRegistry,
};
use pagetree_project::SectionSource;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{error, info, instrument};

/// One of the two roots of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageRoot {
    Head,
    Body,
}

impl PageRoot {
    pub const ALL: [PageRoot; 2] = [PageRoot::Head, PageRoot::Body];

    pub fn name(self) -> &'static str {
        match self {
            PageRoot::Head => "head",
            PageRoot::Body => "body",
        }
    }
}

impl fmt::Display for PageRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a registered node lives on a page
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeRef {
    pub root: PageRoot,
    pub location: Location,
}

impl NodeRef {
    pub fn new(root: PageRoot, location: Location) -> Self {
        Self { root, location }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    ident: Ident,
    pub head: Part,
    pub body: Part,
    widgets: BTreeMap<String, NodeRef>,
    placeholders: BTreeMap<String, NodeRef>,
    sections: BTreeMap<String, NodeRef>,
    aliases: Vec<String>,
    section_dependencies: BTreeMap<String, BTreeSet<String>>,
    ids: IdGenerator,
}

impl Page {
    pub fn new(ident: Ident) -> Self {
        Self::with_roots(ident, Part::new("head"), Part::new("body"))
    }

    /// A page over existing roots. Call [`Page::address`] before looking
    /// anything up.
    pub fn with_roots(ident: Ident, head: Part, body: Part) -> Self {
        let ids = IdGenerator::new(&format!("{}_{}", ident, PageRoot::Body));
        Self {
            ident,
            head,
            body,
            widgets: BTreeMap::new(),
            placeholders: BTreeMap::new(),
            sections: BTreeMap::new(),
            aliases: Vec::new(),
            section_dependencies: BTreeMap::new(),
            ids,
        }
    }

    pub fn ident(&self) -> &Ident {
        &self.ident
    }

    /// Owning project id
    pub fn project(&self) -> &str {
        &self.ident.project
    }

    pub fn base_id(&self, root: PageRoot) -> String {
        format!("{}_{}", self.ident, root)
    }

    pub fn root(&self, root: PageRoot) -> &Part {
        match root {
            PageRoot::Head => &self.head,
            PageRoot::Body => &self.body,
        }
    }

    pub fn root_mut(&mut self, root: PageRoot) -> &mut Part {
        match root {
            PageRoot::Head => &mut self.head,
            PageRoot::Body => &mut self.body,
        }
    }

    pub fn get(&self, node: &NodeRef) -> Option<&Node> {
        self.root(node.root).get(&node.location)
    }

    pub fn get_mut(&mut self, node: &NodeRef) -> Option<&mut Node> {
        self.root_mut(node.root).get_mut(&node.location)
    }

    /// Address both roots and rebuild the registries
    ///
    /// A name used twice across the page is an error: content merged from
    /// elsewhere goes through [`Page::merge`], which renames it first.
    #[instrument(skip(self), fields(page = %self.ident))]
    pub fn address(&mut self) -> PageResult<()> {
        self.widgets.clear();
        self.placeholders.clear();
        self.sections.clear();

        let mut collisions = Vec::new();
        for root in PageRoot::ALL {
            let base_id = self.base_id(root);
            let registries = assign_address(self.root_mut(root), &base_id);
            collisions.extend(registries.collisions);

            for (name, location) in registries.widgets {
                if self.placeholders.contains_key(&name) || self.widgets.contains_key(&name) {
                    collisions.push(name);
                    continue;
                }
                self.widgets.insert(name, NodeRef::new(root, location));
            }
            for (name, location) in registries.placeholders {
                if self.placeholders.contains_key(&name) || self.widgets.contains_key(&name) {
                    collisions.push(name);
                    continue;
                }
                self.placeholders.insert(name, NodeRef::new(root, location));
            }
            for (alias, location) in section_locations(self.root(root)) {
                self.sections
                    .entry(alias)
                    .or_insert_with(|| NodeRef::new(root, location));
            }
        }

        if let Some(name) = collisions.into_iter().next() {
            error!(name = %name, "Duplicate widget or placeholder name on page");
            return Err(PageError::collision(name));
        }

        info!(
            widgets = self.widgets.len(),
            placeholders = self.placeholders.len(),
            sections = self.sections.len(),
            "Page addressed"
        );
        Ok(())
    }

    /// Fill every placeholder of the page from `source`
    ///
    /// `overrides` force a placeholder, by placename, to be shown or hidden.
    /// Missing sections are reported in the returned [`InclusionReport`] and
    /// leave their placeholders in place.
    #[instrument(skip(self, source, overrides, sink), fields(page = %self.ident))]
    pub fn resolve_sections<S: SectionSource + ?Sized>(
        &mut self,
        source: &S,
        overrides: &BTreeMap<String, bool>,
        sink: &mut dyn DependencySink,
    ) -> PageResult<InclusionReport> {
        self.address()?;
        info!(placeholders = self.placeholders.len(), "Resolving sections");

        let taken: Vec<String> = self.names().into_iter().collect();
        let included: Vec<String> = self.sections.keys().cloned().collect();
        let mut engine = InclusionEngine::new(source, overrides, sink)
            .with_taken_names(taken)
            .with_aliases(included);
        for root in PageRoot::ALL {
            let base_id = self.base_id(root);
            engine.include(self.root_mut(root), &base_id);
        }
        let outcome = engine.finish();

        self.aliases = outcome.aliases;
        for (section, modules) in outcome.dependencies {
            self.section_dependencies
                .entry(section)
                .or_default()
                .extend(modules);
        }
        self.address()?;

        info!(
            included = outcome.report.included.len(),
            hidden = outcome.report.hidden.len(),
            misses = outcome.report.misses.len(),
            "Sections resolved"
        );
        Ok(outcome.report)
    }

    /// Insert content from elsewhere at `location` of `root`
    ///
    /// Widget and placeholder names are made unique against the page first,
    /// then the page is re-addressed. Returns the renames performed.
    pub fn merge(
        &mut self,
        root: PageRoot,
        location: &Location,
        node: impl Into<Node>,
    ) -> PageResult<Vec<(String, String)>> {
        let mut node = node.into();
        node.clear_addresses();

        let mut taken = self.names();
        taken.extend(self.aliases.iter().cloned());
        let renamed = uniquify(&mut node, &mut taken);

        self.root_mut(root)
            .insert(location, node)
            .map_err(|_| PageError::InvalidLocation {
                root: root.to_string(),
                location: location.to_string(),
            })?;
        self.address()?;
        Ok(renamed)
    }

    /// Remove the node at `location` of `root` and re-address
    pub fn remove(&mut self, root: PageRoot, location: &Location) -> PageResult<Node> {
        let removed = self
            .root_mut(root)
            .remove(location)
            .map_err(|_| PageError::InvalidLocation {
                root: root.to_string(),
                location: location.to_string(),
            })?;
        self.address()?;
        Ok(removed)
    }

    /// Id for a node created after the last addressing pass. Assigned once,
    /// then kept.
    pub fn ensure_position_id(&mut self, node: &NodeRef) -> Option<String> {
        let Page { head, body, ids, .. } = self;
        let root = match node.root {
            PageRoot::Head => head,
            PageRoot::Body => body,
        };
        root.get_mut(&node.location)?.ensure_position_id(ids)
    }

    pub fn widget(&self, name: &str) -> Option<&Widget> {
        let node = self.widgets.get(name)?;
        self.get(node)?.as_widget()
    }

    pub fn widget_mut(&mut self, name: &str) -> Option<&mut Widget> {
        let node = self.widgets.get(name)?.clone();
        self.get_mut(&node)?.as_widget_mut()
    }

    pub fn placeholder(&self, name: &str) -> Option<&SectionPlaceHolder> {
        let node = self.placeholders.get(name)?;
        self.get(node)?.as_placeholder()
    }

    /// Included section copy by alias (`f`, or `f_0`, `f_1`, ... for
    /// repeated inclusions)
    pub fn section(&self, alias: &str) -> Option<&Section> {
        let node = self.sections.get(alias)?;
        self.get(node)?.as_section()
    }

    /// Widget `name` inside the section copy included as `alias`
    pub fn section_widget(&self, alias: &str, name: &str) -> Option<&Widget> {
        self.section(alias)?.widget(name)
    }

    pub fn section_widget_mut(&mut self, alias: &str, name: &str) -> Option<&mut Widget> {
        let node = self.sections.get(alias)?.clone();
        match self.get_mut(&node)? {
            Node::Section(section) => section.widget_mut(name),
            _ => None,
        }
    }

    pub fn widgets(&self) -> &BTreeMap<String, NodeRef> {
        &self.widgets
    }

    pub fn placeholders(&self) -> &BTreeMap<String, NodeRef> {
        &self.placeholders
    }

    /// Aliases registered by the last inclusion pass
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn section_aliases(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Section definition name -> widget modules its copies need
    pub fn section_dependencies(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.section_dependencies
    }

    /// Every widget and placeholder name on the page
    pub fn names(&self) -> BTreeSet<String> {
        self.widgets
            .keys()
            .chain(self.placeholders.keys())
            .cloned()
            .collect()
    }

    /// `{"head": .., "body": ..}`, relative to the page's project
    pub fn outline(&self) -> Value {
        let owner = self.project();
        let mut map = Map::new();
        map.insert("head".into(), self.head.outline(owner));
        map.insert("body".into(), self.body.outline(owner));
        Value::Object(map)
    }

    /// Rebuild a page from its outline and address it
    #[instrument(skip(value, widgets), fields(page = %ident))]
    pub fn build(value: &Value, ident: Ident, widgets: &WidgetRegistry) -> PageResult<Self> {
        let map = value
            .as_object()
            .ok_or_else(|| BuildError::malformed("page outline must be an object"))?;
        let builder = TreeBuilder::new(&ident.project, widgets);

        let head = match map.get("head") {
            Some(head) => builder.build_part(head)?,
            None => Part::new("head"),
        };
        let body = map
            .get("body")
            .ok_or_else(|| BuildError::missing_field("Page", "body"))?;
        let body = builder.build_part(body)?;

        let mut page = Page::with_roots(ident, head, body);
        page.address()?;
        Ok(page)
    }
}
