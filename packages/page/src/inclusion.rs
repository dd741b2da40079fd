//! # Section inclusion
//!
//! Replaces every section placeholder of a tree with copies of the section
//! it names, fetched from a [`SectionSource`].
//!
//! Per placeholder, in document order:
//!
//! 1. Its placename (and `placename_k` for each repeated copy) is registered
//!    as an alias. An alias already taken by a widget, placeholder or earlier
//!    inclusion is a [`ResolutionMiss::NameCollision`] and the placeholder is
//!    skipped.
//! 2. A visibility override keyed by placename beats the placeholder's own
//!    `show` flag. Hidden placeholders keep their aliases but include nothing.
//!    Overrides hold for one pass only: the placeholder's stored `show` flag
//!    is left as it was, and [`InclusionReport::hidden`] is the record of
//!    what the pass hid.
//! 3. With multiplier 0 the section is included once, addressed at
//!    `{root_id}_{placename}` and given an `id` attribute equal to the
//!    placename unless it has one.
//! 4. With multiplier n the section is fetched n times. Copy `k` is addressed
//!    at `{root_id}_{placename}_{k}`. The first copy is wrapped in an `mtag`
//!    element with `id = placename`; the rest follow the wrapper as siblings.
//! 5. Every widget module used by an included copy is declared to the
//!    [`DependencySink`] and recorded against the section's definition name.
//! 6. A copy that uses a widget or placeholder name twice is still included,
//!    but reported as a [`ResolutionMiss::DuplicateName`]. Only the first
//!    holder of the name can be looked up inside the copy.
//!
//! A section that cannot be found leaves the placeholder where it was and is
//! reported as a [`ResolutionMiss`]; it never fails the pass. Placeholders
//! inside included copies are left alone, so a section that includes itself
//! cannot recurse.

use pagetree_common::{walk_widget, Visitor};
use pagetree_markup::location::splice_at;
use pagetree_markup::{
    assign_address, Addressable, EmbeddedContext, Location, Node, Part, Registries, Section,
    SectionPlaceHolder, Widget,
};
use pagetree_project::SectionSource;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Receives the client-side modules included content depends on
pub trait DependencySink {
    fn declare_dependency(&mut self, module: &str);
}

impl DependencySink for BTreeSet<String> {
    fn declare_dependency(&mut self, module: &str) {
        self.insert(module.to_string());
    }
}

/// Keeps first-declaration order, without repeats
impl DependencySink for Vec<String> {
    fn declare_dependency(&mut self, module: &str) {
        if !self.iter().any(|known| known == module) {
            self.push(module.to_string());
        }
    }
}

impl<F> DependencySink for F
where
    F: FnMut(&str),
{
    fn declare_dependency(&mut self, module: &str) {
        self(module)
    }
}

/// A placeholder that could not be filled. Reported, never raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionMiss {
    #[error("Section '{section_name}' for placeholder '{placename}' not found")]
    SectionNotFound {
        placename: String,
        section_name: String,
    },

    #[error("Alias '{alias}' of placeholder '{placename}' is already in use")]
    NameCollision { placename: String, alias: String },

    #[error("Section '{section_name}' included at '{placename}' uses the name '{name}' more than once")]
    DuplicateName {
        placename: String,
        section_name: String,
        name: String,
    },
}

impl ResolutionMiss {
    pub fn placename(&self) -> &str {
        match self {
            ResolutionMiss::SectionNotFound { placename, .. } => placename,
            ResolutionMiss::NameCollision { placename, .. } => placename,
            ResolutionMiss::DuplicateName { placename, .. } => placename,
        }
    }
}

/// What an inclusion pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InclusionReport {
    /// Aliases that received a section copy, in document order
    pub included: Vec<String>,
    /// Placenames skipped because they are not shown, whether by their own
    /// `show` flag or by an override. Placeholders are not modified.
    pub hidden: Vec<String>,
    pub misses: Vec<ResolutionMiss>,
}

impl InclusionReport {
    pub fn is_complete(&self) -> bool {
        self.misses.is_empty()
    }

    pub fn extend(&mut self, other: InclusionReport) {
        self.included.extend(other.included);
        self.hidden.extend(other.hidden);
        self.misses.extend(other.misses);
    }
}

/// Everything an inclusion pass registered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InclusionOutcome {
    /// Every alias registered, in registration order
    pub aliases: Vec<String>,
    /// Definition name -> widget modules its copies use
    pub dependencies: BTreeMap<String, BTreeSet<String>>,
    pub report: InclusionReport,
}

#[derive(Default)]
struct WidgetModules(Vec<&'static str>);

impl Visitor for WidgetModules {
    fn visit_widget(&mut self, widget: &Widget) {
        self.0.push(widget.kind().module());
        walk_widget(self, widget);
    }
}

/// Runs inclusion over one or more roots that share a name space
pub struct InclusionEngine<'a, S: SectionSource + ?Sized> {
    source: &'a S,
    overrides: &'a BTreeMap<String, bool>,
    sink: &'a mut dyn DependencySink,
    /// Widget and placeholder names of the host
    taken: BTreeSet<String>,
    alias_set: BTreeSet<String>,
    outcome: InclusionOutcome,
}

impl<'a, S: SectionSource + ?Sized> InclusionEngine<'a, S> {
    pub fn new(
        source: &'a S,
        overrides: &'a BTreeMap<String, bool>,
        sink: &'a mut dyn DependencySink,
    ) -> Self {
        Self {
            source,
            overrides,
            sink,
            taken: BTreeSet::new(),
            alias_set: BTreeSet::new(),
            outcome: InclusionOutcome::default(),
        }
    }

    /// Names used elsewhere on the host that aliases must not take
    pub fn with_taken_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.taken.extend(names);
        self
    }

    /// Aliases registered by an earlier pass
    pub fn with_aliases(mut self, aliases: impl IntoIterator<Item = String>) -> Self {
        for alias in aliases {
            self.register_alias(alias);
        }
        self
    }

    /// Include sections for every placeholder below `root`, then re-address
    /// it at `root_id`
    pub fn include(&mut self, root: &mut Part, root_id: &str) {
        let registries = assign_address(root, root_id);
        self.taken.extend(registries.names());

        let mut placeholders: Vec<(Location, SectionPlaceHolder)> = registries
            .placeholders
            .values()
            .filter_map(|location| {
                let placeholder = root.get(location)?.as_placeholder()?;
                Some((location.clone(), placeholder.clone()))
            })
            .collect();
        placeholders.sort_by(|a, b| a.0.cmp(&b.0));

        let mut splices = Vec::new();
        for (location, placeholder) in &placeholders {
            if let Some(nodes) = self.include_placeholder(placeholder, root_id) {
                splices.push((location.clone(), nodes));
            }
        }

        // Back to front, so earlier locations stay valid
        for (location, nodes) in splices.into_iter().rev() {
            if let Err(err) = splice_at(&mut root.children, &location, nodes) {
                warn!(root = root_id, error = %err, "Could not splice section copy");
            }
        }

        assign_address(root, root_id);
    }

    pub fn finish(self) -> InclusionOutcome {
        self.outcome
    }

    fn register_alias(&mut self, alias: String) {
        if self.alias_set.insert(alias.clone()) {
            self.outcome.aliases.push(alias);
        }
    }

    fn miss(&mut self, miss: ResolutionMiss) {
        warn!(placename = %miss.placename(), "{}", miss);
        self.outcome.report.misses.push(miss);
    }

    /// The nodes that replace `placeholder`, if anything is included
    fn include_placeholder(
        &mut self,
        placeholder: &SectionPlaceHolder,
        root_id: &str,
    ) -> Option<Vec<Node>> {
        let placename = &placeholder.placename;
        let copy_aliases: Vec<String> = (0..placeholder.multiplier)
            .map(|k| placeholder.copy_alias(k))
            .collect();

        let collision = std::iter::once(placename)
            .chain(&copy_aliases)
            .find(|alias| {
                self.alias_set.contains(*alias)
                    || (*alias != placename && self.taken.contains(*alias))
            })
            .cloned();
        if let Some(alias) = collision {
            self.miss(ResolutionMiss::NameCollision {
                placename: placename.clone(),
                alias,
            });
            return None;
        }

        self.register_alias(placename.clone());
        for alias in &copy_aliases {
            self.register_alias(alias.clone());
        }

        let shown = self
            .overrides
            .get(placename)
            .copied()
            .unwrap_or(placeholder.show);
        if !shown {
            debug!(placename = %placename, "Placeholder hidden");
            self.outcome.report.hidden.push(placename.clone());
            return None;
        }

        if placeholder.multiplier == 0 {
            let mut section = self.fetch(placeholder)?;
            if section.part.get_attrib("id").is_none() {
                section.part.set_attrib("id", placename.clone());
            }
            let section = prepare(
                section,
                placename,
                &format!("{}_{}", root_id, placename),
                &placeholder.embedded,
            );
            self.check_names(placeholder, &section);
            self.declare_dependencies(&section);
            self.outcome.report.included.push(placename.clone());
            debug!(placename = %placename, section = %placeholder.section_name, "Included section");
            return Some(vec![Node::Section(section)]);
        }

        let mut copies = Vec::with_capacity(copy_aliases.len());
        for alias in &copy_aliases {
            let section = self.fetch(placeholder)?;
            copies.push(prepare(
                section,
                alias,
                &format!("{}_{}", root_id, alias),
                &placeholder.embedded,
            ));
        }
        if let Some(first) = copies.first() {
            self.check_names(placeholder, first);
        }
        for section in &copies {
            self.declare_dependencies(section);
        }
        self.outcome.report.included.extend(copy_aliases.iter().cloned());
        debug!(
            placename = %placename,
            section = %placeholder.section_name,
            copies = copies.len(),
            "Included repeated section"
        );

        let mut copies = copies.into_iter().map(Node::Section);
        let mut wrapper = Part::new(placeholder.mtag.clone()).with_attr("id", placename.clone());
        wrapper.children.extend(copies.next());
        Some(std::iter::once(Node::Part(wrapper)).chain(copies).collect())
    }

    fn fetch(&mut self, placeholder: &SectionPlaceHolder) -> Option<Section> {
        let section = self.source.section(&placeholder.section_name);
        if section.is_none() {
            self.miss(ResolutionMiss::SectionNotFound {
                placename: placeholder.placename.clone(),
                section_name: placeholder.section_name.clone(),
            });
        }
        section
    }

    /// Copies of one definition share their names, so one report per
    /// placeholder is enough
    fn check_names(&mut self, placeholder: &SectionPlaceHolder, section: &Section) {
        for name in &section.collisions {
            self.miss(ResolutionMiss::DuplicateName {
                placename: placeholder.placename.clone(),
                section_name: placeholder.section_name.clone(),
                name: name.clone(),
            });
        }
    }

    fn declare_dependencies(&mut self, section: &Section) {
        let mut modules = WidgetModules::default();
        modules.visit_section(section);
        for module in modules.0 {
            self.sink.declare_dependency(module);
            self.outcome
                .dependencies
                .entry(section.name.clone())
                .or_default()
                .insert(module.to_string());
        }
    }
}

/// Turn a fetched definition into an addressed copy under `alias`
fn prepare(
    mut section: Section,
    alias: &str,
    position_id: &str,
    host: &EmbeddedContext,
) -> Section {
    section.clear_addresses();
    section.part.placename = Some(alias.to_string());
    section.assign_address(position_id, &Location::root(), &mut Registries::new(), host);
    section
}

/// Include sections below a single root
pub fn resolve_sections<S: SectionSource + ?Sized>(
    root: &mut Part,
    root_id: &str,
    source: &S,
    overrides: &BTreeMap<String, bool>,
    sink: &mut dyn DependencySink,
) -> InclusionOutcome {
    let mut engine = InclusionEngine::new(source, overrides, sink);
    engine.include(root, root_id);
    engine.finish()
}

/// Included section copies below `root`, by alias
pub fn section_locations(root: &Part) -> BTreeMap<String, Location> {
    fn visit(node: &Node, location: Location, found: &mut BTreeMap<String, Location>) {
        match node {
            Node::Section(section) => {
                if let Some(alias) = section.alias() {
                    found.entry(alias.to_string()).or_insert(location);
                }
            }
            Node::Part(part) => {
                for (index, child) in part.children.iter().enumerate() {
                    visit(child, location.child(index), found);
                }
            }
            Node::Widget(widget) => {
                for (container, items) in widget.containers.iter().enumerate() {
                    for (index, item) in items.iter().enumerate() {
                        visit(item, location.container_item(container, index), found);
                    }
                }
            }
            _ => {}
        }
    }

    let mut found = BTreeMap::new();
    for (index, child) in root.children.iter().enumerate() {
        visit(child, Location::root().child(index), &mut found);
    }
    found
}
