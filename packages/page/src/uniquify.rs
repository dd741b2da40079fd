/// Name uniquifier
///
/// Renames widgets and placeholders of a subtree that is about to be merged
/// into a page so that none of them collides with a name the page already
/// uses, or with another node of the same subtree. A taken name `w` becomes
/// `w2`, `w3`, ... (first free suffix). Runs before addressing, since the
/// registries are keyed by name.
///
/// Section copies are not entered: their widgets live in the section's own
/// registry and cannot collide with page names.
use pagetree_common::{walk_widget_mut, VisitorMut};
use pagetree_markup::{Node, Section, SectionPlaceHolder, Widget};
use std::collections::BTreeSet;
use tracing::debug;

pub struct Uniquifier<'a> {
    existing: &'a mut BTreeSet<String>,
    renamed: Vec<(String, String)>,
}

impl<'a> Uniquifier<'a> {
    pub fn new(existing: &'a mut BTreeSet<String>) -> Self {
        Self {
            existing,
            renamed: Vec::new(),
        }
    }

    /// `(old, new)` pairs, in walk order
    pub fn renamed(&self) -> &[(String, String)] {
        &self.renamed
    }

    pub fn into_renamed(self) -> Vec<(String, String)> {
        self.renamed
    }

    fn claim(&mut self, name: &mut String) {
        if name.is_empty() {
            return;
        }
        if self.existing.insert(name.clone()) {
            return;
        }

        let free = (2..)
            .map(|suffix| format!("{}{}", name, suffix))
            .find(|candidate| !self.existing.contains(candidate))
            .unwrap_or_default();
        debug!(from = %name, to = %free, "Renamed to avoid collision");
        self.existing.insert(free.clone());
        self.renamed.push((std::mem::replace(name, free.clone()), free));
    }
}

impl VisitorMut for Uniquifier<'_> {
    fn visit_widget_mut(&mut self, widget: &mut Widget) {
        self.claim(&mut widget.name);
        walk_widget_mut(self, widget);
    }

    fn visit_placeholder_mut(&mut self, placeholder: &mut SectionPlaceHolder) {
        self.claim(&mut placeholder.placename);
    }

    fn visit_section_mut(&mut self, _section: &mut Section) {
        // Section widgets are scoped to the section
    }
}

/// Make every name in `node` unique against `existing`, adding the final
/// names to it. Returns the renames performed.
pub fn uniquify(node: &mut Node, existing: &mut BTreeSet<String>) -> Vec<(String, String)> {
    let mut uniquifier = Uniquifier::new(existing);
    uniquifier.visit_node_mut(node);
    uniquifier.into_renamed()
}
