/// Collaborator lookups used by pages
///
/// Section definitions and cross-references belong to the project layer.
/// Pages receive them through these traits instead of reaching for any
/// global registry, so inclusion can be driven from a plain map in tests.
use pagetree_markup::{Ident, Section};
use std::collections::BTreeMap;

/// Looks up section definitions by name
pub trait SectionSource {
    /// Owned copy of the named definition. Every call returns a fresh copy,
    /// so repeated inclusions never share nodes.
    fn section(&self, name: &str) -> Option<Section>;
}

/// Turns a page number or label into a reference
pub trait ReferenceResolver {
    fn resolve_reference(&self, id_or_label: &str, owner: &str) -> Option<Ident>;
}

fn named_copy(name: &str, section: &Section) -> Section {
    let mut copy = section.clone();
    if copy.name.is_empty() {
        copy.name = name.to_string();
    }
    copy
}

impl SectionSource for BTreeMap<String, Section> {
    fn section(&self, name: &str) -> Option<Section> {
        self.get(name).map(|section| named_copy(name, section))
    }
}

impl<F> SectionSource for F
where
    F: Fn(&str) -> Option<Section>,
{
    fn section(&self, name: &str) -> Option<Section> {
        self(name).map(|section| named_copy(name, &section))
    }
}

/// A label table; anything not in it is parsed as a textual reference
impl ReferenceResolver for BTreeMap<String, Ident> {
    fn resolve_reference(&self, id_or_label: &str, owner: &str) -> Option<Ident> {
        self.get(id_or_label)
            .cloned()
            .or_else(|| Ident::parse(id_or_label, owner))
    }
}
