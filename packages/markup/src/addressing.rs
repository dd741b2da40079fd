//! # Addressing
//!
//! Depth-first, pre-order walk giving every node below a root a position id
//! and collecting the named nodes it meets.
//!
//! - The root receives the caller's base id (e.g. `home_body`).
//! - Child `i` of a node addressed `p` becomes `p-i`.
//! - Item `j` of container `c` of a widget addressed `w` becomes `w-c-j`.
//!   Everything below that item carries the widget's name and `c` as its
//!   embedded context, until the next widget boundary.
//! - Placeholders are registered by placename and not descended into.
//! - An included [`Section`] keeps its widgets in its own registry and
//!   stamps its alias on everything inside it; the host registries never see
//!   them.
//!
//! The walk never fails. A registry key seen twice is recorded in
//! [`Registries::collisions`] for the caller to deal with.

use crate::location::Location;
use crate::node::{ClosedPart, EmbeddedContext, Node, Part, Section, SectionPlaceHolder, TextBlock};
use crate::widget::Widget;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Named nodes found by an addressing pass, located relative to its root
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registries {
    pub widgets: BTreeMap<String, Location>,
    pub placeholders: BTreeMap<String, Location>,
    /// Keys that were claimed more than once, in walk order
    pub collisions: Vec<String>,
}

impl Registries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Widgets and placeholders share one namespace
    pub fn contains(&self, name: &str) -> bool {
        self.widgets.contains_key(name) || self.placeholders.contains_key(name)
    }

    pub fn register_widget(&mut self, name: &str, location: &Location) {
        if name.is_empty() {
            return;
        }
        if self.contains(name) {
            self.collisions.push(name.to_string());
            return;
        }
        self.widgets.insert(name.to_string(), location.clone());
    }

    pub fn register_placeholder(&mut self, name: &str, location: &Location) {
        if name.is_empty() {
            return;
        }
        if self.contains(name) {
            self.collisions.push(name.to_string());
            return;
        }
        self.placeholders.insert(name.to_string(), location.clone());
    }

    pub fn names(&self) -> BTreeSet<String> {
        self.widgets
            .keys()
            .chain(self.placeholders.keys())
            .cloned()
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.collisions.is_empty()
    }
}

/// A node that can receive a position id
pub trait Addressable {
    fn assign_address(
        &mut self,
        position_id: &str,
        location: &Location,
        registries: &mut Registries,
        embedded: &EmbeddedContext,
    );
}

/// Address a whole tree, returning what it registered
pub fn assign_address(root: &mut Part, base_id: &str) -> Registries {
    let mut registries = Registries::new();
    root.assign_address(
        base_id,
        &Location::root(),
        &mut registries,
        &EmbeddedContext::default(),
    );
    debug!(
        base_id,
        widgets = registries.widgets.len(),
        placeholders = registries.placeholders.len(),
        collisions = registries.collisions.len(),
        "Addressed tree"
    );
    registries
}

fn address_children(
    children: &mut [Node],
    parent_id: &str,
    parent_location: &Location,
    registries: &mut Registries,
    embedded: &EmbeddedContext,
) {
    for (index, child) in children.iter_mut().enumerate() {
        let child_id = format!("{}-{}", parent_id, index);
        child.assign_address(
            &child_id,
            &parent_location.child(index),
            registries,
            embedded,
        );
    }
}

impl Addressable for Node {
    fn assign_address(
        &mut self,
        position_id: &str,
        location: &Location,
        registries: &mut Registries,
        embedded: &EmbeddedContext,
    ) {
        match self {
            Node::Part(part) => part.assign_address(position_id, location, registries, embedded),
            Node::ClosedPart(part) => {
                part.assign_address(position_id, location, registries, embedded)
            }
            Node::Section(section) => {
                section.assign_address(position_id, location, registries, embedded)
            }
            Node::SectionPlaceHolder(placeholder) => {
                placeholder.assign_address(position_id, location, registries, embedded)
            }
            Node::TextBlock(block) => {
                block.assign_address(position_id, location, registries, embedded)
            }
            Node::Widget(widget) => {
                widget.assign_address(position_id, location, registries, embedded)
            }
            Node::Text(_) | Node::Symbol(_) | Node::Comment(_) => {}
        }
    }
}

impl Addressable for Part {
    fn assign_address(
        &mut self,
        position_id: &str,
        location: &Location,
        registries: &mut Registries,
        embedded: &EmbeddedContext,
    ) {
        self.position_id = position_id.to_string();
        self.embedded = embedded.clone();
        address_children(&mut self.children, position_id, location, registries, embedded);
    }
}

impl Addressable for ClosedPart {
    fn assign_address(
        &mut self,
        position_id: &str,
        _location: &Location,
        _registries: &mut Registries,
        embedded: &EmbeddedContext,
    ) {
        self.position_id = position_id.to_string();
        self.embedded = embedded.clone();
    }
}

impl Addressable for TextBlock {
    fn assign_address(
        &mut self,
        position_id: &str,
        _location: &Location,
        _registries: &mut Registries,
        embedded: &EmbeddedContext,
    ) {
        self.position_id = position_id.to_string();
        self.embedded = embedded.clone();
    }
}

impl Addressable for SectionPlaceHolder {
    fn assign_address(
        &mut self,
        position_id: &str,
        location: &Location,
        registries: &mut Registries,
        embedded: &EmbeddedContext,
    ) {
        self.position_id = position_id.to_string();
        self.embedded = embedded.clone();
        registries.register_placeholder(&self.placename, location);
    }
}

impl Addressable for Widget {
    fn assign_address(
        &mut self,
        position_id: &str,
        location: &Location,
        registries: &mut Registries,
        embedded: &EmbeddedContext,
    ) {
        self.position_id = position_id.to_string();
        self.embedded = embedded.clone();
        registries.register_widget(&self.name, location);

        for (container, items) in self.containers.iter_mut().enumerate() {
            let inner = embedded.in_container(self.name.clone(), container);
            for (index, item) in items.iter_mut().enumerate() {
                let item_id = format!("{}-{}-{}", position_id, container, index);
                item.assign_address(
                    &item_id,
                    &location.container_item(container, index),
                    registries,
                    &inner,
                );
            }
        }
    }
}

impl Addressable for Section {
    /// The section root takes the host's id and context. Its contents are
    /// addressed into the section's own registry, relative to the section
    /// root, under the section's alias.
    ///
    /// An included copy keeps the id it was given at inclusion time.
    fn assign_address(
        &mut self,
        position_id: &str,
        _location: &Location,
        _registries: &mut Registries,
        embedded: &EmbeddedContext,
    ) {
        if self.alias().is_none() || self.part.position_id.is_empty() {
            self.part.position_id = position_id.to_string();
        }
        self.part.embedded = embedded.clone();
        let position_id = self.part.position_id.clone();

        let scope = self.alias().unwrap_or(&self.name).to_string();
        let inner = EmbeddedContext::in_section(scope.clone());
        let mut own = Registries::new();
        address_children(
            &mut self.part.children,
            &position_id,
            &Location::root(),
            &mut own,
            &inner,
        );

        if !own.is_clean() {
            warn!(section = %scope, collisions = ?own.collisions, "Duplicate names inside section");
        }
        self.widgets = own.widgets;
        self.collisions = own.collisions;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{SimpleContainer, TagText, TwoColumns};
    use std::sync::Arc;

    fn container(name: &str) -> Widget {
        Widget::new(Arc::new(SimpleContainer), name)
    }

    #[test]
    fn test_children_get_hierarchical_ids() {
        let mut body = Part::new("body")
            .with_child(Part::new("div").with_child(Part::new("span")))
            .with_child(ClosedPart::new("hr"));

        assign_address(&mut body, "home_body");

        assert_eq!(body.position_id, "home_body");
        let div = body.children[0].as_part().unwrap();
        assert_eq!(div.position_id, "home_body-0");
        assert_eq!(div.children[0].position_id(), Some("home_body-0-0"));
        assert_eq!(body.children[1].position_id(), Some("home_body-1"));
    }

    #[test]
    fn test_widget_containers_are_a_third_dimension() {
        let columns = Widget::new(Arc::new(TwoColumns), "cols")
            .with_child_in(0, Part::new("p"))
            .with_child_in(1, Part::new("p"))
            .with_child_in(1, Part::new("p").with_child(Part::new("em")));
        let mut body = Part::new("body").with_child(Part::new("div").with_child(columns));

        let registries = assign_address(&mut body, "b");

        assert_eq!(registries.widgets.get("cols"), Some(&Location(vec![0, 0])));

        let second = body.get(&Location(vec![0, 0, 1, 1])).unwrap();
        assert_eq!(second.position_id(), Some("b-0-0-1-1"));
        let embedded = second.embedded().unwrap();
        assert_eq!(embedded.widget, "cols");
        assert_eq!(embedded.container, Some(1));

        // context is set at the boundary and inherited below it
        let em = body.get(&Location(vec![0, 0, 1, 1, 0])).unwrap();
        assert_eq!(em.position_id(), Some("b-0-0-1-1-0"));
        assert_eq!(em.embedded().unwrap().container, Some(1));

        // the widget itself sits outside its own containers
        let widget = body.get(&Location(vec![0, 0])).unwrap();
        assert!(widget.embedded().unwrap().widget.is_empty());
    }

    #[test]
    fn test_nested_widget_takes_over_context() {
        let inner = container("inner").with_child_in(0, Part::new("b"));
        let outer = container("outer").with_child_in(0, inner);
        let mut body = Part::new("body").with_child(outer);

        let registries = assign_address(&mut body, "b");
        assert_eq!(registries.widgets.len(), 2);

        let inner_widget = body.get(&Location(vec![0, 0, 0])).unwrap();
        assert_eq!(inner_widget.embedded().unwrap().widget, "outer");

        let bold = body.get(&Location(vec![0, 0, 0, 0, 0])).unwrap();
        assert_eq!(bold.position_id(), Some("b-0-0-0-0-0"));
        assert_eq!(bold.embedded().unwrap().widget, "inner");
        assert_eq!(bold.embedded().unwrap().container, Some(0));
    }

    #[test]
    fn test_placeholders_are_registered_not_descended() {
        let mut body = Part::new("body")
            .with_child(Part::new("header"))
            .with_child(SectionPlaceHolder::new("footer", "f"));

        let registries = assign_address(&mut body, "b");
        assert_eq!(registries.placeholders.get("f"), Some(&Location(vec![1])));
        assert_eq!(body.children[1].position_id(), Some("b-1"));
    }

    #[test]
    fn test_collisions_are_recorded_not_raised() {
        let mut body = Part::new("body")
            .with_child(Widget::new(Arc::new(TagText), "w"))
            .with_child(Widget::new(Arc::new(TagText), "w"))
            .with_child(SectionPlaceHolder::new("footer", "w"));

        let registries = assign_address(&mut body, "b");
        assert_eq!(registries.widgets.get("w"), Some(&Location(vec![0])));
        assert_eq!(registries.collisions, vec!["w", "w"]);
        assert!(!registries.is_clean());
        // every node is still addressed
        assert_eq!(body.children[2].position_id(), Some("b-2"));
    }

    #[test]
    fn test_section_widgets_stay_in_section_registry() {
        let mut section = Section::new("div")
            .named("footer")
            .with_child(Widget::new(Arc::new(TagText), "w"));
        section.part.placename = Some("f".to_string());

        let mut body = Part::new("body")
            .with_child(Widget::new(Arc::new(TagText), "w"))
            .with_child(section);

        let registries = assign_address(&mut body, "b");
        assert!(registries.is_clean());
        assert_eq!(registries.widgets.len(), 1);

        let section = body.children[1].as_section().unwrap();
        assert_eq!(section.widgets.get("w"), Some(&Location(vec![0])));
        let widget = section.widget("w").unwrap();
        assert_eq!(widget.position_id, "b-1-0");
        assert_eq!(widget.embedded.section, "f");
    }

    #[test]
    fn test_included_section_keeps_its_id() {
        let mut section = Section::new("p").with_child(Part::new("span"));
        section.part.placename = Some("f".to_string());
        section.part.position_id = "b_f".to_string();
        let mut body = Part::new("body").with_child(Part::new("hr")).with_child(section);

        assign_address(&mut body, "b");
        let section = body.children[1].as_section().unwrap();
        assert_eq!(section.position_id(), "b_f");
        assert_eq!(section.part.children[0].position_id(), Some("b_f-0"));
    }

    #[test]
    fn test_duplicate_names_inside_section_are_kept_on_section() {
        let section = Section::new("div")
            .with_child(Widget::new(Arc::new(TagText), "w"))
            .with_child(Widget::new(Arc::new(TagText), "w"));
        let mut body = Part::new("body").with_child(section);

        let registries = assign_address(&mut body, "b");
        assert!(registries.is_clean());

        let section = body.children[0].as_section().unwrap();
        assert_eq!(section.collisions, vec!["w"]);
        assert_eq!(section.widgets.get("w"), Some(&Location(vec![0])));

        let mut section = section.clone();
        section.clear_addresses();
        assert!(section.collisions.is_empty());
    }

    #[test]
    fn test_re_addressing_is_idempotent() {
        let mut body = Part::new("body")
            .with_child(container("c").with_child_in(0, Part::new("p")))
            .with_child(SectionPlaceHolder::new("s", "p1"));

        let first_registries = assign_address(&mut body, "b");
        let first = body.clone();
        let second_registries = assign_address(&mut body, "b");

        assert_eq!(first, body);
        assert_eq!(first_registries, second_registries);
    }
}
