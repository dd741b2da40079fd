//! # Node model
//!
//! The markup tree is a strict ownership tree: every container owns its
//! children, and nothing points back up. What a node sits inside is recorded
//! as plain names in its [`EmbeddedContext`], recomputed by every addressing
//! pass.
//!
//! Derived state (`position_id`, `embedded`, `placename`, a section's widget
//! registry and change token) is never part of the stored outline.

use crate::error::LocationError;
use crate::id_generator::IdGenerator;
use crate::location::{self, Location};
use crate::widget::Widget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute map, kept ordered so output is deterministic
pub type Attribs = BTreeMap<String, String>;

/// Which structure a node sits inside, independent of its raw tree position
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmbeddedContext {
    /// Alias of the included section copy; empty on the page itself
    pub section: String,
    /// Nearest enclosing widget; empty when not inside one
    pub widget: String,
    /// Container of `widget` holding the node
    pub container: Option<usize>,
}

impl EmbeddedContext {
    pub fn in_section(section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            widget: String::new(),
            container: None,
        }
    }

    /// Context for the contents of a widget container. The section component
    /// is carried over unchanged.
    pub fn in_container(&self, widget: impl Into<String>, container: usize) -> Self {
        Self {
            section: self.section.clone(),
            widget: widget.into(),
            container: Some(container),
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.section.is_empty() && self.widget.is_empty()
    }
}

/// A node of the markup tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Open tag with children
    Part(Part),
    /// Self-closing tag
    ClosedPart(ClosedPart),
    /// Included copy of a reusable subtree
    Section(Section),
    /// Marks where a section is spliced in
    SectionPlaceHolder(SectionPlaceHolder),
    /// Indirect text looked up by key
    TextBlock(TextBlock),
    /// Plain text
    Text(String),
    /// HTML entity such as `nbsp`
    Symbol(String),
    Comment(String),
    Widget(Widget),
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn symbol(text: impl Into<String>) -> Self {
        Node::Symbol(text.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Node::Comment(text.into())
    }

    /// Type tag used in the outline
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Part(_) => "Part",
            Node::ClosedPart(_) => "ClosedPart",
            Node::Section(_) => "Section",
            Node::SectionPlaceHolder(_) => "SectionPlaceHolder",
            Node::TextBlock(_) => "TextBlock",
            Node::Text(_) => "Text",
            Node::Symbol(_) => "HTMLSymbol",
            Node::Comment(_) => "Comment",
            Node::Widget(_) => "Widget",
        }
    }

    /// Registry key: a widget's name or a placeholder's placename
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Widget(widget) => Some(&widget.name),
            Node::SectionPlaceHolder(placeholder) => Some(&placeholder.placename),
            _ => None,
        }
    }

    pub fn position_id(&self) -> Option<&str> {
        match self {
            Node::Part(part) => Some(&part.position_id),
            Node::ClosedPart(part) => Some(&part.position_id),
            Node::Section(section) => Some(&section.part.position_id),
            Node::SectionPlaceHolder(placeholder) => Some(&placeholder.position_id),
            Node::TextBlock(block) => Some(&block.position_id),
            Node::Widget(widget) => Some(&widget.position_id),
            Node::Text(_) | Node::Symbol(_) | Node::Comment(_) => None,
        }
    }

    fn position_id_mut(&mut self) -> Option<&mut String> {
        match self {
            Node::Part(part) => Some(&mut part.position_id),
            Node::ClosedPart(part) => Some(&mut part.position_id),
            Node::Section(section) => Some(&mut section.part.position_id),
            Node::SectionPlaceHolder(placeholder) => Some(&mut placeholder.position_id),
            Node::TextBlock(block) => Some(&mut block.position_id),
            Node::Widget(widget) => Some(&mut widget.position_id),
            Node::Text(_) | Node::Symbol(_) | Node::Comment(_) => None,
        }
    }

    pub fn embedded(&self) -> Option<&EmbeddedContext> {
        match self {
            Node::Part(part) => Some(&part.embedded),
            Node::ClosedPart(part) => Some(&part.embedded),
            Node::Section(section) => Some(&section.part.embedded),
            Node::SectionPlaceHolder(placeholder) => Some(&placeholder.embedded),
            Node::TextBlock(block) => Some(&block.embedded),
            Node::Widget(widget) => Some(&widget.embedded),
            Node::Text(_) | Node::Symbol(_) | Node::Comment(_) => None,
        }
    }

    pub fn is_shown(&self) -> bool {
        match self {
            Node::Part(part) => part.show,
            Node::ClosedPart(part) => part.show,
            Node::Section(section) => section.part.show,
            Node::SectionPlaceHolder(placeholder) => placeholder.show,
            Node::TextBlock(block) => block.show,
            Node::Widget(widget) => widget.show,
            Node::Text(_) | Node::Symbol(_) | Node::Comment(_) => true,
        }
    }

    /// Ordinary children. Widgets keep theirs in containers instead.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Part(part) => Some(&part.children),
            Node::Section(section) => Some(&section.part.children),
            _ => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Part(part) => Some(&mut part.children),
            Node::Section(section) => Some(&mut section.part.children),
            _ => None,
        }
    }

    pub fn as_part(&self) -> Option<&Part> {
        match self {
            Node::Part(part) => Some(part),
            _ => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            Node::Section(section) => Some(section),
            _ => None,
        }
    }

    pub fn as_widget(&self) -> Option<&Widget> {
        match self {
            Node::Widget(widget) => Some(widget),
            _ => None,
        }
    }

    pub fn as_widget_mut(&mut self) -> Option<&mut Widget> {
        match self {
            Node::Widget(widget) => Some(widget),
            _ => None,
        }
    }

    pub fn as_placeholder(&self) -> Option<&SectionPlaceHolder> {
        match self {
            Node::SectionPlaceHolder(placeholder) => Some(placeholder),
            _ => None,
        }
    }

    pub fn is_widget(&self) -> bool {
        matches!(self, Node::Widget(_))
    }

    /// Give an unaddressed node an id on first use. Once set, the id is kept.
    pub fn ensure_position_id(&mut self, ids: &mut IdGenerator) -> Option<String> {
        let position_id = self.position_id_mut()?;
        if position_id.is_empty() {
            *position_id = ids.new_id();
        }
        Some(position_id.clone())
    }

    /// Recursively drop everything an addressing or inclusion pass derived
    pub fn clear_addresses(&mut self) {
        match self {
            Node::Part(part) => part.clear_addresses(),
            Node::ClosedPart(part) => {
                part.position_id.clear();
                part.embedded = EmbeddedContext::default();
            }
            Node::Section(section) => section.clear_addresses(),
            Node::SectionPlaceHolder(placeholder) => {
                placeholder.position_id.clear();
                placeholder.embedded = EmbeddedContext::default();
            }
            Node::TextBlock(block) => {
                block.position_id.clear();
                block.embedded = EmbeddedContext::default();
            }
            Node::Widget(widget) => widget.clear_addresses(),
            Node::Text(_) | Node::Symbol(_) | Node::Comment(_) => {}
        }
    }
}

impl From<Part> for Node {
    fn from(part: Part) -> Self {
        Node::Part(part)
    }
}

impl From<ClosedPart> for Node {
    fn from(part: ClosedPart) -> Self {
        Node::ClosedPart(part)
    }
}

impl From<Section> for Node {
    fn from(section: Section) -> Self {
        Node::Section(section)
    }
}

impl From<SectionPlaceHolder> for Node {
    fn from(placeholder: SectionPlaceHolder) -> Self {
        Node::SectionPlaceHolder(placeholder)
    }
}

impl From<TextBlock> for Node {
    fn from(block: TextBlock) -> Self {
        Node::TextBlock(block)
    }
}

impl From<Widget> for Node {
    fn from(widget: Widget) -> Self {
        Node::Widget(widget)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

/// Open tag with ordered children
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub tag_name: String,
    pub attribs: Attribs,
    pub children: Vec<Node>,
    pub show: bool,
    pub hide_if_empty: bool,
    pub brief: String,
    pub position_id: String,
    pub embedded: EmbeddedContext,
    /// Set only on the root of an included section
    pub placename: Option<String>,
}

impl Part {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attribs: Attribs::new(),
            children: Vec::new(),
            show: true,
            hide_if_empty: false,
            brief: String::new(),
            position_id: String::new(),
            embedded: EmbeddedContext::default(),
            placename: None,
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribs.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = brief.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    pub fn hide_if_empty(mut self) -> Self {
        self.hide_if_empty = true;
        self
    }

    pub fn set_attrib(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attribs.insert(key.into(), value.into());
    }

    pub fn get_attrib(&self, key: &str) -> Option<&str> {
        self.attribs.get(key).map(String::as_str)
    }

    pub fn del_attrib(&mut self, key: &str) -> Option<String> {
        self.attribs.remove(key)
    }

    pub fn push(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    /// Insert at `index`, appending when past the end
    pub fn insert_child(&mut self, index: usize, child: impl Into<Node>) {
        let index = index.min(self.children.len());
        self.children.insert(index, child.into());
    }

    pub fn remove_child(&mut self, index: usize) -> Option<Node> {
        if index < self.children.len() {
            Some(self.children.remove(index))
        } else {
            None
        }
    }

    pub fn get(&self, location: &Location) -> Option<&Node> {
        location::node_at(&self.children, location)
    }

    pub fn get_mut(&mut self, location: &Location) -> Option<&mut Node> {
        location::node_at_mut(&mut self.children, location)
    }

    pub fn insert(&mut self, location: &Location, node: impl Into<Node>) -> Result<(), LocationError> {
        location::insert_at(&mut self.children, location, node.into())
    }

    pub fn remove(&mut self, location: &Location) -> Result<Node, LocationError> {
        location::remove_at(&mut self.children, location)
    }

    /// Swap the node at `location` for another, returning the old one
    pub fn replace(&mut self, location: &Location, node: impl Into<Node>) -> Result<Node, LocationError> {
        location::splice_at(&mut self.children, location, vec![node.into()])
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn clear_addresses(&mut self) {
        self.position_id.clear();
        self.embedded = EmbeddedContext::default();
        self.placename = None;
        for child in &mut self.children {
            child.clear_addresses();
        }
    }
}

/// Self-closing tag
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedPart {
    pub tag_name: String,
    pub attribs: Attribs,
    pub show: bool,
    pub brief: String,
    pub position_id: String,
    pub embedded: EmbeddedContext,
}

impl ClosedPart {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attribs: Attribs::new(),
            show: true,
            brief: String::new(),
            position_id: String::new(),
            embedded: EmbeddedContext::default(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribs.insert(key.into(), value.into());
        self
    }

    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = brief.into();
        self
    }

    pub fn set_attrib(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attribs.insert(key.into(), value.into());
    }

    pub fn get_attrib(&self, key: &str) -> Option<&str> {
        self.attribs.get(key).map(String::as_str)
    }

    pub fn del_attrib(&mut self, key: &str) -> Option<String> {
        self.attribs.remove(key)
    }
}

/// Reusable named subtree
///
/// Equality compares the markup only: the widget registry and change token
/// are derived state.
#[derive(Debug, Clone)]
pub struct Section {
    pub part: Part,
    /// Definition name the section is stored under
    pub name: String,
    /// Widgets of this copy, keyed by name, located relative to `part`.
    /// Filled in when the section is addressed into a page.
    pub widgets: BTreeMap<String, Location>,
    /// Names claimed by more than one widget or placeholder of this copy, in
    /// walk order. Only the first holder of such a name is in `widgets`.
    pub collisions: Vec<String>,
    /// Regenerated whenever the definition is persisted
    pub change_token: String,
}

impl PartialEq for Section {
    fn eq(&self, other: &Self) -> bool {
        self.part == other.part
    }
}

impl Section {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self::from_part(Part::new(tag_name))
    }

    pub fn from_part(part: Part) -> Self {
        Self {
            part,
            name: String::new(),
            widgets: BTreeMap::new(),
            collisions: Vec::new(),
            change_token: String::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.part.children.push(child.into());
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.part.attribs.insert(key.into(), value.into());
        self
    }

    /// Alias this copy was included under, if it has been included
    pub fn alias(&self) -> Option<&str> {
        self.part.placename.as_deref()
    }

    pub fn position_id(&self) -> &str {
        &self.part.position_id
    }

    pub fn get(&self, location: &Location) -> Option<&Node> {
        self.part.get(location)
    }

    pub fn get_mut(&mut self, location: &Location) -> Option<&mut Node> {
        self.part.get_mut(location)
    }

    pub fn widget(&self, name: &str) -> Option<&Widget> {
        let location = self.widgets.get(name)?;
        self.part.get(location)?.as_widget()
    }

    pub fn widget_mut(&mut self, name: &str) -> Option<&mut Widget> {
        let location = self.widgets.get(name)?.clone();
        self.part.get_mut(&location)?.as_widget_mut()
    }

    pub fn clear_addresses(&mut self) {
        self.part.clear_addresses();
        self.widgets.clear();
        self.collisions.clear();
    }
}

/// Marks where a named section is spliced into the tree
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPlaceHolder {
    pub section_name: String,
    /// Alias other code uses to address this inclusion point
    pub placename: String,
    /// 0 includes once, unwrapped; n > 0 includes n wrapped copies
    pub multiplier: u32,
    /// Tag wrapping repeated copies
    pub mtag: String,
    pub show: bool,
    pub brief: String,
    pub position_id: String,
    pub embedded: EmbeddedContext,
}

impl SectionPlaceHolder {
    pub fn new(section_name: impl Into<String>, placename: impl Into<String>) -> Self {
        Self {
            section_name: section_name.into(),
            placename: placename.into(),
            multiplier: 0,
            mtag: "div".to_string(),
            show: true,
            brief: String::new(),
            position_id: String::new(),
            embedded: EmbeddedContext::default(),
        }
    }

    pub fn with_multiplier(mut self, multiplier: u32, mtag: impl Into<String>) -> Self {
        self.multiplier = multiplier;
        self.mtag = mtag.into();
        self
    }

    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = brief.into();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }

    /// Every alias this inclusion point answers to: the placename, plus
    /// `placename_k` for each repeated copy
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases = vec![self.placename.clone()];
        aliases.extend((0..self.multiplier).map(|k| self.copy_alias(k)));
        aliases
    }

    pub fn copy_alias(&self, k: u32) -> String {
        format!("{}_{}", self.placename, k)
    }
}

/// Text looked up by key at render time
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub textref: String,
    /// Owning project of the text; empty means the page's own project
    pub project: String,
    /// Shown when the lookup fails
    pub failmessage: String,
    pub escape: bool,
    pub linebreaks: bool,
    /// Values substituted into printf-style slots
    pub replace_strings: Vec<String>,
    pub show: bool,
    pub position_id: String,
    pub embedded: EmbeddedContext,
}

impl TextBlock {
    pub fn new(textref: impl Into<String>) -> Self {
        Self {
            textref: textref.into(),
            project: String::new(),
            failmessage: String::new(),
            escape: true,
            linebreaks: true,
            replace_strings: Vec::new(),
            show: true,
            position_id: String::new(),
            embedded: EmbeddedContext::default(),
        }
    }

    pub fn from_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    pub fn with_failmessage(mut self, failmessage: impl Into<String>) -> Self {
        self.failmessage = failmessage.into();
        self
    }

    pub fn with_replace_strings(mut self, strings: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.replace_strings = strings.into_iter().map(Into::into).collect();
        self
    }

    /// Project the text belongs to, resolving the empty default
    pub fn owning_project<'a>(&'a self, owner: &'a str) -> &'a str {
        if self.project.is_empty() {
            owner
        } else {
            &self.project
        }
    }
}
