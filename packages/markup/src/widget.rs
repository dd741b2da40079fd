//! # Widgets
//!
//! A widget is a node that additionally has a stable name, named fields and
//! zero or more containers of child nodes. What a particular kind of widget
//! *is* lives behind [`WidgetKind`]; the tree only needs its type tag, its
//! field set and how many containers it has.
//!
//! Kinds are looked up by their `(module, class)` pair in a
//! [`WidgetRegistry`], filled once at start-up from a known, closed set.

use crate::ident::Ident;
use crate::node::{EmbeddedContext, Node};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Value of a widget field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    /// Reference to a page or folder
    Ref(Ident),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_ref_ident(&self) -> Option<&Ident> {
        match self {
            FieldValue::Ref(ident) => Some(ident),
            _ => None,
        }
    }

    pub fn outline(&self, owner: &str) -> Value {
        match self {
            FieldValue::Text(text) => Value::from(text.clone()),
            FieldValue::Flag(flag) => Value::from(*flag),
            FieldValue::Ref(ident) => ident.outline(owner),
            FieldValue::List(items) => Value::from(items.clone()),
        }
    }

    /// Numbers and `[project, number]` pairs come back as references
    pub fn from_outline(value: &Value, owner: &str) -> Option<FieldValue> {
        if let Some(ident) = Ident::from_outline(value, owner) {
            return Some(FieldValue::Ref(ident));
        }
        match value {
            Value::String(text) => Some(FieldValue::Text(text.clone())),
            Value::Bool(flag) => Some(FieldValue::Flag(*flag)),
            Value::Null => Some(FieldValue::Text(String::new())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(FieldValue::List),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(flag: bool) -> Self {
        FieldValue::Flag(flag)
    }
}

impl From<Ident> for FieldValue {
    fn from(ident: Ident) -> Self {
        FieldValue::Ref(ident)
    }
}

/// A named field a widget kind declares, with its default
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub default: FieldValue,
}

impl FieldSpec {
    pub fn new(name: &'static str, default: impl Into<FieldValue>) -> Self {
        Self {
            name,
            default: default.into(),
        }
    }
}

/// The capability behind a widget node
pub trait WidgetKind: Send + Sync {
    /// First half of the type tag; also the client-side behaviour module
    fn module(&self) -> &'static str;

    /// Second half of the type tag
    fn class(&self) -> &'static str;

    fn tag_name(&self) -> &'static str {
        "div"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        Vec::new()
    }

    fn container_count(&self) -> usize {
        0
    }
}

/// Widget node
#[derive(Clone)]
pub struct Widget {
    kind: Arc<dyn WidgetKind>,
    pub name: String,
    pub brief: String,
    pub show: bool,
    pub fields: BTreeMap<String, FieldValue>,
    pub containers: Vec<Vec<Node>>,
    pub position_id: String,
    pub embedded: EmbeddedContext,
}

impl Widget {
    /// New widget with the kind's default fields and empty containers
    pub fn new(kind: Arc<dyn WidgetKind>, name: impl Into<String>) -> Self {
        let fields = kind
            .fields()
            .into_iter()
            .map(|spec| (spec.name.to_string(), spec.default))
            .collect();
        let containers = vec![Vec::new(); kind.container_count()];
        Self {
            kind,
            name: name.into(),
            brief: String::new(),
            show: true,
            fields,
            containers,
            position_id: String::new(),
            embedded: EmbeddedContext::default(),
        }
    }

    pub fn kind(&self) -> &dyn WidgetKind {
        self.kind.as_ref()
    }

    pub fn widget_type(&self) -> (&'static str, &'static str) {
        (self.kind.module(), self.kind.class())
    }

    pub fn with_brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = brief.into();
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn with_child_in(mut self, container: usize, child: impl Into<Node>) -> Self {
        if let Some(items) = self.containers.get_mut(container) {
            items.push(child.into());
        }
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Set a declared field. Returns false if the kind has no such field.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> bool {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn container(&self, index: usize) -> Option<&[Node]> {
        self.containers.get(index).map(Vec::as_slice)
    }

    pub fn container_mut(&mut self, index: usize) -> Option<&mut Vec<Node>> {
        self.containers.get_mut(index)
    }

    pub fn clear_addresses(&mut self) {
        self.position_id.clear();
        self.embedded = EmbeddedContext::default();
        for item in self.containers.iter_mut().flatten() {
            item.clear_addresses();
        }
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        self.widget_type() == other.widget_type()
            && self.name == other.name
            && self.brief == other.brief
            && self.show == other.show
            && self.fields == other.fields
            && self.containers == other.containers
            && self.position_id == other.position_id
            && self.embedded == other.embedded
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (module, class) = self.widget_type();
        f.debug_struct("Widget")
            .field("widget_type", &format_args!("{}.{}", module, class))
            .field("name", &self.name)
            .field("brief", &self.brief)
            .field("show", &self.show)
            .field("fields", &self.fields)
            .field("containers", &self.containers)
            .field("position_id", &self.position_id)
            .field("embedded", &self.embedded)
            .finish()
    }
}

/// Known widget kinds, keyed by `(module, class)`
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    kinds: BTreeMap<(String, String), Arc<dyn WidgetKind>>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in kinds
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::builtin::register_builtins(&mut registry);
        registry
    }

    pub fn register<K: WidgetKind + 'static>(&mut self, kind: K) {
        self.register_arc(Arc::new(kind));
    }

    pub fn register_arc(&mut self, kind: Arc<dyn WidgetKind>) {
        let key = (kind.module().to_string(), kind.class().to_string());
        self.kinds.insert(key, kind);
    }

    pub fn get(&self, module: &str, class: &str) -> Option<Arc<dyn WidgetKind>> {
        self.kinds
            .get(&(module.to_string(), class.to_string()))
            .cloned()
    }

    pub fn contains(&self, module: &str, class: &str) -> bool {
        self.kinds.contains_key(&(module.to_string(), class.to_string()))
    }

    /// Create a fresh widget of a registered kind
    pub fn create(&self, module: &str, class: &str, name: impl Into<String>) -> Option<Widget> {
        self.get(module, class).map(|kind| Widget::new(kind, name))
    }

    pub fn type_tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.kinds
            .keys()
            .map(|(module, class)| (module.as_str(), class.as_str()))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.type_tags().map(|(module, class)| format!("{}.{}", module, class)))
            .finish()
    }
}
