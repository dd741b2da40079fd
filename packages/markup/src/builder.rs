//! # Tree builder
//!
//! Inverse of the outline serializer: reconstructs live nodes from their
//! stored `[type_tag, payload]` form, relative to the owning project.
//!
//! Widget payloads are resolved through a [`WidgetRegistry`] by their
//! `(module, class)` type tag. An unknown tag is a [`BuildError`]: a page
//! whose widgets cannot be reconstructed is not loaded at all.
//!
//! Freshly built nodes carry no addresses. Run the name uniquifier (when
//! merging into an existing page) and then addressing before use.

use crate::error::{BuildError, BuildResult};
use crate::node::{Attribs, ClosedPart, Node, Part, Section, SectionPlaceHolder, TextBlock};
use crate::widget::{FieldValue, Widget, WidgetRegistry};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Build a node from its outline
pub fn build(value: &Value, owner: &str, widgets: &WidgetRegistry) -> BuildResult<Node> {
    TreeBuilder::new(owner, widgets).build(value)
}

/// Negative, fractional or non-numeric multipliers become 0
pub fn coerce_multiplier(value: Option<&Value>) -> u32 {
    let number = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    number
        .filter(|n| *n > 0)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or(0)
}

pub struct TreeBuilder<'a> {
    owner: &'a str,
    widgets: &'a WidgetRegistry,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(owner: &'a str, widgets: &'a WidgetRegistry) -> Self {
        Self { owner, widgets }
    }

    pub fn build(&self, value: &Value) -> BuildResult<Node> {
        let (tag, payload) = split_tagged(value)?;
        match tag {
            "Part" => self.build_part_payload("Part", payload).map(Node::Part),
            "ClosedPart" => build_closed_part(payload).map(Node::ClosedPart),
            "Section" => self
                .build_part_payload("Section", payload)
                .map(|part| Node::Section(Section::from_part(part))),
            "SectionPlaceHolder" => build_placeholder(payload).map(Node::SectionPlaceHolder),
            "TextBlock" => self.build_text_block(payload).map(Node::TextBlock),
            "Widget" => self.build_widget(payload).map(Node::Widget),
            "Text" => payload
                .as_str()
                .map(Node::text)
                .ok_or_else(|| BuildError::invalid_field("Text", "value", "string")),
            "HTMLSymbol" => text_payload("HTMLSymbol", payload).map(Node::Symbol),
            "Comment" => text_payload("Comment", payload).map(Node::Comment),
            other => Err(BuildError::UnknownNodeType(other.to_string())),
        }
    }

    /// Build a value that must be an open tag, such as a page's head or body
    pub fn build_part(&self, value: &Value) -> BuildResult<Part> {
        match self.build(value)? {
            Node::Part(part) => Ok(part),
            other => Err(BuildError::malformed(format!(
                "expected Part, found {}",
                other.kind_name()
            ))),
        }
    }

    /// Build a stored section definition
    pub fn build_section(&self, value: &Value) -> BuildResult<Section> {
        match self.build(value)? {
            Node::Section(section) => Ok(section),
            Node::Part(part) => Ok(Section::from_part(part)),
            other => Err(BuildError::malformed(format!(
                "expected Section, found {}",
                other.kind_name()
            ))),
        }
    }

    fn build_children(&self, items: &[Value]) -> BuildResult<Vec<Node>> {
        items.iter().map(|item| self.build(item)).collect()
    }

    fn build_part_payload(&self, node: &str, payload: &Value) -> BuildResult<Part> {
        let map = object(node, payload)?;
        let mut part = Part::new(required_str(map, node, "tag_name")?);
        part.brief = optional_str(map, node, "brief")?;
        part.show = optional_bool(map, node, "show", true)?;
        part.hide_if_empty = optional_bool(map, node, "hide_if_empty", false)?;
        part.attribs = attribs(map, node)?;
        part.children = match map.get("parts") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => self.build_children(items)?,
            Some(_) => return Err(BuildError::invalid_field(node, "parts", "list")),
        };
        Ok(part)
    }

    fn build_text_block(&self, payload: &Value) -> BuildResult<TextBlock> {
        let node = "TextBlock";
        let map = object(node, payload)?;
        let mut block = TextBlock::new(required_str(map, node, "textref")?);
        let project = optional_str(map, node, "project")?;
        if project != self.owner {
            block.project = project;
        }
        block.failmessage = optional_str(map, node, "failmessage")?;
        block.show = optional_bool(map, node, "show", true)?;
        block.escape = optional_bool(map, node, "escape", true)?;
        block.linebreaks = optional_bool(map, node, "linebreaks", true)?;
        block.replace_strings = match map.get("replace_strings") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| BuildError::invalid_field(node, "replace_strings", "list of strings"))?,
            Some(_) => {
                return Err(BuildError::invalid_field(node, "replace_strings", "list of strings"))
            }
        };
        Ok(block)
    }

    fn build_widget(&self, payload: &Value) -> BuildResult<Widget> {
        let node = "Widget";
        let map = object(node, payload)?;
        let name = required_str(map, node, "name")?;

        let (module, class) = match map.get("widget_type") {
            Some(Value::Array(tag)) if tag.len() == 2 => match (tag[0].as_str(), tag[1].as_str()) {
                (Some(module), Some(class)) => (module, class),
                _ => return Err(BuildError::invalid_field(node, "widget_type", "[module, class]")),
            },
            Some(_) => return Err(BuildError::invalid_field(node, "widget_type", "[module, class]")),
            None => return Err(BuildError::missing_field(node, "widget_type")),
        };
        let mut widget = self
            .widgets
            .create(module, class, name.clone())
            .ok_or_else(|| BuildError::unknown_widget(module, class))?;

        widget.brief = optional_str(map, node, "brief")?;
        widget.show = optional_bool(map, node, "show", true)?;

        if let Some(fields) = map.get("fields") {
            let fields = fields
                .as_object()
                .ok_or_else(|| BuildError::invalid_field(node, "fields", "object"))?;
            for (field, value) in fields {
                let value = FieldValue::from_outline(value, self.owner).ok_or_else(|| {
                    BuildError::invalid_field(
                        node,
                        field.clone(),
                        "string, bool, reference or list of strings",
                    )
                })?;
                if !widget.set_field(field, value) {
                    return Err(BuildError::UnknownWidgetField {
                        widget: name.clone(),
                        field: field.clone(),
                    });
                }
            }
        }

        let expected = widget.containers.len();
        match map.get("containers") {
            None | Some(Value::Null) if expected == 0 => {}
            None | Some(Value::Null) => {
                return Err(BuildError::ContainerCount {
                    widget: name,
                    expected,
                    found: 0,
                })
            }
            Some(Value::Array(containers)) => {
                if containers.len() != expected {
                    return Err(BuildError::ContainerCount {
                        widget: name,
                        expected,
                        found: containers.len(),
                    });
                }
                for (slot, items) in widget.containers.iter_mut().zip(containers) {
                    let items = items
                        .as_array()
                        .ok_or_else(|| BuildError::invalid_field(node, "containers", "list of lists"))?;
                    *slot = self.build_children(items)?;
                }
            }
            Some(_) => return Err(BuildError::invalid_field(node, "containers", "list of lists")),
        }

        Ok(widget)
    }
}

fn split_tagged(value: &Value) -> BuildResult<(&str, &Value)> {
    match value {
        Value::Array(pair) if pair.len() == 2 => {
            let tag = pair[0]
                .as_str()
                .ok_or_else(|| BuildError::malformed("type tag must be a string"))?;
            Ok((tag, &pair[1]))
        }
        other => Err(BuildError::malformed(format!(
            "expected [type, payload], found {}",
            other
        ))),
    }
}

fn object<'v>(node: &str, payload: &'v Value) -> BuildResult<&'v Map<String, Value>> {
    payload
        .as_object()
        .ok_or_else(|| BuildError::malformed(format!("{} payload must be an object", node)))
}

fn required_str(map: &Map<String, Value>, node: &str, field: &str) -> BuildResult<String> {
    match map.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(BuildError::invalid_field(node, field, "string")),
        None => Err(BuildError::missing_field(node, field)),
    }
}

fn optional_str(map: &Map<String, Value>, node: &str, field: &str) -> BuildResult<String> {
    match map.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        None | Some(Value::Null) => Ok(String::new()),
        Some(_) => Err(BuildError::invalid_field(node, field, "string")),
    }
}

fn optional_bool(
    map: &Map<String, Value>,
    node: &str,
    field: &str,
    default: bool,
) -> BuildResult<bool> {
    match map.get(field) {
        Some(Value::Bool(b)) => Ok(*b),
        None | Some(Value::Null) => Ok(default),
        Some(_) => Err(BuildError::invalid_field(node, field, "bool")),
    }
}

/// Attribute values are strings; numbers and booleans are stringified
fn attribs(map: &Map<String, Value>, node: &str) -> BuildResult<Attribs> {
    let Some(value) = map.get("attribs") else {
        return Ok(Attribs::new());
    };
    let Some(entries) = value.as_object() else {
        if value.is_null() {
            return Ok(Attribs::new());
        }
        return Err(BuildError::invalid_field(node, "attribs", "object"));
    };
    entries
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Err(BuildError::invalid_field(node, format!("attribs.{}", key), "string")),
            };
            Ok((key.clone(), value))
        })
        .collect::<BuildResult<BTreeMap<_, _>>>()
}

fn build_closed_part(payload: &Value) -> BuildResult<ClosedPart> {
    let node = "ClosedPart";
    let map = object(node, payload)?;
    let mut part = ClosedPart::new(required_str(map, node, "tag_name")?);
    part.brief = optional_str(map, node, "brief")?;
    part.show = optional_bool(map, node, "show", true)?;
    part.attribs = attribs(map, node)?;
    Ok(part)
}

fn build_placeholder(payload: &Value) -> BuildResult<SectionPlaceHolder> {
    let node = "SectionPlaceHolder";
    let map = object(node, payload)?;
    let placename = required_str(map, node, "placename")?;
    if placename.is_empty() {
        return Err(BuildError::invalid_field(node, "placename", "non-empty string"));
    }
    let mut placeholder =
        SectionPlaceHolder::new(required_str(map, node, "section_name")?, placename);
    placeholder.brief = optional_str(map, node, "brief")?;
    placeholder.multiplier = coerce_multiplier(map.get("multiplier"));
    let mtag = optional_str(map, node, "mtag")?;
    if !mtag.is_empty() {
        placeholder.mtag = mtag;
    }
    placeholder.show = optional_bool(map, node, "show", true)?;
    Ok(placeholder)
}

fn text_payload(node: &str, payload: &Value) -> BuildResult<String> {
    let map = object(node, payload)?;
    required_str(map, node, "text")
}
