/// Outline serializer
///
/// Turns live nodes into the JSON-safe nested form that is stored and handed
/// to editors. Every node becomes a `[type_tag, payload]` pair. Optional
/// fields are left out exactly when they hold their default, since the tree
/// builder reads an absent field as "use the default".
///
/// Position ids and every other piece of derived state are never written:
/// addresses are recomputed on load.
use crate::node::{Attribs, ClosedPart, Node, Part, Section, SectionPlaceHolder, TextBlock};
use crate::widget::Widget;
use serde_json::{Map, Value};

pub trait Outline {
    /// Outline relative to the project that owns the tree
    fn outline(&self, owner: &str) -> Value;
}

/// Outline any node
pub fn outline(node: &Node, owner: &str) -> Value {
    node.outline(owner)
}

fn tagged(tag: &str, payload: impl Into<Value>) -> Value {
    Value::Array(vec![Value::from(tag), payload.into()])
}

/// `serde_json`'s map is ordered by key, so attributes come out sorted
fn outline_attribs(attribs: &Attribs) -> Value {
    Value::Object(
        attribs
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value.clone())))
            .collect(),
    )
}

fn outline_parts(children: &[Node], owner: &str) -> Value {
    Value::Array(children.iter().map(|child| child.outline(owner)).collect())
}

fn insert_brief(map: &mut Map<String, Value>, brief: &str) {
    if !brief.is_empty() {
        map.insert("brief".into(), Value::from(brief));
    }
}

fn part_payload(part: &Part, owner: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("tag_name".into(), Value::from(part.tag_name.clone()));
    insert_brief(&mut map, &part.brief);
    map.insert("show".into(), Value::from(part.show));
    map.insert("hide_if_empty".into(), Value::from(part.hide_if_empty));
    if !part.attribs.is_empty() {
        map.insert("attribs".into(), outline_attribs(&part.attribs));
    }
    map.insert("parts".into(), outline_parts(&part.children, owner));
    map
}

impl Outline for Node {
    fn outline(&self, owner: &str) -> Value {
        match self {
            Node::Part(part) => part.outline(owner),
            Node::ClosedPart(part) => part.outline(owner),
            Node::Section(section) => section.outline(owner),
            Node::SectionPlaceHolder(placeholder) => placeholder.outline(owner),
            Node::TextBlock(block) => block.outline(owner),
            Node::Widget(widget) => widget.outline(owner),
            Node::Text(text) => tagged("Text", text.clone()),
            Node::Symbol(text) | Node::Comment(text) => {
                let mut map = Map::new();
                map.insert("text".into(), Value::from(text.clone()));
                tagged(self.kind_name(), map)
            }
        }
    }
}

impl Outline for Part {
    fn outline(&self, owner: &str) -> Value {
        tagged("Part", part_payload(self, owner))
    }
}

impl Outline for Section {
    fn outline(&self, owner: &str) -> Value {
        tagged("Section", part_payload(&self.part, owner))
    }
}

impl Outline for ClosedPart {
    fn outline(&self, _owner: &str) -> Value {
        let mut map = Map::new();
        map.insert("tag_name".into(), Value::from(self.tag_name.clone()));
        insert_brief(&mut map, &self.brief);
        map.insert("show".into(), Value::from(self.show));
        if !self.attribs.is_empty() {
            map.insert("attribs".into(), outline_attribs(&self.attribs));
        }
        tagged("ClosedPart", map)
    }
}

impl Outline for SectionPlaceHolder {
    fn outline(&self, _owner: &str) -> Value {
        let mut map = Map::new();
        insert_brief(&mut map, &self.brief);
        map.insert("section_name".into(), Value::from(self.section_name.clone()));
        map.insert("placename".into(), Value::from(self.placename.clone()));
        map.insert("multiplier".into(), Value::from(self.multiplier));
        map.insert("mtag".into(), Value::from(self.mtag.clone()));
        map.insert("show".into(), Value::from(self.show));
        tagged("SectionPlaceHolder", map)
    }
}

impl Outline for TextBlock {
    fn outline(&self, owner: &str) -> Value {
        let mut map = Map::new();
        map.insert("textref".into(), Value::from(self.textref.clone()));
        if !self.project.is_empty() && self.project != owner {
            map.insert("project".into(), Value::from(self.project.clone()));
        }
        if !self.failmessage.is_empty() {
            map.insert("failmessage".into(), Value::from(self.failmessage.clone()));
        }
        map.insert("show".into(), Value::from(self.show));
        map.insert("escape".into(), Value::from(self.escape));
        map.insert("linebreaks".into(), Value::from(self.linebreaks));
        if !self.replace_strings.is_empty() {
            map.insert(
                "replace_strings".into(),
                Value::from(self.replace_strings.clone()),
            );
        }
        tagged("TextBlock", map)
    }
}

impl Outline for Widget {
    fn outline(&self, owner: &str) -> Value {
        let (module, class) = self.widget_type();
        let mut map = Map::new();
        map.insert("name".into(), Value::from(self.name.clone()));
        insert_brief(&mut map, &self.brief);
        map.insert("widget_type".into(), Value::from(vec![module, class]));
        map.insert("show".into(), Value::from(self.show));
        if !self.fields.is_empty() {
            let fields: Map<String, Value> = self
                .fields
                .iter()
                .map(|(name, value)| (name.clone(), value.outline(owner)))
                .collect();
            map.insert("fields".into(), Value::Object(fields));
        }
        if !self.containers.is_empty() {
            let containers = self
                .containers
                .iter()
                .map(|items| outline_parts(items, owner))
                .collect();
            map.insert("containers".into(), Value::Array(containers));
        }
        tagged("Widget", map)
    }
}
