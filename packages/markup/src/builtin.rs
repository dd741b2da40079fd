/// Built-in widget kinds
///
/// A small closed set that every registry created with
/// [`WidgetRegistry::with_builtins`] knows about. Applications register their
/// own kinds next to these.
use crate::ident::Ident;
use crate::widget::{FieldSpec, FieldValue, WidgetKind, WidgetRegistry};

/// A div holding one container of arbitrary content
pub struct SimpleContainer;

impl WidgetKind for SimpleContainer {
    fn module(&self) -> &'static str {
        "containers"
    }

    fn class(&self) -> &'static str {
        "SimpleContainer"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![FieldSpec::new("widget_class", "")]
    }

    fn container_count(&self) -> usize {
        1
    }
}

/// Two side-by-side containers
pub struct TwoColumns;

impl WidgetKind for TwoColumns {
    fn module(&self) -> &'static str {
        "containers"
    }

    fn class(&self) -> &'static str {
        "TwoColumns"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("left_class", ""),
            FieldSpec::new("right_class", ""),
        ]
    }

    fn container_count(&self) -> usize {
        2
    }
}

/// A tag wrapping a text field
pub struct TagText;

impl WidgetKind for TagText {
    fn module(&self) -> &'static str {
        "paras"
    }

    fn class(&self) -> &'static str {
        "TagText"
    }

    fn tag_name(&self) -> &'static str {
        "p"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("text", ""),
            FieldSpec::new("widget_class", ""),
        ]
    }
}

/// A link to another page of some project
pub struct Link;

impl WidgetKind for Link {
    fn module(&self) -> &'static str {
        "links"
    }

    fn class(&self) -> &'static str {
        "Link"
    }

    fn tag_name(&self) -> &'static str {
        "a"
    }

    fn fields(&self) -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("link", FieldValue::Ref(Ident::new("", 0))),
            FieldSpec::new("content", ""),
            FieldSpec::new("force_ident", false),
        ]
    }
}

pub fn register_builtins(registry: &mut WidgetRegistry) {
    registry.register(SimpleContainer);
    registry.register(TwoColumns);
    registry.register(TagText);
    registry.register(Link);
}
