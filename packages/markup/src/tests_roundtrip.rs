/// Outline and rebuild whole trees, then check the rebuilt tree addresses
/// exactly like the original
use crate::*;
use serde_json::json;
use std::collections::BTreeSet;

fn sample_body() -> Part {
    let widgets = WidgetRegistry::with_builtins();
    let columns = widgets
        .create("containers", "TwoColumns", "cols")
        .unwrap()
        .with_child_in(0, Part::new("p").with_child(Node::text("left")))
        .with_child_in(
            1,
            widgets
                .create("paras", "TagText", "intro")
                .unwrap()
                .with_field("text", "Welcome"),
        );
    let link = widgets
        .create("links", "Link", "home_link")
        .unwrap()
        .with_field("link", Ident::new("lib", 3))
        .with_field("content", "Library");

    Part::new("body")
        .with_attr("class", "page")
        .with_child(
            Part::new("div")
                .with_brief("header")
                .with_child(Node::symbol("nbsp"))
                .with_child(Node::comment("top")),
        )
        .with_child(columns)
        .with_child(link)
        .with_child(SectionPlaceHolder::new("footer", "f").with_multiplier(2, "li"))
        .with_child(
            TextBlock::new("tagline")
                .from_project("lib")
                .with_replace_strings(["x", "y"]),
        )
        .with_child(ClosedPart::new("img").with_attr("src", "logo.png"))
}

mod roundtrip_tests {
    use super::*;

    #[test]
    fn test_outline_then_build_is_identity() {
        let widgets = WidgetRegistry::with_builtins();
        let body = sample_body();
        let value = body.outline("shop");

        let rebuilt = TreeBuilder::new("shop", &widgets).build_part(&value).unwrap();
        assert_eq!(rebuilt, body);
        assert_eq!(rebuilt.outline("shop"), value);
    }

    #[test]
    fn test_round_trip_through_json_text() {
        let widgets = WidgetRegistry::with_builtins();
        let body = sample_body();
        let text = serde_json::to_string_pretty(&body.outline("shop")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let rebuilt = build(&value, "shop", &widgets).unwrap();
        assert_eq!(rebuilt, Node::Part(body));
    }

    #[test]
    fn test_rebuilt_tree_addresses_identically() {
        let widgets = WidgetRegistry::with_builtins();
        let mut body = sample_body();
        let mut rebuilt = TreeBuilder::new("shop", &widgets)
            .build_part(&body.outline("shop"))
            .unwrap();

        let original = assign_address(&mut body, "home_body");
        let again = assign_address(&mut rebuilt, "home_body");
        assert_eq!(original, again);
        assert_eq!(body, rebuilt);
    }

    #[test]
    fn test_position_ids_are_unique() {
        let mut body = sample_body();
        assign_address(&mut body, "home_body");

        fn collect(node: &Node, ids: &mut Vec<String>) {
            if let Some(id) = node.position_id() {
                ids.push(id.to_string());
            }
            match node {
                Node::Widget(widget) => {
                    for item in widget.containers.iter().flatten() {
                        collect(item, ids);
                    }
                }
                _ => {
                    for child in node.children().unwrap_or_default() {
                        collect(child, ids);
                    }
                }
            }
        }

        let mut ids = Vec::new();
        collect(&Node::Part(body), &mut ids);
        let unique: BTreeSet<_> = ids.iter().cloned().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.contains(&"home_body-1-1-0".to_string()));
    }

    #[test]
    fn test_addressing_twice_changes_nothing() {
        let mut body = sample_body();
        let first = assign_address(&mut body, "home_body");
        let snapshot = body.clone();
        let second = assign_address(&mut body, "home_body");
        assert_eq!(first, second);
        assert_eq!(body, snapshot);
    }

    #[test]
    fn test_foreign_owner_keeps_project_prefixes() {
        let widgets = WidgetRegistry::with_builtins();
        let body = sample_body();
        let value = body.outline("lib");
        assert_eq!(value[1]["parts"][2][1]["fields"]["link"], json!(3));
        assert!(value[1]["parts"][4][1].get("project").is_none());

        let rebuilt = TreeBuilder::new("lib", &widgets).build_part(&value).unwrap();
        let link = rebuilt.children[2].as_widget().unwrap();
        assert_eq!(link.field("link"), Some(&FieldValue::Ref(Ident::new("lib", 3))));
        match &rebuilt.children[4] {
            Node::TextBlock(block) => {
                assert!(block.project.is_empty());
                assert_eq!(block.owning_project("lib"), "lib");
            }
            other => panic!("expected TextBlock, found {:?}", other),
        }
    }
}
