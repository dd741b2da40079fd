use crate::*;
use pagetree_markup::{
    Ident, Location, Node, Part, Section, SectionPlaceHolder, WidgetRegistry,
};
use std::collections::{BTreeMap, BTreeSet};

fn widgets() -> WidgetRegistry {
    WidgetRegistry::with_builtins()
}

fn shop_page() -> Page {
    let widgets = widgets();
    let head = Part::new("head").with_child(Part::new("title").with_child("Shop"));
    let body = Part::new("body")
        .with_child(widgets.create("paras", "TagText", "intro").unwrap())
        .with_child(
            widgets
                .create("containers", "TwoColumns", "cols")
                .unwrap()
                .with_child_in(0, widgets.create("links", "Link", "home").unwrap()),
        )
        .with_child(SectionPlaceHolder::new("footer", "f"));
    Page::with_roots(Ident::new("shop", 1), head, body)
}

fn footer_source() -> BTreeMap<String, Section> {
    let widgets = widgets();
    let mut sections = BTreeMap::new();
    sections.insert(
        "footer".to_string(),
        Section::new("footer").with_child(widgets.create("paras", "TagText", "intro").unwrap()),
    );
    sections
}

#[test]
fn test_address_registers_both_roots() {
    let mut page = shop_page();
    page.address().unwrap();

    assert_eq!(page.base_id(PageRoot::Body), "shop_1_body");
    assert_eq!(page.head.position_id, "shop_1_head");
    assert_eq!(page.body.position_id, "shop_1_body");

    let home = page.widget("home").unwrap();
    assert_eq!(home.position_id, "shop_1_body-1-0-0");
    assert_eq!(home.embedded.widget, "cols");
    assert_eq!(
        page.widgets().get("home"),
        Some(&NodeRef::new(PageRoot::Body, Location(vec![1, 0, 0])))
    );
    assert_eq!(page.placeholder("f").unwrap().section_name, "footer");
    assert_eq!(
        page.names().into_iter().collect::<Vec<_>>(),
        vec!["cols", "f", "home", "intro"]
    );
}

#[test]
fn test_duplicate_name_across_roots() {
    let widgets = widgets();
    let head = Part::new("head").with_child(widgets.create("paras", "TagText", "intro").unwrap());
    let body = Part::new("body").with_child(SectionPlaceHolder::new("footer", "intro"));
    let mut page = Page::with_roots(Ident::new("shop", 1), head, body);

    assert_eq!(page.address(), Err(PageError::collision("intro")));
}

#[test]
fn test_widget_mut_edits_in_place() {
    let mut page = shop_page();
    page.address().unwrap();

    page.widget_mut("intro").unwrap().set_field("text", "Welcome");
    assert_eq!(
        page.widget("intro").unwrap().field("text").and_then(|f| f.as_text()),
        Some("Welcome")
    );
}

#[test]
fn test_section_widgets_do_not_clash_with_page_widgets() {
    let mut page = shop_page();
    let mut deps: BTreeSet<String> = BTreeSet::new();
    let report = page
        .resolve_sections(&footer_source(), &BTreeMap::new(), &mut deps)
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.included, vec!["f"]);
    assert_eq!(page.aliases(), ["f"]);
    assert!(deps.contains("paras"));

    let page_intro = page.widget("intro").unwrap();
    let section_intro = page.section_widget("f", "intro").unwrap();
    assert_eq!(page_intro.position_id, "shop_1_body-0");
    assert_eq!(section_intro.position_id, "shop_1_body_f-0");
    assert_eq!(section_intro.embedded.section, "f");

    page.section_widget_mut("f", "intro")
        .unwrap()
        .set_field("text", "Bye");
    assert_eq!(
        page.section_widget("f", "intro")
            .and_then(|w| w.field("text"))
            .and_then(|f| f.as_text()),
        Some("Bye")
    );
    assert!(page.placeholders().is_empty());
    assert_eq!(page.section_aliases().collect::<Vec<_>>(), vec!["f"]);
    assert_eq!(
        page.section_dependencies().get("footer").map(|m| m.len()),
        Some(1)
    );
}

#[test]
fn test_duplicate_names_in_included_section_are_reported() {
    let widgets = widgets();
    let mut sections = BTreeMap::new();
    sections.insert(
        "cards".to_string(),
        Section::new("div")
            .with_child(
                widgets
                    .create("paras", "TagText", "w")
                    .unwrap()
                    .with_field("text", "first"),
            )
            .with_child(
                widgets
                    .create("paras", "TagText", "w")
                    .unwrap()
                    .with_field("text", "second"),
            ),
    );
    let mut page = Page::with_roots(
        Ident::new("shop", 1),
        Part::new("head"),
        Part::new("body").with_child(SectionPlaceHolder::new("cards", "s")),
    );

    let report = page
        .resolve_sections(&sections, &BTreeMap::new(), &mut Vec::<String>::new())
        .unwrap();

    assert_eq!(report.included, vec!["s"]);
    assert_eq!(
        report.misses,
        vec![ResolutionMiss::DuplicateName {
            placename: "s".to_string(),
            section_name: "cards".to_string(),
            name: "w".to_string(),
        }]
    );
    assert!(!report.is_complete());

    let copy = page.section("s").unwrap();
    assert_eq!(copy.part.children.len(), 2);
    assert_eq!(copy.collisions, vec!["w"]);
    assert_eq!(
        page.section_widget("s", "w")
            .and_then(|w| w.field("text"))
            .and_then(|f| f.as_text()),
        Some("first")
    );
}

#[test]
fn test_resolving_twice_is_stable() {
    let mut page = shop_page();
    let sections = footer_source();
    page.resolve_sections(&sections, &BTreeMap::new(), &mut Vec::<String>::new())
        .unwrap();
    let first = page.outline();

    let report = page
        .resolve_sections(&sections, &BTreeMap::new(), &mut Vec::<String>::new())
        .unwrap();
    assert!(report.is_complete());
    assert!(report.included.is_empty());
    assert_eq!(page.outline(), first);
    assert_eq!(page.section("f").unwrap().position_id(), "shop_1_body_f");
}

#[test]
fn test_merge_renames_incoming_names() {
    let widgets = widgets();
    let mut page = shop_page();
    page.address().unwrap();

    let incoming = Part::new("div")
        .with_child(widgets.create("paras", "TagText", "intro").unwrap())
        .with_child(SectionPlaceHolder::new("footer", "f"));
    let renamed = page
        .merge(PageRoot::Body, &Location(vec![3]), incoming)
        .unwrap();

    assert_eq!(
        renamed,
        vec![
            ("intro".to_string(), "intro2".to_string()),
            ("f".to_string(), "f2".to_string())
        ]
    );
    assert_eq!(page.widget("intro2").unwrap().position_id, "shop_1_body-3-0");
    assert!(page.placeholder("f2").is_some());
}

#[test]
fn test_merge_at_bad_location() {
    let mut page = shop_page();
    page.address().unwrap();
    let err = page
        .merge(PageRoot::Head, &Location(vec![7, 0]), Part::new("p"))
        .unwrap_err();
    assert_eq!(
        err,
        PageError::InvalidLocation {
            root: "head".to_string(),
            location: "7-0".to_string(),
        }
    );
}

#[test]
fn test_remove_unregisters_widget() {
    let mut page = shop_page();
    page.address().unwrap();

    let removed = page.remove(PageRoot::Body, &Location(vec![0])).unwrap();
    assert_eq!(removed.name(), Some("intro"));
    assert!(page.widget("intro").is_none());
    assert_eq!(page.widget("cols").unwrap().position_id, "shop_1_body-0");
}

#[test]
fn test_ensure_position_id_for_new_node() {
    let mut page = shop_page();
    page.address().unwrap();
    page.body.push(Part::new("aside"));

    let node = NodeRef::new(PageRoot::Body, Location(vec![3]));
    let id = page.ensure_position_id(&node).unwrap();
    assert!(id.ends_with("-1"));
    assert_eq!(page.ensure_position_id(&node), Some(id));

    let text = NodeRef::new(PageRoot::Head, Location(vec![0, 0]));
    assert_eq!(page.ensure_position_id(&text), None);
}

#[test]
fn test_outline_round_trip() {
    let mut page = shop_page();
    page.address().unwrap();
    let outline = page.outline();

    let rebuilt = Page::build(&outline, Ident::new("shop", 1), &widgets()).unwrap();
    assert_eq!(rebuilt.outline(), outline);
    assert_eq!(rebuilt.widgets(), page.widgets());
    assert_eq!(rebuilt.project(), "shop");
}

#[test]
fn test_build_requires_body() {
    let outline = serde_json::json!({ "head": ["Part", { "tag_name": "head" }] });
    let err = Page::build(&outline, Ident::new("shop", 1), &widgets()).unwrap_err();
    assert_eq!(
        err,
        PageError::Build(pagetree_markup::BuildError::missing_field("Page", "body"))
    );
}

#[test]
fn test_get_follows_node_refs() {
    let mut page = shop_page();
    page.address().unwrap();
    let title = NodeRef::new(PageRoot::Head, Location(vec![0]));
    assert!(matches!(page.get(&title), Some(Node::Part(part)) if part.tag_name == "title"));
}
