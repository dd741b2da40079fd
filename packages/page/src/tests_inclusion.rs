/// Inclusion over bare roots: splicing, aliases, misses and dependencies
use crate::*;
use pagetree_markup::{Location, Node, Part, Section, SectionPlaceHolder, WidgetRegistry};
use std::collections::{BTreeMap, BTreeSet};

fn footer() -> Section {
    Section::new("p").with_child(Node::text("Hi"))
}

fn sources() -> BTreeMap<String, Section> {
    let widgets = WidgetRegistry::with_builtins();
    let mut sections = BTreeMap::new();
    sections.insert("footer".to_string(), footer());
    sections.insert(
        "menu".to_string(),
        Section::new("nav")
            .with_child(widgets.create("links", "Link", "home").unwrap())
            .with_child(
                widgets
                    .create("containers", "SimpleContainer", "box")
                    .unwrap()
                    .with_child_in(0, widgets.create("paras", "TagText", "w").unwrap()),
            ),
    );
    sections
}

mod inclusion_tests {
    use super::*;

    #[test]
    fn test_single_inclusion_replaces_placeholder() {
        let mut body = Part::new("body")
            .with_child(Part::new("h1"))
            .with_child(SectionPlaceHolder::new("footer", "f"));
        let mut deps: BTreeSet<String> = BTreeSet::new();

        let outcome = resolve_sections(&mut body, "home_body", &sources(), &BTreeMap::new(), &mut deps);

        assert_eq!(outcome.aliases, vec!["f"]);
        assert_eq!(outcome.report.included, vec!["f"]);
        assert!(outcome.report.is_complete());

        let section = body.children[1].as_section().unwrap();
        assert_eq!(section.alias(), Some("f"));
        assert_eq!(section.name, "footer");
        assert_eq!(section.part.get_attrib("id"), Some("f"));
        assert_eq!(section.position_id(), "home_body_f");
        assert_eq!(section.part.children.len(), 1);
        assert!(deps.is_empty());
    }

    #[test]
    fn test_existing_id_attribute_is_kept() {
        let mut sections = sources();
        sections.insert("footer".to_string(), footer().with_attr("id", "page-footer"));
        let mut body = Part::new("body").with_child(SectionPlaceHolder::new("footer", "f"));

        resolve_sections(&mut body, "b", &sections, &BTreeMap::new(), &mut Vec::<String>::new());
        let section = body.children[0].as_section().unwrap();
        assert_eq!(section.part.get_attrib("id"), Some("page-footer"));
    }

    #[test]
    fn test_multiplied_inclusion_wraps_first_copy() {
        let mut body = Part::new("body")
            .with_child(SectionPlaceHolder::new("footer", "f").with_multiplier(3, "li"))
            .with_child(Part::new("hr"));

        let outcome = resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());
        assert_eq!(outcome.aliases, vec!["f", "f_0", "f_1", "f_2"]);
        assert_eq!(outcome.report.included, vec!["f_0", "f_1", "f_2"]);

        assert_eq!(body.children.len(), 4);
        let wrapper = body.children[0].as_part().unwrap();
        assert_eq!(wrapper.tag_name, "li");
        assert_eq!(wrapper.get_attrib("id"), Some("f"));
        assert_eq!(wrapper.position_id, "b-0");

        let first = wrapper.children[0].as_section().unwrap();
        assert_eq!(first.alias(), Some("f_0"));
        assert_eq!(first.position_id(), "b_f_0");
        assert_eq!(first.part.get_attrib("id"), None);

        for (index, k) in [(1, 1), (2, 2)] {
            let copy = body.children[index].as_section().unwrap();
            assert_eq!(copy.alias(), Some(format!("f_{}", k).as_str()));
            assert_eq!(copy.position_id(), format!("b_f_{}", k));
        }
        assert_eq!(body.children[3].as_part().unwrap().tag_name, "hr");
        assert_eq!(body.children[3].position_id(), Some("b-3"));

        let locations = section_locations(&body);
        assert_eq!(locations.get("f_0"), Some(&Location(vec![0, 0])));
        assert_eq!(locations.get("f_2"), Some(&Location(vec![2])));
        assert_eq!(locations.len(), 3);
    }

    #[test]
    fn test_copies_are_independent() {
        let mut body = Part::new("body")
            .with_child(SectionPlaceHolder::new("footer", "f").with_multiplier(2, "div"));
        resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());

        if let Node::Section(copy) = &mut body.children[1] {
            copy.part.push(Node::text("only here"));
        }
        let first = body.children[0].as_part().unwrap().children[0]
            .as_section()
            .unwrap();
        assert_eq!(first.part.children.len(), 1);
    }

    #[test]
    fn test_missing_section_leaves_tree_unchanged() {
        let mut body = Part::new("body")
            .with_child(Part::new("h1"))
            .with_child(SectionPlaceHolder::new("nowhere", "n").with_multiplier(2, "div"));
        let mut before = body.clone();
        pagetree_markup::assign_address(&mut before, "b");

        let outcome = resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());
        assert_eq!(body, before);
        assert!(outcome.report.included.is_empty());
        assert_eq!(
            outcome.report.misses,
            vec![ResolutionMiss::SectionNotFound {
                placename: "n".to_string(),
                section_name: "nowhere".to_string(),
            }]
        );
        assert!(section_locations(&body).is_empty());
    }

    #[test]
    fn test_one_miss_does_not_block_others() {
        let mut body = Part::new("body")
            .with_child(SectionPlaceHolder::new("nowhere", "n"))
            .with_child(SectionPlaceHolder::new("footer", "f"));
        let outcome = resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());

        assert_eq!(outcome.report.misses.len(), 1);
        assert_eq!(outcome.report.included, vec!["f"]);
        assert!(body.children[0].as_placeholder().is_some());
        assert!(body.children[1].as_section().is_some());
    }

    #[test]
    fn test_visibility_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert("f".to_string(), false);
        overrides.insert("g".to_string(), true);

        let mut body = Part::new("body")
            .with_child(SectionPlaceHolder::new("footer", "f"))
            .with_child(SectionPlaceHolder::new("footer", "g").hidden());
        let outcome = resolve_sections(&mut body, "b", &sources(), &overrides, &mut Vec::<String>::new());

        assert_eq!(outcome.report.hidden, vec!["f"]);
        assert_eq!(outcome.report.included, vec!["g"]);
        // hidden placeholders still claim their alias
        assert_eq!(outcome.aliases, vec!["f", "g"]);
        assert!(body.children[0].as_placeholder().is_some());
        assert_eq!(body.children[1].as_section().unwrap().alias(), Some("g"));
    }

    #[test]
    fn test_hiding_override_lasts_one_pass() {
        let mut hide = BTreeMap::new();
        hide.insert("f".to_string(), false);
        let mut body = Part::new("body").with_child(SectionPlaceHolder::new("footer", "f"));

        let outcome = resolve_sections(&mut body, "b", &sources(), &hide, &mut Vec::<String>::new());
        assert_eq!(outcome.report.hidden, vec!["f"]);
        let placeholder = body.children[0].as_placeholder().unwrap();
        assert!(placeholder.show);

        let outcome = resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());
        assert!(outcome.report.hidden.is_empty());
        assert_eq!(outcome.report.included, vec!["f"]);
        assert_eq!(body.children[0].as_section().unwrap().alias(), Some("f"));
    }

    #[test]
    fn test_alias_collision_with_widget() {
        let widgets = WidgetRegistry::with_builtins();
        let mut body = Part::new("body")
            .with_child(widgets.create("paras", "TagText", "f_1").unwrap())
            .with_child(SectionPlaceHolder::new("footer", "f").with_multiplier(2, "div"));

        let outcome = resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());
        assert_eq!(
            outcome.report.misses,
            vec![ResolutionMiss::NameCollision {
                placename: "f".to_string(),
                alias: "f_1".to_string(),
            }]
        );
        assert!(outcome.aliases.is_empty());
        assert!(body.children[1].as_placeholder().is_some());
    }

    #[test]
    fn test_dependencies_follow_definition_name() {
        let mut body = Part::new("body")
            .with_child(SectionPlaceHolder::new("menu", "top"))
            .with_child(SectionPlaceHolder::new("menu", "bottom"));
        let mut declared = Vec::new();
        let mut count = 0;

        let outcome = {
            let mut sink = |module: &str| {
                declared.push(module.to_string());
                count += 1;
            };
            resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut sink)
        };

        assert_eq!(count, 6);
        assert_eq!(declared[..3], ["links", "containers", "paras"]);
        let modules: BTreeSet<String> = ["containers", "links", "paras"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(outcome.dependencies.get("menu"), Some(&modules));
        assert!(outcome.dependencies.get("top").is_none());
    }

    #[test]
    fn test_section_widgets_are_scoped_to_copy() {
        let widgets = WidgetRegistry::with_builtins();
        let mut body = Part::new("body")
            .with_child(widgets.create("paras", "TagText", "w").unwrap())
            .with_child(SectionPlaceHolder::new("menu", "m").with_multiplier(2, "div"));

        resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());
        let registries = pagetree_markup::assign_address(&mut body, "b");
        assert!(registries.is_clean());
        assert_eq!(registries.widgets.len(), 1);

        let copy = body.children[2].as_section().unwrap();
        let inner = copy.widget("w").unwrap();
        assert_eq!(inner.embedded.section, "m_1");
        assert_eq!(inner.embedded.widget, "box");
        assert_eq!(inner.embedded.container, Some(0));
        assert_eq!(inner.position_id, "b_m_1-1-0-0");
    }

    #[test]
    fn test_nested_placeholders_are_not_expanded() {
        let mut sections = sources();
        sections.insert(
            "loop".to_string(),
            Section::new("div").with_child(SectionPlaceHolder::new("loop", "inner")),
        );
        let mut body = Part::new("body").with_child(SectionPlaceHolder::new("loop", "outer"));

        let outcome = resolve_sections(&mut body, "b", &sections, &BTreeMap::new(), &mut Vec::<String>::new());
        assert_eq!(outcome.report.included, vec!["outer"]);
        let copy = body.children[0].as_section().unwrap();
        assert!(copy.part.children[0].as_placeholder().is_some());
    }

    #[test]
    fn test_placeholder_inside_widget_container() {
        let widgets = WidgetRegistry::with_builtins();
        let mut body = Part::new("body").with_child(
            widgets
                .create("containers", "TwoColumns", "cols")
                .unwrap()
                .with_child_in(1, SectionPlaceHolder::new("footer", "f")),
        );

        resolve_sections(&mut body, "b", &sources(), &BTreeMap::new(), &mut Vec::<String>::new());
        let columns = body.children[0].as_widget().unwrap();
        let copy = columns.containers[1][0].as_section().unwrap();
        assert_eq!(copy.alias(), Some("f"));
        assert_eq!(copy.part.embedded.widget, "cols");
        assert_eq!(
            section_locations(&body).get("f"),
            Some(&Location(vec![0, 1, 0]))
        );
    }
}
