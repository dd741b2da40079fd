use super::PageArgs;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagetree_common::{walk_node, RealFileSystem, Visitor};
use pagetree_markup::{Node, WidgetRegistry};
use pagetree_page::{NodeRef, Page, PageRoot};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Args)]
pub struct AddressArgs {
    #[command(flatten)]
    pub page: PageArgs,
}

/// Position ids in document order
#[derive(Default)]
struct IdListing {
    rows: Vec<(String, &'static str, Option<String>)>,
}

impl Visitor for IdListing {
    fn visit_node(&mut self, node: &Node) {
        if let Some(id) = node.position_id() {
            self.rows.push((
                id.to_string(),
                node.kind_name(),
                node.name().map(str::to_string),
            ));
        }
        walk_node(self, node);
    }
}

fn print_registry(title: &str, page: &Page, entries: &BTreeMap<String, NodeRef>) {
    println!("{}", title.bright_blue().bold());
    if entries.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for (name, node) in entries {
        let id = page.get(node).and_then(Node::position_id).unwrap_or_default();
        println!(
            "  {} {} {}",
            name.bright_white(),
            format!("{}[{}]", node.root, node.location).dimmed(),
            id
        );
    }
}

/// Address a stored page and print every id it received
pub fn address(args: AddressArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(&RealFileSystem, cwd)?;
    let page = args
        .page
        .load(&RealFileSystem, cwd, &config, &WidgetRegistry::with_builtins())?;

    for root in PageRoot::ALL {
        let mut listing = IdListing::default();
        listing.visit_part(page.root(root));

        println!("{} {}", root.to_string().bright_blue().bold(), page.base_id(root));
        for (id, kind, name) in listing.rows {
            match name {
                Some(name) => println!("  {} {} {}", id, kind.dimmed(), name.bright_white()),
                None => println!("  {} {}", id, kind.dimmed()),
            }
        }
    }

    println!();
    print_registry("Widgets", &page, page.widgets());
    print_registry("Placeholders", &page, page.placeholders());
    Ok(())
}
