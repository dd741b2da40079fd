use super::{print_json, PageArgs};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagetree_markup::WidgetRegistry;
use pagetree_project::{Project, RealFileSystem};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Hide the placeholder with this placename
    #[arg(long = "hide", value_name = "NAME")]
    pub hide: Vec<String>,

    /// Show the placeholder with this placename even if it is hidden
    #[arg(long = "show", value_name = "NAME")]
    pub show: Vec<String>,

    /// Print the outline on one line
    #[arg(long)]
    pub compact: bool,
}

impl ResolveArgs {
    fn overrides(&self) -> BTreeMap<String, bool> {
        let mut overrides = BTreeMap::new();
        for name in &self.show {
            overrides.insert(name.clone(), true);
        }
        // --hide wins when both are given
        for name in &self.hide {
            overrides.insert(name.clone(), false);
        }
        overrides
    }
}

/// Include the project's sections into a stored page and print the result
pub fn resolve(args: ResolveArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(&RealFileSystem, cwd)?;
    let widgets = WidgetRegistry::with_builtins();
    let project = Project::load(
        &RealFileSystem,
        &config.layout(cwd),
        &config.project_id,
        &widgets,
    )?;
    info!(sections = project.section_names().count(), "Project loaded");

    let mut page = args.page.load(&RealFileSystem, cwd, &config, &widgets)?;
    let mut modules: Vec<String> = Vec::new();
    let report = page.resolve_sections(&project, &args.overrides(), &mut modules)?;

    print_json(&page.outline(), args.compact)?;

    eprintln!();
    eprintln!(
        "{} {}",
        "Aliases:".bright_blue().bold(),
        page.aliases().join(", ")
    );
    for (section, used) in page.section_dependencies() {
        let used: Vec<&str> = used.iter().map(String::as_str).collect();
        eprintln!("  {} needs {}", section.bright_white(), used.join(", "));
    }
    if !modules.is_empty() {
        eprintln!("{} {}", "Modules:".bright_blue().bold(), modules.join(", "));
    }
    for placename in &report.hidden {
        eprintln!("  {} {} hidden", "-".dimmed(), placename);
    }

    if report.is_complete() {
        eprintln!(
            "{} Included {} section copies",
            "✓".green(),
            report.included.len()
        );
    } else {
        for miss in &report.misses {
            eprintln!("  {} {}", "✗".yellow(), miss.to_string().yellow());
        }
        eprintln!(
            "{} Included {} section copies, {} misses",
            "⚠️".yellow(),
            report.included.len(),
            report.misses.len()
        );
    }
    Ok(())
}
