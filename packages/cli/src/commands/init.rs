use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagetree_markup::{Ident, Node, Outline, Part, Section, SectionPlaceHolder};
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Project id that owns the pages
    #[arg(short, long, default_value = "project")]
    pub project_id: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

/// Write `value` unless the file is already there
fn write_new(path: &Path, value: &serde_json::Value, label: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    println!("  {} Created {}", "✓".green(), label);
    Ok(())
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing pagetree project...".bright_blue().bold());

    let config = Config {
        project_id: args.project_id.clone(),
        ..Config::default()
    };
    let layout = config.layout(cwd);

    for dir in [layout.sections_path(), config.get_pages_dir(cwd)] {
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
            println!("  {} Created {}/", "✓".green(), dir.display());
        }
    }

    let footer = Section::new("footer").with_child(Node::text("Made with pagetree"));
    write_new(
        &layout.section_path("footer"),
        &footer.outline(&config.project_id),
        "sections/footer.json",
    )?;

    let ident = Ident::new(&config.project_id, 1);
    let mut page = serde_json::Map::new();
    page.insert(
        "head".into(),
        Part::new("head")
            .with_child(Part::new("title").with_child("Home"))
            .outline(&ident.project),
    );
    page.insert(
        "body".into(),
        Part::new("body")
            .with_child(Part::new("h1").with_child("Home"))
            .with_child(SectionPlaceHolder::new("footer", "footer"))
            .outline(&ident.project),
    );
    write_new(
        &config.get_pages_dir(cwd).join("1.json"),
        &serde_json::Value::Object(page),
        "pages/1.json",
    )?;

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{} Project {} initialized", "✅".green(), ident.project.bright_white());
    println!("Try: {}", "pagetree resolve 1".bright_white());
    Ok(())
}
