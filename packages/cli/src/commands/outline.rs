use super::{print_json, PageArgs};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use pagetree_common::RealFileSystem;
use pagetree_markup::WidgetRegistry;
use std::path::Path;

#[derive(Debug, Args)]
pub struct OutlineArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// Print on one line
    #[arg(long)]
    pub compact: bool,
}

/// Print the normalized outline of a stored page
pub fn outline(args: OutlineArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(&RealFileSystem, cwd)?;
    let page = args
        .page
        .load(&RealFileSystem, cwd, &config, &WidgetRegistry::with_builtins())?;
    print_json(&page.outline(), args.compact)
}
