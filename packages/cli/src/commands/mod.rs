pub mod address;
pub mod init;
pub mod outline;
pub mod resolve;

pub use address::{address, AddressArgs};
pub use init::{init, InitArgs};
pub use outline::{outline, OutlineArgs};
pub use resolve::{resolve, ResolveArgs};

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use pagetree_common::FileSystem;
use pagetree_markup::{Ident, WidgetRegistry};
use pagetree_page::Page;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Which stored page to work on
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page outline file, as a path or relative to the pages directory
    pub page: PathBuf,

    /// Page reference (`3`, `lib,3`) when the file name is not one
    #[arg(long = "ident")]
    pub ident: Option<String>,
}

impl PageArgs {
    fn ident(&self, path: &Path, config: &Config) -> Result<Ident> {
        let text = match &self.ident {
            Some(ident) => ident.clone(),
            None => path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .map(str::to_string)
                .ok_or_else(|| anyhow!("Cannot name page {}", path.display()))?,
        };
        Ident::parse(&text, &config.project_id)
            .ok_or_else(|| anyhow!("'{}' is not a page reference; pass --ident", text))
    }

    /// Read, build and address the page
    pub fn load(
        &self,
        fs: &dyn FileSystem,
        cwd: &Path,
        config: &Config,
        widgets: &WidgetRegistry,
    ) -> Result<Page> {
        let path = config.page_path(fs, cwd, &self.page);
        let ident = self.ident(&path, config)?;
        let text = fs
            .read_to_string(&path)
            .with_context(|| format!("reading page {}", path.display()))?;
        let value: Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing page {}", path.display()))?;
        let page = Page::build(&value, ident, widgets)
            .with_context(|| format!("building page {}", path.display()))?;
        Ok(page)
    }
}

pub fn print_json(value: &Value, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}
