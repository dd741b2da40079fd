pub mod error;
pub mod inclusion;
pub mod page;
pub mod uniquify;

#[cfg(test)]
mod tests_inclusion;

#[cfg(test)]
mod tests_page;

pub use error::{PageError, PageResult};
pub use inclusion::{
    resolve_sections, section_locations, DependencySink, InclusionEngine, InclusionOutcome,
    InclusionReport, ResolutionMiss,
};
pub use page::{NodeRef, Page, PageRoot};
pub use uniquify::{uniquify, Uniquifier};
