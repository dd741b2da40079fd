pub mod project;
pub mod resolver;

pub use project::*;
pub use resolver::*;

// Re-export FileSystem traits from pagetree-common
pub use pagetree_common::{FileSystem, MockFileSystem, RealFileSystem};
