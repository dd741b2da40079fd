use pagetree_markup::BuildError;
use thiserror::Error;

pub type PageResult<T> = Result<T, PageError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    /// Two widgets or placeholders of one page share a name. Merged content
    /// is uniquified first, so this points at a bug in the caller.
    #[error("Name '{name}' is used by more than one widget or placeholder on the page")]
    AddressCollision { name: String },

    #[error("No node at location '{location}' in {root}")]
    InvalidLocation { root: String, location: String },

    #[error(transparent)]
    Build(#[from] BuildError),
}

impl PageError {
    pub fn collision(name: impl Into<String>) -> Self {
        Self::AddressCollision { name: name.into() }
    }
}
