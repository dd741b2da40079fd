use thiserror::Error;

pub type BuildResult<T> = Result<T, BuildError>;

/// Failure to turn a stored outline back into live nodes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error("Unknown node type '{0}'")]
    UnknownNodeType(String),

    #[error("Unknown widget type {module}.{class}")]
    UnknownWidget { module: String, class: String },

    #[error("{node} is missing required field '{field}'")]
    MissingField { node: String, field: String },

    #[error("{node} field '{field}' is invalid: expected {expected}")]
    InvalidField {
        node: String,
        field: String,
        expected: String,
    },

    #[error("Widget '{widget}' has no field '{field}'")]
    UnknownWidgetField { widget: String, field: String },

    #[error("Widget '{widget}' expects {expected} containers, found {found}")]
    ContainerCount {
        widget: String,
        expected: usize,
        found: usize,
    },

    #[error("Malformed outline: {0}")]
    Malformed(String),
}

impl BuildError {
    pub fn unknown_widget(module: impl Into<String>, class: impl Into<String>) -> Self {
        Self::UnknownWidget {
            module: module.into(),
            class: class.into(),
        }
    }

    pub fn missing_field(node: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            node: node.into(),
            field: field.into(),
        }
    }

    pub fn invalid_field(
        node: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            node: node.into(),
            field: field.into(),
            expected: expected.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// A location path that does not lead to a node (or to a child list)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("No node at location '{0}'")]
    NotFound(String),

    #[error("Invalid location '{0}'")]
    Malformed(String),
}
