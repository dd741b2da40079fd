pub mod addressing;
pub mod builder;
pub mod builtin;
pub mod error;
pub mod id_generator;
pub mod ident;
pub mod location;
pub mod node;
pub mod outline;
pub mod widget;

#[cfg(test)]
mod tests_roundtrip;

pub use addressing::{assign_address, Addressable, Registries};
pub use builder::{build, coerce_multiplier, TreeBuilder};
pub use error::{BuildError, BuildResult, LocationError};
pub use id_generator::{get_seed, IdGenerator};
pub use ident::Ident;
pub use location::Location;
pub use node::{
    Attribs, ClosedPart, EmbeddedContext, Node, Part, Section, SectionPlaceHolder, TextBlock,
};
pub use outline::{outline, Outline};
pub use widget::{FieldSpec, FieldValue, Widget, WidgetKind, WidgetRegistry};
