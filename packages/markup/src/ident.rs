use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Reference to an addressable page or folder, owned by some project
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident {
    pub project: String,
    pub num: u32,
}

impl Ident {
    pub fn new(project: impl Into<String>, num: u32) -> Self {
        Self {
            project: project.into(),
            num,
        }
    }

    pub fn is_local_to(&self, owner: &str) -> bool {
        self.project == owner
    }

    /// Outline form: a bare number inside the owning project, a
    /// `[project, number]` pair across projects
    pub fn outline(&self, owner: &str) -> Value {
        if self.is_local_to(owner) {
            Value::from(self.num)
        } else {
            Value::Array(vec![Value::from(self.project.clone()), Value::from(self.num)])
        }
    }

    /// Inverse of [`Ident::outline`]. Anything else yields `None`.
    pub fn from_outline(value: &Value, owner: &str) -> Option<Ident> {
        match value {
            Value::Number(n) => {
                let num = u32::try_from(n.as_u64()?).ok()?;
                Some(Ident::new(owner, num))
            }
            Value::Array(pair) if pair.len() == 2 => {
                let project = pair[0].as_str()?;
                let num = u32::try_from(pair[1].as_u64()?).ok()?;
                Some(Ident::new(project, num))
            }
            _ => None,
        }
    }

    /// Parse the textual forms used by editors and config files:
    /// `"project,5"`, `"project_5"` or a bare `"5"` (taken as `owner`'s)
    pub fn parse(text: &str, owner: &str) -> Option<Ident> {
        let text = text.trim();
        if let Ok(num) = text.parse::<u32>() {
            return Some(Ident::new(owner, num));
        }

        let (project, num) = text.rsplit_once(',').or_else(|| text.rsplit_once('_'))?;
        let project = project.trim();
        if project.is_empty() {
            return None;
        }
        let num = num.trim().parse::<u32>().ok()?;
        Some(Ident::new(project, num))
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.project, self.num)
    }
}
