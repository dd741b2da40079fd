//! # Location paths
//!
//! A [`Location`] is the sequence of child indices leading from a root to a
//! node. Stepping onto a widget consumes two numbers, the container index and
//! the item index within that container, so `[2, 0, 1]` is "item 1 of
//! container 0 of the widget at child 2".
//!
//! Locations and position ids are interchangeable: the id of the node at
//! `[2, 0, 1]` below a root addressed as `home_body` is `home_body-2-0-1`.
//! Lexicographic order on locations is document (pre-order) order.

use crate::error::LocationError;
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location(pub Vec<usize>);

impl Location {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Location one step further down
    pub fn child(&self, index: usize) -> Location {
        let mut steps = self.0.clone();
        steps.push(index);
        Location(steps)
    }

    /// Location of an item inside one of a widget's containers
    pub fn container_item(&self, container: usize, index: usize) -> Location {
        let mut steps = self.0.clone();
        steps.push(container);
        steps.push(index);
        Location(steps)
    }

    /// Split into the path of the enclosing child list and the index within it
    pub fn split_last(&self) -> Option<(&[usize], usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((parent, *last))
    }

    /// Same location with the trailing index shifted by `offset`
    pub fn with_offset(&self, offset: usize) -> Location {
        let mut steps = self.0.clone();
        if let Some(last) = steps.last_mut() {
            *last += offset;
        }
        Location(steps)
    }

    /// Position id of the node at this location below a root addressed as `base`
    pub fn position_id(&self, base: &str) -> String {
        if self.is_root() {
            base.to_string()
        } else {
            format!("{}-{}", base, self)
        }
    }

    /// Recover the location from a position id assigned below `base`
    pub fn from_position_id(base: &str, position_id: &str) -> Option<Location> {
        let rest = position_id.strip_prefix(base)?;
        if rest.is_empty() {
            return Some(Location::root());
        }
        rest.strip_prefix('-')?.parse().ok()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("-"))
    }
}

impl FromStr for Location {
    type Err = LocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Location::root());
        }
        s.split(['-', '.', ','])
            .map(|step| step.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Location)
            .map_err(|_| LocationError::Malformed(s.to_string()))
    }
}

impl From<Vec<usize>> for Location {
    fn from(steps: Vec<usize>) -> Self {
        Location(steps)
    }
}

/// The child list reached by following `steps` from `children`
pub fn child_list<'a>(children: &'a [Node], steps: &[usize]) -> Option<&'a [Node]> {
    let Some((&index, rest)) = steps.split_first() else {
        return Some(children);
    };
    match children.get(index)? {
        Node::Part(part) => child_list(&part.children, rest),
        Node::Section(section) => child_list(&section.part.children, rest),
        Node::Widget(widget) => {
            let (&container, rest) = rest.split_first()?;
            child_list(widget.containers.get(container)?, rest)
        }
        _ => None,
    }
}

pub fn child_list_mut<'a>(children: &'a mut Vec<Node>, steps: &[usize]) -> Option<&'a mut Vec<Node>> {
    let Some((&index, rest)) = steps.split_first() else {
        return Some(children);
    };
    match children.get_mut(index)? {
        Node::Part(part) => child_list_mut(&mut part.children, rest),
        Node::Section(section) => child_list_mut(&mut section.part.children, rest),
        Node::Widget(widget) => {
            let (&container, rest) = rest.split_first()?;
            child_list_mut(widget.containers.get_mut(container)?, rest)
        }
        _ => None,
    }
}

pub fn node_at<'a>(children: &'a [Node], location: &Location) -> Option<&'a Node> {
    let (parent, index) = location.split_last()?;
    child_list(children, parent)?.get(index)
}

pub fn node_at_mut<'a>(children: &'a mut Vec<Node>, location: &Location) -> Option<&'a mut Node> {
    let (parent, index) = location.split_last()?;
    child_list_mut(children, parent)?.get_mut(index)
}

/// Insert `node` at `location`; an index past the end appends
pub fn insert_at(
    children: &mut Vec<Node>,
    location: &Location,
    node: Node,
) -> Result<(), LocationError> {
    let (parent, index) = location
        .split_last()
        .ok_or_else(|| LocationError::NotFound(location.to_string()))?;
    let list = child_list_mut(children, parent)
        .ok_or_else(|| LocationError::NotFound(location.to_string()))?;
    let index = index.min(list.len());
    list.insert(index, node);
    Ok(())
}

pub fn remove_at(children: &mut Vec<Node>, location: &Location) -> Result<Node, LocationError> {
    let not_found = || LocationError::NotFound(location.to_string());
    let (parent, index) = location.split_last().ok_or_else(not_found)?;
    let list = child_list_mut(children, parent).ok_or_else(not_found)?;
    if index >= list.len() {
        return Err(not_found());
    }
    Ok(list.remove(index))
}

/// Replace the node at `location` with `nodes` (possibly several), returning
/// the node that was there
pub fn splice_at(
    children: &mut Vec<Node>,
    location: &Location,
    nodes: Vec<Node>,
) -> Result<Node, LocationError> {
    let not_found = || LocationError::NotFound(location.to_string());
    let (parent, index) = location.split_last().ok_or_else(not_found)?;
    let list = child_list_mut(children, parent).ok_or_else(not_found)?;
    if index >= list.len() {
        return Err(not_found());
    }
    let mut removed = list.splice(index..=index, nodes);
    removed.next().ok_or_else(not_found)
}
