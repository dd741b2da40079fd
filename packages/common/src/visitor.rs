use pagetree_markup::{ClosedPart, Node, Part, Section, SectionPlaceHolder, TextBlock, Widget};

/// Visitor pattern for traversing markup trees immutably
///
/// This trait provides default implementations that walk the entire tree,
/// widget containers included. Override specific visit_* methods to perform
/// custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_part(&mut self, part: &Part) {
        walk_part(self, part);
    }

    fn visit_section(&mut self, section: &Section) {
        walk_part(self, &section.part);
    }

    fn visit_widget(&mut self, widget: &Widget) {
        walk_widget(self, widget);
    }

    fn visit_closed_part(&mut self, _part: &ClosedPart) {
        // Leaf node, no children to walk
    }

    fn visit_placeholder(&mut self, _placeholder: &SectionPlaceHolder) {
        // Leaf node, no children to walk
    }

    fn visit_text_block(&mut self, _block: &TextBlock) {
        // Leaf node, no children to walk
    }

    fn visit_text(&mut self, _text: &str) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor pattern for transforming markup trees
///
/// Similar to Visitor, but provides mutable access to nodes.
/// Use this when you need to modify the tree during traversal.
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_part_mut(&mut self, part: &mut Part) {
        walk_part_mut(self, part);
    }

    fn visit_section_mut(&mut self, section: &mut Section) {
        walk_part_mut(self, &mut section.part);
    }

    fn visit_widget_mut(&mut self, widget: &mut Widget) {
        walk_widget_mut(self, widget);
    }

    fn visit_closed_part_mut(&mut self, _part: &mut ClosedPart) {
        // Leaf node, no children to walk
    }

    fn visit_placeholder_mut(&mut self, _placeholder: &mut SectionPlaceHolder) {
        // Leaf node, no children to walk
    }

    fn visit_text_block_mut(&mut self, _block: &mut TextBlock) {
        // Leaf node, no children to walk
    }
}

// Default walk implementations for immutable visitor

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    match node {
        Node::Part(part) => visitor.visit_part(part),
        Node::ClosedPart(part) => visitor.visit_closed_part(part),
        Node::Section(section) => visitor.visit_section(section),
        Node::SectionPlaceHolder(placeholder) => visitor.visit_placeholder(placeholder),
        Node::TextBlock(block) => visitor.visit_text_block(block),
        Node::Widget(widget) => visitor.visit_widget(widget),
        Node::Text(text) => visitor.visit_text(text),
        Node::Symbol(_) | Node::Comment(_) => {
            // Leaf nodes
        }
    }
}

pub fn walk_part<V: Visitor>(visitor: &mut V, part: &Part) {
    for child in &part.children {
        visitor.visit_node(child);
    }
}

pub fn walk_widget<V: Visitor>(visitor: &mut V, widget: &Widget) {
    for item in widget.containers.iter().flatten() {
        visitor.visit_node(item);
    }
}

// Default walk implementations for mutable visitor

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    match node {
        Node::Part(part) => visitor.visit_part_mut(part),
        Node::ClosedPart(part) => visitor.visit_closed_part_mut(part),
        Node::Section(section) => visitor.visit_section_mut(section),
        Node::SectionPlaceHolder(placeholder) => visitor.visit_placeholder_mut(placeholder),
        Node::TextBlock(block) => visitor.visit_text_block_mut(block),
        Node::Widget(widget) => visitor.visit_widget_mut(widget),
        Node::Text(_) | Node::Symbol(_) | Node::Comment(_) => {
            // Leaf nodes
        }
    }
}

pub fn walk_part_mut<V: VisitorMut>(visitor: &mut V, part: &mut Part) {
    for child in &mut part.children {
        visitor.visit_node_mut(child);
    }
}

pub fn walk_widget_mut<V: VisitorMut>(visitor: &mut V, widget: &mut Widget) {
    for item in widget.containers.iter_mut().flatten() {
        visitor.visit_node_mut(item);
    }
}
