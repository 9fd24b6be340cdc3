//! Structured-document field source.
//!
//! Designer-authored data supplies call arguments as child elements of one
//! node, in document order:
//!
//! ```xml
//! <call>
//!   <arg>3</arg>
//!   <arg value="hello"/>
//! </call>
//! ```
//!
//! Each child yields its `value` attribute when present, otherwise its
//! trimmed text content (empty when it has none). Child tag names are not
//! interpreted.

use roxmltree::{Children, Node};

use crate::text::FieldSource;

/// Attribute read in preference to element text.
pub const VALUE_ATTRIBUTE: &str = "value";

/// Reads the child elements of a node as ordered fields.
#[derive(Debug, Clone)]
pub struct ElementFields<'a, 'input> {
    children: Children<'a, 'input>,
}

impl<'a, 'input> ElementFields<'a, 'input> {
    /// Read the element children of `node`.
    pub fn new(node: Node<'a, 'input>) -> Self {
        Self {
            children: node.children(),
        }
    }
}

/// The field value of one child element.
pub fn element_value(node: &Node<'_, '_>) -> String {
    match node.attribute(VALUE_ATTRIBUTE) {
        Some(value) => value.to_string(),
        None => node.text().map(str::trim).unwrap_or_default().to_string(),
    }
}

impl FieldSource for ElementFields<'_, '_> {
    fn next_field(&mut self) -> Option<String> {
        self.children
            .by_ref()
            .find(|child| child.is_element())
            .map(|child| element_value(&child))
    }
}
