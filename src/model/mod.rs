//! Intermediate element tree (IET) types.
//!
//! This module defines the intermediate representation that bridges
//! HTML parsing and backend conversion. The model is backend-agnostic:
//! every adapter consumes the same nodes, styles and attributes.

mod node;
mod style;

pub use node::{Metadata, Node, NodeKind};
pub use style::{layered, AttributeMap, Scope, StyleMap, StyleValue, MAX_SPAN};
