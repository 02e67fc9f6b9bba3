//! Style resolution.
//!
//! Raw CSS-like styles on element tree nodes are turned into backend style
//! objects in three steps:
//!
//! 1. shorthand expansion (`border`, `margin`, `padding`, ...)
//! 2. per-property mapping through a [`StyleResolver`] mapping table
//! 3. deep merge of the mapped fragments
//!
//! Inheritance between parent and child nodes is driven by the
//! [`StyleMetaRegistry`].

pub mod mappings;
mod merge;
mod meta;
mod resolver;
mod shorthand;
pub mod units;

pub use merge::{deep_merge, BackendStyles};
pub use meta::{StyleMeta, StyleMetaRegistry};
pub use resolver::{mapper, PropertyMapper, StyleResolver};
pub use shorthand::{expand_shorthands, is_shorthand, split_border};
pub use units::{Length, Rgb, Unit};
