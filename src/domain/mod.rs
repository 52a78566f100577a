//! Domain layer: query tree model and editor
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod catalog;
pub mod editor;
pub mod error;
pub mod node;
pub mod sample;

pub use catalog::{Combinator, FieldCatalog, FieldDef, FieldKind, Operator, DEFAULT_PLACEHOLDER};
pub use editor::{
    add_condition, add_condition_with_id, add_group, add_group_with_id, apply_to_group,
    remove_condition, remove_group, set_combinator, update_condition,
};
pub use error::DomainError;
pub use node::{
    make_condition, make_group, Condition, ConditionPatch, Group, Node, NodeId, NodeRef, Visit,
    Walk,
};
pub use sample::{blank_tree, initial_tree};
