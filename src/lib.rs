//! querytree: build nested AND/OR where-clauses as an immutable query tree.
//!
//! The [`domain`] layer holds the node model and the copy-on-write tree
//! editor, [`application`] the session owning the current tree, and [`cli`]
//! the terminal front end.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
