//! Editing session
//!
//! Owns the single "current tree" slot. Each command is handed to the tree
//! editor and the returned root replaces the held one. Commands that name an
//! unknown group, or a rule or child group their group does not hold, leave
//! the slot untouched.

use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::config::{Seed, Settings};
use crate::domain::{
    add_condition_with_id, add_group_with_id, blank_tree, initial_tree, remove_condition,
    remove_group, set_combinator, update_condition, Combinator, ConditionPatch, FieldCatalog,
    Group, NodeId,
};

/// A user intent, addressed by node ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the combinator of a group
    Toggle { group: String, combinator: Combinator },
    /// Append a default condition to a group
    AddRule { group: String },
    /// Append a default nested group to a group
    AddGroup { group: String },
    /// Patch a condition held directly by `group`
    EditRule {
        group: String,
        rule: String,
        patch: ConditionPatch,
    },
    /// Remove a condition held directly by `group`
    RemoveRule { group: String, rule: String },
    /// Remove the nested group `group` from `parent`
    RemoveGroup { parent: String, group: String },
}

impl Command {
    /// Id of the group the editor will rebuild.
    pub fn target(&self) -> &str {
        match self {
            Command::Toggle { group, .. }
            | Command::AddRule { group }
            | Command::AddGroup { group }
            | Command::EditRule { group, .. }
            | Command::RemoveRule { group, .. } => group,
            Command::RemoveGroup { parent, .. } => parent,
        }
    }
}

/// Result of dispatching a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The target group was found and the tree rebuilt; `created` names the
    /// node added by `AddRule`/`AddGroup`.
    Applied { created: Option<NodeId> },
    /// Target group or named child not found; the tree is unchanged.
    Ignored,
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied { .. })
    }
}

pub struct QuerySession {
    catalog: FieldCatalog,
    root: Arc<Group>,
    applied: usize,
}

impl QuerySession {
    pub fn new(catalog: FieldCatalog, root: Arc<Group>) -> Self {
        Self {
            catalog,
            root,
            applied: 0,
        }
    }

    /// Session seeded according to the settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let root = match settings.seed {
            Seed::Sample => initial_tree(),
            Seed::Blank => blank_tree(&settings.fields),
        };
        Self::new(settings.fields.clone(), root)
    }

    pub fn root(&self) -> &Arc<Group> {
        &self.root
    }

    pub fn catalog(&self) -> &FieldCatalog {
        &self.catalog
    }

    /// Number of commands that changed the tree.
    pub fn applied(&self) -> usize {
        self.applied
    }

    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let root = &self.root;
        let (next, created) = match &command {
            Command::Toggle { group, combinator } => {
                (set_combinator(root, group, *combinator), None)
            }
            Command::AddRule { group } => add_condition_with_id(root, group, &self.catalog),
            Command::AddGroup { group } => add_group_with_id(root, group, &self.catalog),
            Command::EditRule { group, rule, patch } => {
                (update_condition(root, group, rule, patch), None)
            }
            Command::RemoveRule { group, rule } => (remove_condition(root, group, rule), None),
            Command::RemoveGroup { parent, group } => (remove_group(root, parent, group), None),
        };

        if Arc::ptr_eq(&next, &self.root) {
            trace!("nothing matched under group {}, command ignored", command.target());
            return Outcome::Ignored;
        }

        self.root = next;
        self.applied += 1;
        debug!("applied edit #{} on group {}", self.applied, command.target());
        Outcome::Applied { created }
    }

    /// Expand an id prefix to the full id of the single node it matches.
    ///
    /// Exact ids, unknown prefixes and ambiguous prefixes come back as given;
    /// a command addressed with them is ignored by the editor.
    pub fn resolve_id(&self, input: &str) -> String {
        let ids = self.root.ids();
        if ids.iter().any(|id| id.as_str() == input) {
            return input.to_string();
        }
        match ids
            .into_iter()
            .filter(|id| id.as_str().starts_with(input))
            .exactly_one()
        {
            Ok(id) => id.to_string(),
            Err(_) => input.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_id_expands_unique_prefix() {
        let session = QuerySession::new(FieldCatalog::default(), initial_tree());
        let full = session.root().id.to_string();

        assert_eq!(session.resolve_id(&full[..12]), full);
        assert_eq!(session.resolve_id("not-an-id"), "not-an-id");
    }

    #[test]
    fn empty_prefix_is_ambiguous() {
        let session = QuerySession::new(FieldCatalog::default(), initial_tree());

        assert_eq!(session.resolve_id(""), "");
    }
}
