//! Tree rendering for the terminal (termtree) and as JSON.

use colored::Colorize;
use termtree::Tree;

use crate::cli::error::{CliError, CliResult};
use crate::domain::{Condition, FieldCatalog, Group, Node};

/// Conversion to a `termtree` display tree.
///
/// Unlike the editor, rendering recurses once per group level, and so does
/// dropping the resulting `Tree`. Trees built through the shell stay far
/// below the thread's stack limit; a chain tens of thousands of groups deep
/// can only be edited and compared, not rendered.
pub trait TreeDisplay {
    fn to_display_tree(&self, catalog: &FieldCatalog) -> Tree<String>;
}

impl TreeDisplay for Group {
    fn to_display_tree(&self, catalog: &FieldCatalog) -> Tree<String> {
        let leaves: Vec<_> = self
            .children
            .iter()
            .map(|child| match child {
                Node::Condition(c) => Tree::new(condition_label(c, catalog)),
                Node::Group(g) => g.to_display_tree(catalog),
            })
            .collect();
        Tree::new(group_label(self)).with_leaves(leaves)
    }
}

fn group_label(group: &Group) -> String {
    let mut label = format!(
        "{} {}",
        group.combinator.as_str().magenta().bold(),
        format!("[{}]", group.id.short()).dimmed()
    );
    if group.children.is_empty() {
        label.push_str(&format!(" {}", "(empty)".yellow()));
    }
    label
}

fn condition_label(condition: &Condition, catalog: &FieldCatalog) -> String {
    let field = catalog
        .get(&condition.field)
        .map(|f| f.label.as_str())
        .unwrap_or(condition.field.as_str());
    let value = if condition.value.is_empty() {
        format!("<{}>", catalog.resolve(&condition.field).placeholder_or_default())
            .dimmed()
            .to_string()
    } else {
        format!("\"{}\"", condition.value).green().to_string()
    };
    format!(
        "{} {} {} {}",
        field.bold(),
        condition.operator.label().cyan(),
        value,
        format!("[{}]", condition.id.short()).dimmed()
    )
}

pub fn render_tree(root: &Group, catalog: &FieldCatalog) -> String {
    root.to_display_tree(catalog).to_string()
}

/// Pretty JSON of the tree. `serde_json` recurses per level, with the same
/// depth limit as [`TreeDisplay`].
pub fn render_json(root: &Group) -> CliResult<String> {
    serde_json::to_string_pretty(root).map_err(|e| CliError::Usage(format!("render json: {}", e)))
}
