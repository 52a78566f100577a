//! Seed trees for a fresh session.

use std::sync::Arc;

use crate::domain::catalog::{Combinator, FieldCatalog, Operator};
use crate::domain::node::{make_group, Condition, Group};

/// Example tree showing two levels of nesting:
///
/// ```text
/// AND
/// ├── AND
/// │   └── employeeId greaterThan "1,001"
/// └── AND
///     ├── title contains "Sales Manager"
///     └── city contains "Kirkland"
/// ```
pub fn initial_tree() -> Arc<Group> {
    let employees = Group::new(
        Combinator::And,
        vec![Condition::new("employeeId", Operator::GreaterThan, "1,001").into()],
    );
    let sales_in_kirkland = Group::new(
        Combinator::And,
        vec![
            Condition::new("title", Operator::Contains, "Sales Manager").into(),
            Condition::new("city", Operator::Contains, "Kirkland").into(),
        ],
    );
    Arc::new(Group::new(
        Combinator::And,
        vec![employees.into(), sales_in_kirkland.into()],
    ))
}

/// Root group with a single default condition.
pub fn blank_tree(catalog: &FieldCatalog) -> Arc<Group> {
    Arc::new(make_group(catalog))
}
