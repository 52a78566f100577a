//! Tests for the node model: constructors, catalogs and read-only queries

use std::collections::HashSet;

use rstest::rstest;

use querytree::domain::{
    blank_tree, initial_tree, make_condition, make_group, Combinator, DomainError, FieldCatalog,
    FieldDef, FieldKind, Node, NodeRef, Operator, DEFAULT_PLACEHOLDER,
};

// ============================================================
// Constructors
// ============================================================

#[test]
fn given_catalog_when_making_condition_then_uses_first_entries() {
    let catalog = FieldCatalog::default();

    let condition = make_condition(&catalog);

    assert_eq!(condition.field, "employeeId");
    assert_eq!(condition.operator, Operator::Contains);
    assert!(condition.value.is_empty());
}

#[test]
fn given_custom_catalog_when_making_condition_then_uses_its_first_field() {
    let catalog = FieldCatalog::new(vec![
        FieldDef::new("sku", "SKU", FieldKind::Text, None),
        FieldDef::new("price", "Price", FieldKind::Number, Some("9.99")),
    ])
    .unwrap();

    assert_eq!(make_condition(&catalog).field, "sku");
}

#[test]
fn given_catalog_when_making_group_then_and_with_one_condition() {
    let catalog = FieldCatalog::default();

    let group = make_group(&catalog);

    assert_eq!(group.combinator, Combinator::And);
    assert_eq!(group.children.len(), 1);
    assert!(matches!(group.children[0], Node::Condition(_)));
    assert_ne!(group.id, *group.children[0].id());
}

#[test]
fn given_many_constructions_then_ids_are_fresh() {
    let catalog = FieldCatalog::default();

    let ids: HashSet<_> = (0..500).map(|_| make_condition(&catalog).id).collect();

    assert_eq!(ids.len(), 500);
}

// ============================================================
// Seed trees
// ============================================================

#[test]
fn given_initial_tree_then_has_two_nested_groups() {
    let root = initial_tree();

    assert_eq!(root.combinator, Combinator::And);
    assert_eq!(root.children.len(), 2);
    assert!(root.children.iter().all(Node::is_group));
    assert_eq!(root.depth(), 2);
    assert_eq!(root.condition_count(), 3);

    let first = root.children[0].as_group().unwrap();
    let rule = first.children[0].as_condition().unwrap();
    assert_eq!(rule.field, "employeeId");
    assert_eq!(rule.operator, Operator::GreaterThan);
    assert_eq!(rule.value, "1,001");
}

#[test]
fn given_initial_tree_then_ids_are_pairwise_distinct() {
    let root = initial_tree();

    let ids = root.ids();
    let unique: HashSet<_> = ids.iter().collect();

    assert_eq!(ids.len(), 6);
    assert_eq!(unique.len(), 6);
}

#[test]
fn given_blank_tree_then_root_holds_one_default_condition() {
    let root = blank_tree(&FieldCatalog::default());

    assert_eq!(root.depth(), 1);
    assert_eq!(root.condition_count(), 1);
}

// ============================================================
// Queries
// ============================================================

#[test]
fn given_tree_when_looking_up_ids_then_finds_by_kind() {
    let root = initial_tree();
    let group = root.children[1].as_group().unwrap();
    let condition = group.children[0].as_condition().unwrap();

    assert_eq!(root.find_group(group.id.as_str()).unwrap().id, group.id);
    assert!(root.find_group(condition.id.as_str()).is_none());
    assert_eq!(
        root.find_condition(condition.id.as_str()).unwrap().value,
        "Sales Manager"
    );
    assert!(root.find_condition(group.id.as_str()).is_none());
    assert!(!root.contains("nonexistent"));
}

#[test]
fn given_tree_when_asking_parent_then_returns_direct_holder() {
    let root = initial_tree();
    let group = root.children[1].as_group().unwrap();
    let condition = group.children[1].as_condition().unwrap();

    assert_eq!(root.parent_of(condition.id.as_str()).unwrap().id, group.id);
    assert_eq!(root.parent_of(group.id.as_str()).unwrap().id, root.id);
    assert!(root.parent_of(root.id.as_str()).is_none());
}

#[test]
fn given_tree_when_walking_then_depths_follow_nesting() {
    let root = initial_tree();

    let depths: Vec<(usize, bool)> = root
        .walk()
        .map(|v| (v.depth, matches!(v.node, NodeRef::Group(_))))
        .collect();

    assert_eq!(
        depths,
        vec![
            (0, true),
            (1, true),
            (2, false),
            (1, true),
            (2, false),
            (2, false)
        ]
    );
}

// ============================================================
// Catalogs
// ============================================================

#[test]
fn given_empty_field_list_when_building_catalog_then_errors() {
    assert_eq!(FieldCatalog::new(Vec::new()), Err(DomainError::EmptyCatalog));
}

#[test]
fn given_field_without_placeholder_then_default_placeholder() {
    let field = FieldDef::new("sku", "SKU", FieldKind::Text, None);

    assert_eq!(field.placeholder_or_default(), DEFAULT_PLACEHOLDER);
    assert_eq!(
        FieldCatalog::default().resolve("city").placeholder_or_default(),
        "Kirkland"
    );
}

#[rstest]
#[case("contains", Operator::Contains)]
#[case("equals", Operator::Equals)]
#[case("greaterThan", Operator::GreaterThan)]
#[case("lessThan", Operator::LessThan)]
#[case("startsWith", Operator::StartsWith)]
fn given_operator_key_when_parsing_then_round_trips(#[case] key: &str, #[case] expected: Operator) {
    let parsed: Operator = key.parse().unwrap();

    assert_eq!(parsed, expected);
    assert_eq!(parsed.key(), key);
}

#[test]
fn given_operator_catalog_then_order_and_labels_are_fixed() {
    let labels: Vec<_> = Operator::ALL.iter().map(|op| op.label()).collect();

    assert_eq!(
        labels,
        vec!["Contains", "Equals", "Greater Than", "Less Than", "Starts With"]
    );
    assert_eq!(Operator::default(), Operator::Contains);
}

#[rstest]
#[case("AND", Combinator::And)]
#[case("or", Combinator::Or)]
fn given_combinator_text_when_parsing_then_accepts(#[case] text: &str, #[case] expected: Combinator) {
    assert_eq!(text.parse::<Combinator>(), Ok(expected));
    assert_eq!(expected.toggled().toggled(), expected);
}

#[test]
fn given_unknown_combinator_when_parsing_then_rejected() {
    assert_eq!(
        "NAND".parse::<Combinator>(),
        Err(DomainError::UnknownCombinator("NAND".into()))
    );
}

#[test]
fn given_combinator_catalog_then_every_entry_parses_back() {
    for combinator in Combinator::ALL {
        assert_eq!(combinator.as_str().parse::<Combinator>(), Ok(combinator));
    }
    assert_eq!(Combinator::ALL[0], Combinator::default());
}
