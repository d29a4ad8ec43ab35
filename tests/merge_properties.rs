//! Property tests: merging operation logs converges regardless of order.

use proptest::prelude::*;

use pwdsync::vault::{
    AddOperation, CategoryTree, Credential, CredentialField, EditOperation, Node, Operation,
    OperationLog, Vault,
};

const CATEGORIES: &[&[&str]] = &[&[], &["work"], &["work", "mail"], &["home"]];
const NAMES: &[&str] = &["mail", "bank", "work"];
const FIELDS: &[CredentialField] = &[
    CredentialField::Username,
    CredentialField::Secret,
    CredentialField::Comment,
];

fn arb_operation() -> impl Strategy<Value = Operation> {
    let add = (0i64..6, 0..CATEGORIES.len(), 0..NAMES.len(), "[a-z]{1,4}").prop_map(
        |(time, cat, name, user)| {
            let credential = Credential::new(NAMES[name], user, "pw");
            AddOperation::new(time, CATEGORIES[cat], credential)
                .map(Operation::from)
                .expect("valid add")
        },
    );
    let edit = (
        0i64..6,
        0..CATEGORIES.len(),
        0..NAMES.len(),
        0..FIELDS.len(),
        "[a-z]{0,4}",
    )
        .prop_map(|(time, cat, name, field, value)| {
            EditOperation::new(time, CATEGORIES[cat], NAMES[name], FIELDS[field], value)
                .map(Operation::from)
                .expect("valid edit")
        });
    prop_oneof![add, edit]
}

fn arb_log() -> impl Strategy<Value = OperationLog> {
    prop::collection::vec(arb_operation(), 0..12).prop_map(|ops| ops.into_iter().collect())
}

/// A local change made through the `Vault` API.
#[derive(Debug, Clone)]
enum Change {
    Add { cat: usize, name: usize, user: String },
    Edit { cat: usize, name: usize, field: usize, value: String },
}

fn arb_change() -> impl Strategy<Value = Change> {
    prop_oneof![
        (0..CATEGORIES.len(), 0..NAMES.len(), "[a-z]{1,4}")
            .prop_map(|(cat, name, user)| Change::Add { cat, name, user }),
        (0..CATEGORIES.len(), 0..NAMES.len(), 0..FIELDS.len(), "[a-z]{0,4}")
            .prop_map(|(cat, name, field, value)| Change::Edit { cat, name, field, value }),
    ]
}

/// Apply `changes` to a fresh vault; rejected changes are simply dropped.
fn vault_after(changes: &[Change]) -> Vault {
    let mut vault = Vault::default();
    for change in changes {
        let _ = match change {
            Change::Add { cat, name, user } => vault.add(
                CATEGORIES[*cat],
                Credential::new(NAMES[*name], user.as_str(), "pw"),
            ),
            Change::Edit { cat, name, field, value } => vault.edit(
                CATEGORIES[*cat],
                NAMES[*name],
                FIELDS[*field].as_str(),
                value,
            ),
        };
    }
    vault
}

/// Every entry sits under its own name and nothing else sits anywhere.
fn assert_well_formed(tree: &CategoryTree) {
    for (key, node) in tree.entries() {
        match node {
            Node::Credential(c) => assert_eq!(key, c.name),
            Node::Category(sub) => assert_well_formed(sub),
        }
    }
}

proptest! {
    #[test]
    fn merge_is_commutative(a in arb_log(), b in arb_log()) {
        let ab = a.merge(&b);
        let ba = b.merge(&a);
        prop_assert_eq!(&ab, &ba);
        prop_assert_eq!(ab.replay().tree, ba.replay().tree);
    }

    #[test]
    fn merge_is_associative(a in arb_log(), b in arb_log(), c in arb_log()) {
        let left = a.merge(&b).merge(&c);
        let right = a.merge(&b.merge(&c));
        prop_assert_eq!(left.replay(), right.replay());
        prop_assert_eq!(left, right);
    }

    #[test]
    fn merge_is_idempotent(a in arb_log(), b in arb_log()) {
        let once = a.merge(&b);
        prop_assert_eq!(once.merge(&once), once.clone());
        prop_assert_eq!(once.merge(&b), once);
    }

    #[test]
    fn merged_log_is_sorted_without_duplicates(a in arb_log(), b in arb_log()) {
        let merged = a.merge(&b);
        let ops: Vec<&Operation> = merged.iter().collect();
        prop_assert!(ops.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn replay_always_yields_a_well_formed_tree(a in arb_log(), b in arb_log()) {
        let replay = a.merge(&b).replay();
        assert_well_formed(&replay.tree);
        prop_assert!(replay.skipped.len() <= a.len() + b.len());
    }

    #[test]
    fn vault_tree_matches_replay_of_its_history(
        changes in prop::collection::vec(arb_change(), 0..16)
    ) {
        let mut vault = vault_after(&changes);

        let replay = vault.history().replay();
        prop_assert!(replay.skipped.is_empty());
        prop_assert_eq!(vault.tree(), &replay.tree);

        let before = vault.tree().clone();
        let mut copy = Vault::default();
        copy.merge(&vault);
        prop_assert_eq!(copy.tree(), &before);

        vault.merge(&copy);
        prop_assert_eq!(vault.tree(), &before);
        vault.merge(&Vault::default());
        prop_assert_eq!(vault.tree(), &before);
    }
}
