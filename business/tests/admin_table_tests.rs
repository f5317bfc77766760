//! Selection semantics of the admin table state machine.

use roster_business::{AdminTableState, UserRow, UserStatus};
use ustr::Ustr;

fn row(id: &str) -> UserRow {
    UserRow {
        id: Ustr::from(id),
        name: Some(format!("User {id}")),
        email: format!("{id}@example.com"),
        last_login: None,
        status: UserStatus::Active,
    }
}

fn table_with(ids: &[&str]) -> AdminTableState {
    let mut table = AdminTableState::new();
    table.loaded(ids.iter().map(|id| row(id)).collect());
    table
}

#[test]
fn select_all_then_toggle_again_round_trips_to_empty() {
    let mut table = table_with(&["u1", "u2", "u3"]);

    table.toggle_select_all();
    assert!(table.all_selected());
    assert_eq!(table.selection().len(), 3);

    table.toggle_select_all();
    assert!(table.selection().is_empty());
    assert!(!table.all_selected());
}

#[test]
fn select_all_from_partial_selection_selects_everything() {
    let mut table = table_with(&["u1", "u2", "u3"]);
    table.toggle_row(Ustr::from("u2"));
    assert!(table.some_selected());

    table.toggle_select_all();
    assert!(table.all_selected());
    assert!(!table.some_selected());
}

#[test]
fn select_all_on_an_empty_table_stays_empty() {
    let mut table = table_with(&[]);
    table.toggle_select_all();
    assert!(table.selection().is_empty());
    assert!(!table.all_selected());
}

#[test]
fn toggle_order_is_preserved() {
    let mut table = table_with(&["u1", "u2", "u3"]);
    table.toggle_row(Ustr::from("u3"));
    table.toggle_row(Ustr::from("u1"));

    assert_eq!(table.selection(), &[Ustr::from("u3"), Ustr::from("u1")]);
    assert_eq!(table.selected_ids(), vec![Ustr::from("u3"), Ustr::from("u1")]);
}

#[test]
fn clear_selection_resets_after_an_action() {
    let mut table = table_with(&["u1", "u2"]);
    table.toggle_select_all();
    assert!(table.all_selected());

    table.clear_selection();
    assert!(table.selection().is_empty());
}

#[test]
fn single_row_table_all_and_some_are_exclusive() {
    let mut table = table_with(&["u1"]);
    assert!(!table.all_selected());
    assert!(!table.some_selected());

    table.toggle_row(Ustr::from("u1"));
    assert!(table.all_selected());
    assert!(!table.some_selected());
}
