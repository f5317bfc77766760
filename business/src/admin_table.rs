//! State for the admin users table view.
//!
//! This lives in the business crate so view code can remain dumb: the view
//! reads rows/selection and renders, dispatches commands, and calls the
//! mutation methods here. Selection is pure local state; it never
//! persists beyond the process.

use std::any::Any;

use roster_states::{State, state_assign_impl};
use ustr::Ustr;

use crate::directory::UserRow;

/// Loading phase of the table. Every action re-enters `Loading` before
/// the follow-up directory read lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TablePhase {
    #[default]
    Loading,
    Loaded,
}

/// State for the admin users table.
#[derive(Debug, Clone, Default)]
pub struct AdminTableState {
    phase: TablePhase,
    rows: Vec<UserRow>,
    /// Selected ids in toggle order.
    selection: Vec<Ustr>,
}

impl AdminTableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TablePhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == TablePhase::Loading
    }

    /// Enter the loading phase ahead of a directory read.
    pub fn begin_loading(&mut self) {
        self.phase = TablePhase::Loading;
    }

    /// Replace the rows wholesale from a finished directory read.
    ///
    /// Selection is left untouched; callers clear it after successful
    /// actions, not on refresh.
    pub fn loaded(&mut self, rows: Vec<UserRow>) {
        self.rows = rows;
        self.phase = TablePhase::Loaded;
    }

    pub fn rows(&self) -> &[UserRow] {
        &self.rows
    }

    pub fn selection(&self) -> &[Ustr] {
        &self.selection
    }

    /// Owned copy of the selection, for handing to [`crate::BulkActionInput`].
    pub fn selected_ids(&self) -> Vec<Ustr> {
        self.selection.clone()
    }

    pub fn is_selected(&self, id: Ustr) -> bool {
        self.selection.contains(&id)
    }

    /// Toggle one row in or out of the selection.
    pub fn toggle_row(&mut self, id: Ustr) {
        if let Some(position) = self.selection.iter().position(|selected| *selected == id) {
            self.selection.remove(position);
        } else {
            self.selection.push(id);
        }
    }

    /// True when every row is selected (and there is at least one row).
    pub fn all_selected(&self) -> bool {
        !self.rows.is_empty() && self.selection.len() == self.rows.len()
    }

    /// True when some but not all rows are selected.
    pub fn some_selected(&self) -> bool {
        !self.selection.is_empty() && self.selection.len() < self.rows.len()
    }

    /// Header checkbox behavior: full selection when anything is missing,
    /// empty selection when everything is already selected.
    pub fn toggle_select_all(&mut self) {
        if self.all_selected() {
            self.selection.clear();
        } else {
            self.selection = self.rows.iter().map(|row| row.id).collect();
        }
    }

    /// Reset the selection; called after every successful action.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }
}

impl State for AdminTableState {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn snapshot(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }

    fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
        state_assign_impl(self, new_self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::UserStatus;

    fn row(id: &str) -> UserRow {
        UserRow {
            id: Ustr::from(id),
            name: None,
            email: format!("{id}@example.com"),
            last_login: None,
            status: UserStatus::Active,
        }
    }

    #[test]
    fn starts_loading_and_empty() {
        let state = AdminTableState::new();
        assert!(state.is_loading());
        assert!(state.rows().is_empty());
        assert!(state.selection().is_empty());
    }

    #[test]
    fn loaded_enters_loaded_phase() {
        let mut state = AdminTableState::new();
        state.loaded(vec![row("u1")]);
        assert_eq!(state.phase(), TablePhase::Loaded);

        state.begin_loading();
        assert!(state.is_loading());
    }

    #[test]
    fn toggle_row_adds_then_removes() {
        let mut state = AdminTableState::new();
        state.loaded(vec![row("u1"), row("u2")]);

        state.toggle_row(Ustr::from("u1"));
        assert!(state.is_selected(Ustr::from("u1")));
        assert!(state.some_selected());

        state.toggle_row(Ustr::from("u1"));
        assert!(!state.is_selected(Ustr::from("u1")));
        assert!(state.selection().is_empty());
    }

    #[test]
    fn refresh_preserves_selection() {
        let mut state = AdminTableState::new();
        state.loaded(vec![row("u1"), row("u2")]);
        state.toggle_row(Ustr::from("u2"));

        state.begin_loading();
        state.loaded(vec![row("u1"), row("u2")]);
        assert!(state.is_selected(Ustr::from("u2")));
    }
}
