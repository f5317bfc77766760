pub mod actions;
pub mod completions;
pub mod login;
pub mod users;
