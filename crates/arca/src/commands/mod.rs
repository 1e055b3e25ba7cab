//! CLI command implementations

pub mod backup;
pub mod delete;
pub mod list;
pub mod prune;
pub mod reconcile;
pub mod restore;
pub mod settings;
pub mod show;
pub mod tick;
