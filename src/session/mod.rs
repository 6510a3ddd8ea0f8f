//! Editing session state: history, drafts and render bookkeeping.

/// Linear undo/redo log.
pub mod history;
/// The session owner.
pub mod studio;
/// Last-write-wins render tickets.
pub mod ticket;
