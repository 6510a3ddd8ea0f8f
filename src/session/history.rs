use crate::scene::design::DesignState;

/// Linear undo/redo log of design snapshots.
///
/// `entries[cursor]` is always the displayed state and the log is never empty. Pushing after an
/// undo discards the redo tail for good; there is no branching.
#[derive(Clone, Debug)]
pub struct HistoryStack {
    entries: Vec<DesignState>,
    cursor: usize,
    limit: Option<usize>,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DesignState::default())
    }
}

impl HistoryStack {
    /// A history holding only `initial`.
    pub fn new(initial: DesignState) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: None,
        }
    }

    /// A history that keeps at most `limit` entries (minimum 1), evicting the oldest.
    pub fn with_limit(initial: DesignState, limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new(initial)
        }
    }

    /// Commit a new snapshot after the cursor, dropping any redo entries.
    pub fn push(&mut self, state: DesignState) -> &DesignState {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(state);
        if let Some(limit) = self.limit {
            let excess = self.entries.len().saturating_sub(limit);
            if excess > 0 {
                self.entries.drain(..excess);
            }
        }
        self.cursor = self.entries.len() - 1;
        &self.entries[self.cursor]
    }

    /// Step back one entry if possible and return the current state.
    pub fn undo(&mut self) -> &DesignState {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        &self.entries[self.cursor]
    }

    /// Step forward one entry if possible and return the current state.
    pub fn redo(&mut self) -> &DesignState {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
        }
        &self.entries[self.cursor]
    }

    pub fn current(&self) -> &DesignState {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DesignState] {
        &self.entries
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/history.rs"]
mod tests;
