use crate::encode::png::flatten;
use crate::export::store::{DesignRecordId, DesignStore, submit};
use crate::foundation::core::Canvas;
use crate::foundation::error::StudioResult;
use crate::render::compositor::{Compositor, RenderReport};
use crate::render::raster::RasterImage;
use crate::scene::design::{DesignPatch, DesignState, EditContext};
use crate::scene::layer::{LayerLimits, TextMeasure};
use crate::session::history::HistoryStack;
use crate::session::ticket::{RenderTicket, TicketBook};

/// A render the host should perform for the snapshot it carries.
#[derive(Clone, Debug)]
pub struct RenderRequest {
    pub ticket: RenderTicket,
    pub state: DesignState,
}

/// Single owner of an editing session: history, the in-progress draft, and the displayed render.
///
/// Discrete edits go through [`DesignSession::edit`] and push one history entry each. Continuous
/// interactions (dragging, sliding) go through the draft calls so that a whole gesture becomes a
/// single undo step.
#[derive(Debug)]
pub struct DesignSession {
    history: HistoryStack,
    draft: Option<DesignState>,
    limits: LayerLimits,
    revision: u64,
    tickets: TicketBook,
    displayed: Option<RasterImage>,
}

impl Default for DesignSession {
    fn default() -> Self {
        Self::new(LayerLimits::default(), None)
    }
}

impl DesignSession {
    /// A fresh session on the default design.
    pub fn new(limits: LayerLimits, history_limit: Option<usize>) -> Self {
        Self::with_initial(DesignState::default(), limits, history_limit)
    }

    /// A session whose first history entry is `initial`.
    pub fn with_initial(
        initial: DesignState,
        limits: LayerLimits,
        history_limit: Option<usize>,
    ) -> Self {
        let history = match history_limit {
            Some(n) => HistoryStack::with_limit(initial, n),
            None => HistoryStack::new(initial),
        };
        Self {
            history,
            draft: None,
            limits,
            revision: 0,
            tickets: TicketBook::new(),
            displayed: None,
        }
    }

    pub fn limits(&self) -> LayerLimits {
        self.limits
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    /// The committed snapshot at the history cursor.
    pub fn current(&self) -> &DesignState {
        self.history.current()
    }

    /// What should be on screen: the open draft if any, otherwise the committed snapshot.
    pub fn display_state(&self) -> &DesignState {
        self.draft.as_ref().unwrap_or_else(|| self.history.current())
    }

    pub fn has_draft(&self) -> bool {
        self.draft.is_some()
    }

    /// Bumped whenever the display state changes; used to discard stale renders.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn cx<'a>(&self, measure: &'a dyn TextMeasure) -> EditContext<'a> {
        EditContext::new(self.limits, measure)
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Apply a discrete edit and commit it as one history entry.
    ///
    /// An open draft is committed first. Edits that change nothing do not grow the history.
    pub fn edit(&mut self, patch: DesignPatch, measure: &dyn TextMeasure) -> &DesignState {
        self.commit_draft();
        let next = self.history.current().apply(patch, &self.cx(measure));
        if &next != self.history.current() {
            self.history.push(next);
            self.touch();
        }
        self.history.current()
    }

    /// Start a draft from the committed snapshot. No-op when one is already open.
    pub fn begin_draft(&mut self) {
        if self.draft.is_none() {
            self.draft = Some(self.history.current().clone());
        }
    }

    /// Apply `patch` to the draft (opening one if needed) without touching history.
    pub fn update_draft(
        &mut self,
        patch: DesignPatch,
        measure: &dyn TextMeasure,
    ) -> &DesignState {
        self.begin_draft();
        let cx = self.cx(measure);
        let base = self.draft.as_ref().unwrap_or_else(|| self.history.current());
        let next = base.apply(patch, &cx);
        self.draft = Some(next);
        self.touch();
        self.display_state()
    }

    /// Push the draft as one history entry. Returns `false` when there was nothing to commit.
    pub fn commit_draft(&mut self) -> bool {
        let Some(draft) = self.draft.take() else {
            return false;
        };
        if &draft == self.history.current() {
            return false;
        }
        self.history.push(draft);
        true
    }

    /// Throw the draft away and show the committed snapshot again.
    pub fn cancel_draft(&mut self) {
        if self.draft.take().is_some() {
            self.touch();
        }
    }

    /// Step back one committed entry, dropping any open draft.
    pub fn undo(&mut self) -> &DesignState {
        self.cancel_draft();
        if self.history.can_undo() {
            self.history.undo();
            self.touch();
        }
        self.history.current()
    }

    /// Step forward one committed entry, dropping any open draft.
    pub fn redo(&mut self) -> &DesignState {
        self.cancel_draft();
        if self.history.can_redo() {
            self.history.redo();
            self.touch();
        }
        self.history.current()
    }

    /// Ask for a render of the current display state, superseding earlier requests.
    pub fn request_render(&mut self) -> RenderRequest {
        RenderRequest {
            ticket: self.tickets.issue(self.revision),
            state: self.display_state().clone(),
        }
    }

    /// Offer a finished render. Stale results are dropped and `false` is returned.
    pub fn complete(&mut self, ticket: RenderTicket, raster: RasterImage) -> bool {
        if !self.tickets.accepts(ticket, self.revision) {
            tracing::debug!(
                ticket = ticket.seq(),
                revision = self.revision,
                "discarding stale render"
            );
            return false;
        }
        self.tickets.retire(ticket);
        self.displayed = Some(raster);
        true
    }

    /// Last accepted render, if any.
    pub fn displayed(&self) -> Option<&RasterImage> {
        self.displayed.as_ref()
    }

    /// Request, perform and complete a render in one go.
    pub fn render_now(
        &mut self,
        compositor: &mut Compositor,
        canvas: Canvas,
    ) -> StudioResult<RenderReport> {
        let req = self.request_render();
        let (raster, report) = compositor.render_with_report(&req.state, canvas)?;
        self.complete(req.ticket, raster);
        Ok(report)
    }

    /// Render the display state, flatten it and hand it to `store`.
    ///
    /// The session is left exactly as it was whether or not the store accepts the design.
    pub fn save(
        &self,
        compositor: &mut Compositor,
        store: &mut dyn DesignStore,
        canvas: Canvas,
    ) -> StudioResult<DesignRecordId> {
        let state = self.display_state();
        let raster = compositor.render(state, canvas)?;
        let png = flatten(&raster)?;
        submit(store, png, state.garment)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/studio.rs"]
mod tests;
