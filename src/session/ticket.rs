/// Token identifying one render request. Later tickets compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTicket(u64);

impl RenderTicket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

/// Issues render tickets and decides which completions are still wanted.
///
/// A completion is accepted only for the most recently issued ticket, and only while the
/// display revision it was issued for is still current (last write wins).
#[derive(Clone, Debug, Default)]
pub struct TicketBook {
    issued: u64,
    latest: Option<(RenderTicket, u64)>,
}

impl TicketBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for the display state at `revision`, superseding all earlier tickets.
    pub fn issue(&mut self, revision: u64) -> RenderTicket {
        self.issued += 1;
        let ticket = RenderTicket(self.issued);
        self.latest = Some((ticket, revision));
        ticket
    }

    /// `true` when `ticket` is the newest one and `revision` has not moved since it was issued.
    pub fn accepts(&self, ticket: RenderTicket, revision: u64) -> bool {
        matches!(self.latest, Some((t, rev)) if t == ticket && rev == revision)
    }

    /// Retire `ticket` once its result has been taken, so it cannot complete twice.
    pub fn retire(&mut self, ticket: RenderTicket) {
        if matches!(self.latest, Some((t, _)) if t == ticket) {
            self.latest = None;
        }
    }

    /// Most recently issued ticket, if any is outstanding.
    pub fn outstanding(&self) -> Option<RenderTicket> {
        self.latest.map(|(t, _)| t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/ticket.rs"]
mod tests;
