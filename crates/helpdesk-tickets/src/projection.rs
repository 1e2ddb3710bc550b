use helpdesk_domain::{derive_display_status, stage_history, DisplayStatus, Ticket};

/// Everything a ticket row or detail screen needs, computed fresh from the
/// ticket on every call rather than cached. This is the single place the
/// status buckets are applied; no rendering call site re-derives them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketProjection {
    pub ticket: Ticket,
    pub display_status: DisplayStatus,
    /// Only 100% fills the progress bar completely; 67-99% render the same
    /// `Resolved` label with a partial bar.
    pub fully_resolved: bool,
    pub stage_history: Vec<DisplayStatus>,
}

pub fn project_ticket(ticket: Ticket) -> TicketProjection {
    let display_status = derive_display_status(&ticket.raw_status, ticket.progress_percent);
    let stage_history = stage_history(&ticket.raw_status, ticket.progress_percent);
    TicketProjection {
        display_status,
        fully_resolved: ticket.progress_percent == 100,
        stage_history,
        ticket,
    }
}
