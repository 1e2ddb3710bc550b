use std::sync::Arc;

use async_trait::async_trait;
use helpdesk_backend::wire::{TicketListData, WireStatistics, WireTicket};
use helpdesk_backend::{BackendClient, BackendError};
use helpdesk_domain::{MobileNumber, Ticket, TicketId};
use tracing::debug;

use crate::error::TicketError;
use crate::projection::{project_ticket, TicketProjection};

/// Seam over the ticket endpoints, scripted in tests.
#[async_trait]
pub trait TicketFeed: Send + Sync {
    async fn list(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
    ) -> Result<TicketListData, BackendError>;

    async fn detail(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
        ticket_id: &str,
    ) -> Result<WireTicket, BackendError>;
}

#[async_trait]
impl TicketFeed for BackendClient {
    async fn list(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
    ) -> Result<TicketListData, BackendError> {
        self.list_tickets(client_id, mobile).await
    }

    async fn detail(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
        ticket_id: &str,
    ) -> Result<WireTicket, BackendError> {
        self.ticket_detail(client_id, mobile, ticket_id).await
    }
}

/// Per-stage totals shown above the ticket list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketStatistics {
    pub total: u32,
    pub open: u32,
    pub assigned: u32,
    pub in_progress: u32,
    pub resolved: u32,
    pub closed: u32,
}

impl From<WireStatistics> for TicketStatistics {
    fn from(wire: WireStatistics) -> Self {
        Self {
            total: wire.total,
            open: wire.open,
            assigned: wire.assigned,
            in_progress: wire.in_progress,
            resolved: wire.resolved,
            closed: wire.closed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketBoard {
    pub tickets: Vec<TicketProjection>,
    pub statistics: Option<TicketStatistics>,
}

pub struct TicketService {
    feed: Arc<dyn TicketFeed>,
}

impl TicketService {
    pub fn new(feed: Arc<dyn TicketFeed>) -> Self {
        Self { feed }
    }

    pub async fn board(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
    ) -> Result<TicketBoard, TicketError> {
        let data = self.feed.list(client_id, mobile).await?;
        debug!(count = data.tickets.len(), "fetched ticket list");
        Ok(TicketBoard {
            tickets: data
                .tickets
                .into_iter()
                .map(|wire| project_ticket(ticket_from_wire(wire)))
                .collect(),
            statistics: data.statistics.map(TicketStatistics::from),
        })
    }

    pub async fn ticket(
        &self,
        client_id: &str,
        mobile: &MobileNumber,
        ticket_id: &TicketId,
    ) -> Result<TicketProjection, TicketError> {
        let wire = self
            .feed
            .detail(client_id, mobile, ticket_id.as_str())
            .await?;
        Ok(project_ticket(ticket_from_wire(wire)))
    }
}

/// The tracker occasionally reports over 100; clamp rather than reject so
/// one bad row never hides the whole list.
fn ticket_from_wire(wire: WireTicket) -> Ticket {
    Ticket {
        id: TicketId::new(wire.id),
        title: wire.title,
        description: wire.description,
        raw_status: wire.status,
        progress_percent: wire.progress_percent.min(100) as u8,
        created_at: wire.created_at,
        updated_at: wire.updated_at,
        attachment: wire.attachment,
    }
}
