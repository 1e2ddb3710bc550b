//! Ticket fetching and display projection.

pub mod error;
pub mod projection;
pub mod service;

pub use error::TicketError;
pub use projection::{project_ticket, TicketProjection};
pub use service::{TicketBoard, TicketFeed, TicketService, TicketStatistics};
