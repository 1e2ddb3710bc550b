pub mod error;
pub mod license;
pub mod mobile;
pub mod session;
pub mod status;
pub mod ticket;

pub use error::ValidationError;
pub use license::{LicenseId, LicenseRecord, LookupSource, LICENSE_DIGITS};
pub use mobile::{MobileNumber, MOBILE_DIGITS};
pub use session::ClientSession;
pub use status::{
    derive_display_status, stage_history, DisplayStatus, ASSIGNED_MAX_PERCENT,
    IN_PROGRESS_MAX_PERCENT,
};
pub use ticket::{Ticket, TicketId};
