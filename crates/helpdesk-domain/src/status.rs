use serde::{Deserialize, Serialize};

/// Upper bound of the percentage bucket rendered as `Assigned`.
pub const ASSIGNED_MAX_PERCENT: u8 = 33;
/// Upper bound of the percentage bucket rendered as `InProgress`.
pub const IN_PROGRESS_MAX_PERCENT: u8 = 66;

/// The user-facing lifecycle stage of a ticket.
///
/// Derived from the backend's raw status label and the progress percentage;
/// the two fields are updated by different actors and can disagree
/// transiently, so the percentage wins except for the terminal and initial
/// special cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayStatus {
    Open,
    Assigned,
    InProgress,
    Resolved,
    Closed,
}

impl DisplayStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Assigned => "Assigned",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// Maps (raw status, percentage) to a single display stage.
///
/// Priority order: a raw status of `closed` or `rejected` is a terminal
/// override and nothing else produces `Closed`; a raw `open` at 0% stays
/// `Open`; everything else buckets by percentage. A non-`open` raw status
/// at 0% also buckets to `Open`: no work has been recorded yet, whatever
/// the backend labelled the ticket.
pub fn derive_display_status(raw_status: &str, percentage: u8) -> DisplayStatus {
    let normalized = normalize_raw_status(raw_status);
    if normalized == "closed" || normalized == "rejected" {
        return DisplayStatus::Closed;
    }
    if normalized == "open" && percentage == 0 {
        return DisplayStatus::Open;
    }
    bucket_by_percentage(percentage)
}

fn bucket_by_percentage(percentage: u8) -> DisplayStatus {
    if percentage == 0 {
        DisplayStatus::Open
    } else if percentage <= ASSIGNED_MAX_PERCENT {
        DisplayStatus::Assigned
    } else if percentage <= IN_PROGRESS_MAX_PERCENT {
        DisplayStatus::InProgress
    } else {
        DisplayStatus::Resolved
    }
}

fn normalize_raw_status(raw_status: &str) -> String {
    raw_status.trim().to_ascii_lowercase()
}

/// Reconstructs the stages a ticket is presented as having passed through.
///
/// When a ticket closed at a partial percentage the history assumes it moved
/// through every bucket up to that percentage before closing. That is a
/// presentation heuristic, not a recorded fact: the backend does not keep a
/// stage log, so closing at 50% renders as Open → Assigned → In Progress →
/// Closed even if the agent skipped stages.
pub fn stage_history(raw_status: &str, percentage: u8) -> Vec<DisplayStatus> {
    let mut stages = vec![DisplayStatus::Open];
    if percentage > 0 {
        stages.push(DisplayStatus::Assigned);
    }
    if percentage > ASSIGNED_MAX_PERCENT {
        stages.push(DisplayStatus::InProgress);
    }
    if percentage > IN_PROGRESS_MAX_PERCENT {
        stages.push(DisplayStatus::Resolved);
    }
    let normalized = normalize_raw_status(raw_status);
    if normalized == "closed" || normalized == "rejected" {
        stages.push(DisplayStatus::Closed);
    }
    stages
}
