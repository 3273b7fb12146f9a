//! Library membership model for records-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Library membership, one per student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LibraryMembership {
    pub id: Uuid,
    pub student_id: Uuid,
    pub issue_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

/// Validity window used both to create and to replace a membership.
#[derive(Debug, Clone, Copy)]
pub struct MembershipDates {
    pub issue_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

/// Partial update of a membership's validity window.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateMembership {
    pub issue_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl LibraryMembership {
    pub fn apply(&mut self, update: &UpdateMembership) {
        if let Some(issue_date) = update.issue_date {
            self.issue_date = issue_date;
        }
        if let Some(expiry_date) = update.expiry_date {
            self.expiry_date = expiry_date;
        }
    }

    /// Whether the window is well-formed (expiry not before issue).
    pub fn is_valid_window(&self) -> bool {
        self.expiry_date >= self.issue_date
    }
}
