//! Student model for records-service.

use super::Professor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub date_of_birth: DateTime<Utc>,
    pub aadhar_number: String,
    pub proctor_id: Option<Uuid>,
}

/// Student with the supervising professor embedded (`null` when unassigned).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentWithProctor {
    #[serde(flatten)]
    pub student: Student,
    pub proctor: Option<Professor>,
}

/// Input for creating a student.
#[derive(Debug, Clone)]
pub struct CreateStudent {
    pub name: String,
    pub date_of_birth: DateTime<Utc>,
    pub aadhar_number: String,
    pub proctor_id: Option<Uuid>,
}

/// Input for updating a student. `None` leaves a column unchanged;
/// `proctor_id: Some(None)` clears the proctor.
#[derive(Debug, Clone, Default)]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub aadhar_number: Option<String>,
    pub proctor_id: Option<Option<Uuid>>,
}

impl Student {
    /// Apply a partial update in place.
    pub fn apply(&mut self, update: &UpdateStudent) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(date_of_birth) = update.date_of_birth {
            self.date_of_birth = date_of_birth;
        }
        if let Some(aadhar_number) = &update.aadhar_number {
            self.aadhar_number = aadhar_number.clone();
        }
        if let Some(proctor_id) = update.proctor_id {
            self.proctor_id = proctor_id;
        }
    }
}
