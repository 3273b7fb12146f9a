//! Professor model for records-service.

use super::Student;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Professor record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: Uuid,
    pub name: String,
    pub seniority: String,
    pub aadhar_number: String,
}

/// Professor with the students they proctor, under the `student` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorWithStudents {
    #[serde(flatten)]
    pub professor: Professor,
    pub student: Vec<Student>,
}

/// Input for creating a professor.
#[derive(Debug, Clone)]
pub struct CreateProfessor {
    pub name: String,
    pub seniority: String,
    pub aadhar_number: String,
}

/// Input for updating a professor.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfessor {
    pub name: Option<String>,
    pub seniority: Option<String>,
    pub aadhar_number: Option<String>,
}

impl Professor {
    pub fn apply(&mut self, update: &UpdateProfessor) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(seniority) = &update.seniority {
            self.seniority = seniority.clone();
        }
        if let Some(aadhar_number) = &update.aadhar_number {
            self.aadhar_number = aadhar_number.clone();
        }
    }
}
