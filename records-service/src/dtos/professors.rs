use crate::models::{CreateProfessor, UpdateProfessor};
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfessorRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub seniority: String,
    #[validate(length(min = 1, message = "aadharNumber must not be empty"))]
    pub aadhar_number: String,
}

impl From<CreateProfessorRequest> for CreateProfessor {
    fn from(req: CreateProfessorRequest) -> Self {
        Self {
            name: req.name,
            seniority: req.seniority,
            aadhar_number: req.aadhar_number,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfessorRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub seniority: Option<String>,
    #[validate(length(min = 1, message = "aadharNumber must not be empty"))]
    pub aadhar_number: Option<String>,
}

impl From<UpdateProfessorRequest> for UpdateProfessor {
    fn from(req: UpdateProfessorRequest) -> Self {
        Self {
            name: req.name,
            seniority: req.seniority,
            aadhar_number: req.aadhar_number,
        }
    }
}

/// Body of `POST /professors/:professor_id/proctorships`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignProctorshipRequest {
    pub student_id: String,
}
