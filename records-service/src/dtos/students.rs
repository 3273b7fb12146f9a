use crate::models::{CreateStudent, UpdateStudent};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(deserialize_with = "super::dates::deserialize")]
    pub date_of_birth: DateTime<Utc>,
    #[validate(length(min = 1, message = "aadharNumber must not be empty"))]
    pub aadhar_number: String,
    #[serde(default)]
    pub proctor_id: Option<String>,
}

/// `proctorId` is not a UUID, so it cannot name an existing professor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProctor;

fn parse_proctor(raw: &str) -> Result<Uuid, UnknownProctor> {
    Uuid::parse_str(raw).map_err(|_| UnknownProctor)
}

impl TryFrom<CreateStudentRequest> for CreateStudent {
    type Error = UnknownProctor;

    fn try_from(req: CreateStudentRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            date_of_birth: req.date_of_birth,
            aadhar_number: req.aadhar_number,
            proctor_id: req.proctor_id.as_deref().map(parse_proctor).transpose()?,
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::dates::deserialize_option")]
    pub date_of_birth: Option<DateTime<Utc>>,
    #[validate(length(min = 1, message = "aadharNumber must not be empty"))]
    pub aadhar_number: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    pub proctor_id: Option<Option<String>>,
}

impl TryFrom<UpdateStudentRequest> for UpdateStudent {
    type Error = UnknownProctor;

    fn try_from(req: UpdateStudentRequest) -> Result<Self, Self::Error> {
        let proctor_id = match req.proctor_id {
            Some(Some(raw)) => Some(Some(parse_proctor(&raw)?)),
            Some(None) => Some(None),
            None => None,
        };

        Ok(Self {
            name: req.name,
            date_of_birth: req.date_of_birth,
            aadhar_number: req.aadhar_number,
            proctor_id,
        })
    }
}
