use crate::models::{MembershipDates, UpdateMembership};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_window"))]
pub struct CreateMembershipRequest {
    #[serde(deserialize_with = "super::dates::deserialize")]
    pub issue_date: DateTime<Utc>,
    #[serde(deserialize_with = "super::dates::deserialize")]
    pub expiry_date: DateTime<Utc>,
}

fn validate_window(req: &CreateMembershipRequest) -> Result<(), ValidationError> {
    if req.expiry_date < req.issue_date {
        let mut err = ValidationError::new("expiry_before_issue");
        err.message = Some("expiryDate must not precede issueDate".into());
        return Err(err);
    }
    Ok(())
}

impl From<CreateMembershipRequest> for MembershipDates {
    fn from(req: CreateMembershipRequest) -> Self {
        Self {
            issue_date: req.issue_date,
            expiry_date: req.expiry_date,
        }
    }
}

/// Either date may be omitted; the merged window is checked by the handler.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMembershipRequest {
    #[serde(default, deserialize_with = "super::dates::deserialize_option")]
    pub issue_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "super::dates::deserialize_option")]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl From<UpdateMembershipRequest> for UpdateMembership {
    fn from(req: UpdateMembershipRequest) -> Self {
        Self {
            issue_date: req.issue_date,
            expiry_date: req.expiry_date,
        }
    }
}
