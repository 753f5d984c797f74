//! Invite access policy

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::invite;

/// Reason an invite cannot be viewed or answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenial {
    Inactive,
    Expired,
}

impl AccessDenial {
    pub fn reason(&self) -> &'static str {
        match self {
            AccessDenial::Inactive => "invite not active",
            AccessDenial::Expired => "invite expired",
        }
    }
}

impl std::fmt::Display for AccessDenial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

impl From<AccessDenial> for AppError {
    fn from(denial: AccessDenial) -> Self {
        AppError::Forbidden(denial.reason().to_string())
    }
}

/// Check whether an invite may be accessed at `now`.
///
/// Expiry is checked before the active flag: an expiration date strictly
/// before `now` is reported as expired whatever `is_active` says, so a
/// deactivated invite past its date still shows the expired page. Only a
/// non-expired invite can be refused as inactive.
pub fn validate_access(invite: &invite::Model, now: DateTime<Utc>) -> Result<(), AccessDenial> {
    if let Some(expiration) = invite.expiration_date {
        if expiration < now {
            return Err(AccessDenial::Expired);
        }
    }

    if !invite.is_active {
        return Err(AccessDenial::Inactive);
    }

    Ok(())
}
