use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::BookingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Master,
    Admin,
}

impl FromStr for Role {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "client" => Ok(Role::User),
            "master" => Ok(Role::Master),
            "admin" => Ok(Role::Admin),
            other => Err(BookingError::Authentication(format!(
                "Unknown role: {}",
                other
            ))),
        }
    }
}

/// Authenticated identity as supplied by the auth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn scope(&self) -> CallerScope {
        match self.role {
            Role::User => CallerScope::Client(self.id),
            Role::Master => CallerScope::Master(self.id),
            Role::Admin => CallerScope::Admin,
        }
    }
}

/// Whose calendar an operation may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerScope {
    Client(Uuid),
    Master(Uuid),
    Admin,
}

impl CallerScope {
    pub fn manages(&self, master_id: Uuid) -> bool {
        match self {
            CallerScope::Admin => true,
            CallerScope::Master(id) => *id == master_id,
            CallerScope::Client(_) => false,
        }
    }
}
