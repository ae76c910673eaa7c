//! Party identities: customers, restaurant owners and riders.
//!
//! A `restaurant`/`rider` row links 1:1 back to the owning `user` row.
//! Authorization resolves through that link; the caller's claimed id is
//! never compared directly against an order's restaurant/rider id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of party roles. Wire names match the token claims
/// (`USER` / `RESTAURANT` / `RIDER`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Restaurant,
    Rider,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Restaurant => "RESTAURANT",
            Role::Rider => "RIDER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Role::User),
            "RESTAURANT" => Ok(Role::Restaurant),
            "RIDER" => Ok(Role::Rider),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

/// Restaurant row, owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub address: String,
}

/// Rider row, owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Rider {
    pub id: String,
    pub user_id: String,
    pub vehicle_type: String,
}
