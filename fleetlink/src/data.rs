use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// The bearer token pair held by the session manager.
///
/// `expires_at` is always derived as issuance time plus the server-reported
/// ttl, never recomputed from the access token's own claims.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: OffsetDateTime,
}

/// What the auth endpoint hands out on login and refresh: the token pair
/// plus the ttl the server reported for it.
#[derive(Clone, Debug)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub ttl: Duration,
}

impl TokenGrant {
    pub fn into_pair(self, issued_at: OffsetDateTime) -> TokenPair {
        TokenPair {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: issued_at + self.ttl,
        }
    }
}

/// The signed-in user as reported by the backend's current-user endpoint.
/// Replaced wholesale on every fetch, never patched.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub status: Option<UserStatus>,
    pub role_name: Option<String>,
}

impl Identity {
    pub fn role(&self) -> Option<Role> {
        self.role_name.as_deref().and_then(Role::from_name)
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self
                .email
                .clone()
                .unwrap_or_else(|| self.id.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Suspended,
    Archived,
}

/// Coarse permission class. Derived from the backend role name, used to
/// pick which surfaces a consuming application offers; never stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    SuperAdmin,
    Dispatcher,
    MaintenanceOfficer,
    Driver,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Role> {
        match name {
            "Super Admin" => Some(Role::SuperAdmin),
            "Dispatcher" => Some(Role::Dispatcher),
            "Maintenance Officer" => Some(Role::MaintenanceOfficer),
            "Driver" => Some(Role::Driver),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "Super Admin",
            Role::Dispatcher => "Dispatcher",
            Role::MaintenanceOfficer => "Maintenance Officer",
            Role::Driver => "Driver",
        }
    }

    pub fn is_admin_class(&self) -> bool {
        matches!(
            self,
            Role::SuperAdmin | Role::Dispatcher | Role::MaintenanceOfficer,
        )
    }

    pub fn is_driver_class(&self) -> bool {
        matches!(self, Role::Driver)
    }
}
