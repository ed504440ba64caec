//! Authenticated sessions persisted in client-local storage
//!
//! A session never expires client-side; the auth API owns its validity. It is
//! created at login and destroyed only by an explicit logout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::AccessError;
use crate::storage::{KeyValueStorage, StorageError};

pub const SESSION_TOKEN_KEY: &str = "edu.session.token";
pub const SESSION_IDENTITY_KEY: &str = "edu.session.identity";
pub const SESSION_ROLE_KEY: &str = "edu.session.role";

// Read-only duplicates kept for older clients; removed on logout.
pub const LEGACY_TOKEN_KEY: &str = "authToken";
pub const LEGACY_IDENTITY_KEY: &str = "user";
pub const LEGACY_ROLE_KEY: &str = "userRole";

const ALL_SESSION_KEYS: [&str; 6] = [
    SESSION_TOKEN_KEY,
    SESSION_IDENTITY_KEY,
    SESSION_ROLE_KEY,
    LEGACY_TOKEN_KEY,
    LEGACY_IDENTITY_KEY,
    LEGACY_ROLE_KEY,
];

// ============================================================================
// Types
// ============================================================================

/// Portal roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    InstitutionAdmin,
    Supervisor,
    Director,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::InstitutionAdmin => "institution_admin",
            Role::Supervisor => "supervisor",
            Role::Director => "director",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::InstitutionAdmin => "Institution Administrator",
            Role::Supervisor => "Supervisor",
            Role::Director => "Director",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        }
    }

    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Role::InstitutionAdmin => "/institution/dashboard",
            Role::Supervisor => "/supervisor/dashboard",
            Role::Director => "/director/dashboard",
            Role::Teacher => "/teacher/dashboard",
            Role::Student => "/student/dashboard",
        }
    }

    pub fn variants() -> &'static [Role] {
        &[
            Role::InstitutionAdmin,
            Role::Supervisor,
            Role::Director,
            Role::Teacher,
            Role::Student,
        ]
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::variants()
            .iter()
            .copied()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AccessError::CorruptStoredData(format!("unknown role '{}'", s)))
    }
}

/// User attributes returned by the auth API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub institution_code: Option<String>,
}

/// A complete authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: String,
    pub identity: UserIdentity,
    pub role: Role,
}

// ============================================================================
// Repository
// ============================================================================

/// Narrow read/write/clear contract over the session bucket
pub trait SessionRepository {
    /// Persist token, identity and role in one step
    fn save(&self, token: &str, identity: &UserIdentity, role: Role) -> Result<(), AccessError>;

    /// Read the session, surfacing backend failures. Partial sessions read as
    /// absent; unparsable ones are wiped.
    fn load(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// Remove the session and every legacy duplicate. Idempotent.
    fn clear(&self);

    /// Read the session. Never fails.
    fn read(&self) -> Option<SessionRecord> {
        match self.load() {
            Ok(session) => session,
            Err(e) => {
                error!(error = %e, "Failed to read session");
                None
            }
        }
    }
}

/// Session bucket in client-local storage
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    storage: S,
}

impl<S: KeyValueStorage> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read one generation of keys as a whole. Empty values count as missing.
    fn fields(&self, keys: [&str; 3]) -> Result<[Option<String>; 3], StorageError> {
        Ok([
            non_empty(self.storage.get(keys[0])?),
            non_empty(self.storage.get(keys[1])?),
            non_empty(self.storage.get(keys[2])?),
        ])
    }

    fn wipe(&self) {
        if let Err(e) = self.storage.remove_batch(&ALL_SESSION_KEYS) {
            error!(error = %e, "Failed to clear session");
        }
    }

    fn write(&self, token: &str, identity: &UserIdentity, role: Role) -> Result<(), AccessError> {
        let identity_json = serde_json::to_string(identity)
            .map_err(|e| AccessError::CorruptStoredData(format!("unserializable identity: {}", e)))?;

        self.storage.set_batch(&[
            (SESSION_TOKEN_KEY, token.to_string()),
            (SESSION_IDENTITY_KEY, identity_json),
            (SESSION_ROLE_KEY, role.as_str().to_string()),
        ])?;
        Ok(())
    }
}

impl<S: KeyValueStorage> SessionRepository for SessionStore<S> {
    fn save(&self, token: &str, identity: &UserIdentity, role: Role) -> Result<(), AccessError> {
        self.write(token, identity, role)?;
        info!(user_id = %identity.id, role = %role, "Saved session");
        Ok(())
    }

    fn load(&self) -> Result<Option<SessionRecord>, StorageError> {
        // Never mix generations: legacy keys are only consulted when no
        // canonical field is stored at all.
        let canonical = self.fields([SESSION_TOKEN_KEY, SESSION_IDENTITY_KEY, SESSION_ROLE_KEY])?;
        let from_legacy = canonical.iter().all(Option::is_none);
        let [token, identity, role] = if from_legacy {
            self.fields([LEGACY_TOKEN_KEY, LEGACY_IDENTITY_KEY, LEGACY_ROLE_KEY])?
        } else {
            canonical
        };

        let (token, identity, role) = match (token, identity, role) {
            (Some(token), Some(identity), Some(role)) => (token, identity, role),
            _ => {
                debug!("No complete session stored");
                return Ok(None);
            }
        };

        let identity: UserIdentity = match serde_json::from_str(&identity) {
            Ok(identity) => identity,
            Err(e) => {
                let e = AccessError::CorruptStoredData(format!("identity: {}", e));
                warn!(error = %e, "Discarding corrupt session");
                self.wipe();
                return Ok(None);
            }
        };

        let role = match role.parse::<Role>() {
            Ok(role) => role,
            Err(e) => {
                warn!(error = %e, "Discarding corrupt session");
                self.wipe();
                return Ok(None);
            }
        };

        if from_legacy {
            // Canonical keys only; legacy duplicates stay for older clients.
            if let Err(e) = self.write(&token, &identity, role) {
                warn!(error = %e, "Failed to migrate legacy session keys");
            } else {
                info!(user_id = %identity.id, "Migrated legacy session keys");
            }
        }

        Ok(Some(SessionRecord {
            token,
            identity,
            role,
        }))
    }

    fn clear(&self) {
        self.wipe();
        debug!("Cleared session");
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
