//! Access capabilities: short-lived grants unlocked by a shared code
//!
//! A capability is a UX gate, not a security boundary. Its id is random but
//! not cryptographically meaningful, and the server stays the authority for
//! anything sensitive.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::AccessError;
use crate::storage::{KeyValueStorage, StorageError};

pub const CAPABILITY_ID_KEY: &str = "edu.capability.id";
pub const CAPABILITY_TYPE_KEY: &str = "edu.capability.type";
pub const CAPABILITY_EXPIRES_AT_KEY: &str = "edu.capability.expires_at";

// Written by older clients; expiry is epoch milliseconds.
pub const LEGACY_CAPABILITY_ID_KEY: &str = "accessCodeId";
pub const LEGACY_CAPABILITY_TYPE_KEY: &str = "accessCodeType";
pub const LEGACY_CAPABILITY_EXPIRY_KEY: &str = "accessCodeExpiry";

const CANONICAL_KEYS: [&str; 3] = [
    CAPABILITY_ID_KEY,
    CAPABILITY_TYPE_KEY,
    CAPABILITY_EXPIRES_AT_KEY,
];

const LEGACY_KEYS: [&str; 3] = [
    LEGACY_CAPABILITY_ID_KEY,
    LEGACY_CAPABILITY_TYPE_KEY,
    LEGACY_CAPABILITY_EXPIRY_KEY,
];

// ============================================================================
// Types
// ============================================================================

/// Which protected surface a capability unlocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CapabilityType {
    /// Choosing a portal role after login
    RoleSelection,
    /// Registering a new institution
    InstitutionRegistration,
}

impl CapabilityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityType::RoleSelection => "ROLE_SELECTION",
            CapabilityType::InstitutionRegistration => "INSTITUTION_REGISTRATION",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CapabilityType::RoleSelection => "Role Selection",
            CapabilityType::InstitutionRegistration => "Institution Registration",
        }
    }

    /// Path of the view this capability unlocks
    pub fn protected_path(&self) -> &'static str {
        match self {
            CapabilityType::RoleSelection => "/select-role",
            CapabilityType::InstitutionRegistration => "/register-institution",
        }
    }

    /// Whether a complete session is needed on top of the capability
    pub fn requires_session(&self) -> bool {
        matches!(self, CapabilityType::RoleSelection)
    }

    /// Whether closing the tab or navigating through history revokes the
    /// capability. Institution registration survives a refresh.
    pub fn revoked_on_exit(&self) -> bool {
        matches!(self, CapabilityType::RoleSelection)
    }

    pub fn variants() -> &'static [CapabilityType] {
        &[
            CapabilityType::RoleSelection,
            CapabilityType::InstitutionRegistration,
        ]
    }
}

impl fmt::Display for CapabilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapabilityType {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_SELECTION" => Ok(CapabilityType::RoleSelection),
            "INSTITUTION_REGISTRATION" => Ok(CapabilityType::InstitutionRegistration),
            other => Err(AccessError::CorruptStoredData(format!(
                "unknown capability type '{}'",
                other
            ))),
        }
    }
}

/// A locally issued, short-lived access grant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCapability {
    pub id: String,
    #[serde(rename = "type")]
    pub capability_type: CapabilityType,
    /// Only known to the issuer; not persisted
    #[serde(skip)]
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl AccessCapability {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// Compares the persisted fields only.
impl PartialEq for AccessCapability {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.capability_type == other.capability_type
            && self.expires_at == other.expires_at
    }
}

impl Eq for AccessCapability {}

// ============================================================================
// Repository
// ============================================================================

/// Narrow read/write/clear contract the decision engine and code validator
/// depend on
pub trait CapabilityRepository {
    /// Persist a fresh capability of the given type
    fn issue(&self, capability_type: CapabilityType, ttl: Duration)
        -> Result<AccessCapability, AccessError>;

    /// Read the stored capability, surfacing backend failures.
    /// Malformed data is wiped and reported as absent.
    fn load(&self) -> Result<Option<AccessCapability>, StorageError>;

    /// Remove the stored capability. Safe to call when nothing is stored.
    fn clear(&self);

    /// Read the stored capability. Never fails: backend errors are logged and
    /// reported as absent.
    fn read(&self) -> Option<AccessCapability> {
        match self.load() {
            Ok(capability) => capability,
            Err(e) => {
                error!(error = %e, "Failed to read access capability");
                None
            }
        }
    }
}

/// Capability bucket in client-local storage
#[derive(Clone)]
pub struct CapabilityStore<S> {
    storage: S,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStorage> CapabilityStore<S> {
    pub fn new(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn wipe(&self) {
        let keys: Vec<&str> = CANONICAL_KEYS.iter().chain(LEGACY_KEYS.iter()).copied().collect();
        if let Err(e) = self.storage.remove_batch(&keys) {
            error!(error = %e, "Failed to clear access capability");
        }
    }

    /// Older clients wrote the capability under camelCase keys with an
    /// epoch-millisecond expiry. Migrate it to the canonical keys.
    fn load_legacy(&self) -> Result<Option<AccessCapability>, StorageError> {
        let id = self.storage.get(LEGACY_CAPABILITY_ID_KEY)?;
        let kind = self.storage.get(LEGACY_CAPABILITY_TYPE_KEY)?;
        let expiry = self.storage.get(LEGACY_CAPABILITY_EXPIRY_KEY)?;

        let (id, kind, expiry) = match (id, kind, expiry) {
            (None, None, None) => return Ok(None),
            (Some(id), Some(kind), Some(expiry)) => (id, kind, expiry),
            _ => {
                debug!("Discarding partial legacy access capability");
                self.storage.remove_batch(&LEGACY_KEYS)?;
                return Ok(None);
            }
        };

        let capability = match parse_legacy(id, &kind, &expiry) {
            Ok(capability) => capability,
            Err(e) => {
                warn!(error = %e, "Discarding corrupt legacy access capability");
                self.storage.remove_batch(&LEGACY_KEYS)?;
                return Ok(None);
            }
        };

        self.storage.set_batch(&canonical_entries(&capability))?;
        self.storage.remove_batch(&LEGACY_KEYS)?;
        info!(
            capability_type = %capability.capability_type,
            "Migrated legacy access capability"
        );

        Ok(Some(capability))
    }
}

impl<S: KeyValueStorage> CapabilityRepository for CapabilityStore<S> {
    fn issue(
        &self,
        capability_type: CapabilityType,
        ttl: Duration,
    ) -> Result<AccessCapability, AccessError> {
        if ttl <= Duration::zero() {
            return Err(AccessError::InvalidTtl(format!("{} is not positive", ttl)));
        }

        let issued_at = self.clock.now();
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AccessError::InvalidTtl(format!("{} overflows the expiry", ttl)))?;
        let capability = AccessCapability {
            id: Uuid::new_v4().to_string(),
            capability_type,
            issued_at: Some(issued_at),
            expires_at,
        };

        self.storage.set_batch(&canonical_entries(&capability))?;

        info!(
            capability_type = %capability_type,
            expires_at = %capability.expires_at,
            "Issued access capability"
        );

        Ok(capability)
    }

    fn load(&self) -> Result<Option<AccessCapability>, StorageError> {
        let id = self.storage.get(CAPABILITY_ID_KEY)?;
        let kind = self.storage.get(CAPABILITY_TYPE_KEY)?;
        let expires_at = self.storage.get(CAPABILITY_EXPIRES_AT_KEY)?;

        match (id, kind, expires_at) {
            (None, None, None) => self.load_legacy(),
            (Some(id), Some(kind), Some(expires_at)) => {
                match parse_canonical(id, &kind, &expires_at) {
                    Ok(capability) => Ok(Some(capability)),
                    Err(e) => {
                        warn!(error = %e, "Discarding corrupt access capability");
                        self.wipe();
                        Ok(None)
                    }
                }
            }
            _ => {
                debug!("Discarding partial access capability");
                self.wipe();
                Ok(None)
            }
        }
    }

    fn clear(&self) {
        self.wipe();
        debug!("Cleared access capability");
    }
}

fn canonical_entries(capability: &AccessCapability) -> [(&'static str, String); 3] {
    [
        (CAPABILITY_ID_KEY, capability.id.clone()),
        (CAPABILITY_TYPE_KEY, capability.capability_type.as_str().to_string()),
        (CAPABILITY_EXPIRES_AT_KEY, capability.expires_at.to_rfc3339()),
    ]
}

fn parse_canonical(id: String, kind: &str, expires_at: &str) -> Result<AccessCapability, AccessError> {
    if id.trim().is_empty() {
        return Err(AccessError::CorruptStoredData("empty capability id".to_string()));
    }

    let capability_type = kind.parse::<CapabilityType>()?;
    let expires_at = DateTime::parse_from_rfc3339(expires_at)
        .map_err(|e| AccessError::CorruptStoredData(format!("invalid expiry: {}", e)))?
        .with_timezone(&Utc);

    Ok(AccessCapability {
        id,
        capability_type,
        issued_at: None,
        expires_at,
    })
}

fn parse_legacy(id: String, kind: &str, expiry: &str) -> Result<AccessCapability, AccessError> {
    if id.trim().is_empty() {
        return Err(AccessError::CorruptStoredData("empty capability id".to_string()));
    }

    let capability_type = kind.parse::<CapabilityType>()?;
    let millis: i64 = expiry
        .trim()
        .parse()
        .map_err(|_| AccessError::CorruptStoredData(format!("invalid legacy expiry '{}'", expiry)))?;
    let expires_at = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| AccessError::CorruptStoredData(format!("legacy expiry out of range: {}", millis)))?;

    Ok(AccessCapability {
        id,
        capability_type,
        issued_at: None,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::storage::MemoryStorage;

    fn store() -> (CapabilityStore<MemoryStorage>, MemoryStorage, ManualClock) {
        let storage = MemoryStorage::new();
        let clock = ManualClock::default();
        let store = CapabilityStore::new(storage.clone(), Arc::new(clock.clone()));
        (store, storage, clock)
    }

    #[test]
    fn test_issue_persists_three_fields() {
        let (store, storage, clock) = store();

        let capability = store
            .issue(CapabilityType::RoleSelection, Duration::minutes(30))
            .unwrap();

        assert_eq!(capability.issued_at, Some(clock.now()));
        assert_eq!(capability.expires_at, clock.now() + Duration::minutes(30));
        assert_eq!(
            storage.keys(),
            vec![
                CAPABILITY_EXPIRES_AT_KEY.to_string(),
                CAPABILITY_ID_KEY.to_string(),
                CAPABILITY_TYPE_KEY.to_string(),
            ]
        );
        assert_eq!(
            storage.get(CAPABILITY_TYPE_KEY).unwrap().as_deref(),
            Some("ROLE_SELECTION")
        );
    }

    #[test]
    fn test_issue_rejects_unusable_ttl() {
        let (store, storage, _clock) = store();

        for ttl in [
            Duration::zero(),
            Duration::minutes(-5),
            Duration::milliseconds(i64::MAX),
        ] {
            assert!(matches!(
                store.issue(CapabilityType::RoleSelection, ttl),
                Err(AccessError::InvalidTtl(_))
            ));
        }
        assert!(storage.is_empty());
    }

    #[test]
    fn test_issue_read_clear_read() {
        let (store, _storage, _clock) = store();

        let issued = store
            .issue(CapabilityType::InstitutionRegistration, Duration::minutes(30))
            .unwrap();

        let read = store.read().expect("capability should be readable");
        assert_eq!(read, issued);
        assert_eq!(read.issued_at, None);

        store.clear();
        assert!(store.read().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (store, storage, _clock) = store();

        store.clear();
        store.clear();
        assert!(store.read().is_none());

        store
            .issue(CapabilityType::RoleSelection, Duration::minutes(30))
            .unwrap();
        store.clear();
        store.clear();
        assert!(store.read().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_missing_field_reads_as_absent() {
        let (store, storage, _clock) = store();
        store
            .issue(CapabilityType::RoleSelection, Duration::minutes(30))
            .unwrap();

        storage.remove_batch(&[CAPABILITY_EXPIRES_AT_KEY]).unwrap();

        assert!(store.read().is_none());
        assert!(storage.is_empty(), "partial capability should be wiped");
    }

    #[test]
    fn test_unknown_type_reads_as_absent() {
        let (store, storage, _clock) = store();
        storage
            .set_batch(&[
                (CAPABILITY_ID_KEY, "abc".to_string()),
                (CAPABILITY_TYPE_KEY, "SUPERUSER".to_string()),
                (CAPABILITY_EXPIRES_AT_KEY, Utc::now().to_rfc3339()),
            ])
            .unwrap();

        assert!(store.read().is_none());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_garbage_expiry_reads_as_absent() {
        let (store, storage, _clock) = store();
        storage
            .set_batch(&[
                (CAPABILITY_ID_KEY, "abc".to_string()),
                (CAPABILITY_TYPE_KEY, "ROLE_SELECTION".to_string()),
                (CAPABILITY_EXPIRES_AT_KEY, "tomorrow-ish".to_string()),
            ])
            .unwrap();

        assert!(store.read().is_none());
    }

    #[test]
    fn test_legacy_keys_are_migrated() {
        let (store, storage, clock) = store();
        let expiry = clock.now() + Duration::minutes(10);
        storage
            .set_batch(&[
                (LEGACY_CAPABILITY_ID_KEY, "legacy-id".to_string()),
                (LEGACY_CAPABILITY_TYPE_KEY, "INSTITUTION_REGISTRATION".to_string()),
                (LEGACY_CAPABILITY_EXPIRY_KEY, expiry.timestamp_millis().to_string()),
            ])
            .unwrap();

        let capability = store.read().expect("legacy capability should migrate");

        assert_eq!(capability.id, "legacy-id");
        assert_eq!(
            capability.capability_type,
            CapabilityType::InstitutionRegistration
        );
        assert_eq!(
            capability.expires_at.timestamp_millis(),
            expiry.timestamp_millis()
        );
        assert!(storage.get(LEGACY_CAPABILITY_ID_KEY).unwrap().is_none());
        assert_eq!(
            storage.get(CAPABILITY_ID_KEY).unwrap().as_deref(),
            Some("legacy-id")
        );
    }

    #[test]
    fn test_capability_type_parse() {
        for kind in CapabilityType::variants() {
            assert_eq!(kind.as_str().parse::<CapabilityType>().unwrap(), *kind);
        }
        assert!(matches!(
            "role_selection".parse::<CapabilityType>(),
            Err(AccessError::CorruptStoredData(_))
        ));
    }

    #[test]
    fn test_expiry_is_strictly_after() {
        let now = Utc::now();
        let capability = AccessCapability {
            id: "x".to_string(),
            capability_type: CapabilityType::RoleSelection,
            issued_at: None,
            expires_at: now,
        };

        assert!(!capability.is_expired_at(now));
        assert!(capability.is_expired_at(now + Duration::milliseconds(1)));
    }
}
