use thiserror::Error;

use crate::storage::StorageError;

/// Access gating errors for the education portal
///
/// Gating failures never reach the user as raw errors: the route guard turns
/// them into a single denial screen and only uses the variant to pick copy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("No access capability present")]
    NoCapability,

    #[error("Access capability expired")]
    ExpiredCapability,

    #[error("Access capability does not unlock this view")]
    WrongCapabilityType,

    #[error("Session is missing or incomplete")]
    IncompleteSession,

    #[error("Access code rejected")]
    CodeRejected,

    #[error("Access code could not be verified: {0}")]
    CodeNetworkError(String),

    #[error("Invalid capability lifetime: {0}")]
    InvalidTtl(String),

    #[error("Corrupt stored data: {0}")]
    CorruptStoredData(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
