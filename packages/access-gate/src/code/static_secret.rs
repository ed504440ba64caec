use async_trait::async_trait;
use tracing::warn;

use super::{normalize_code, CodeError, CodeVerifier, VerifiedCode};
use crate::capability::CapabilityType;

/// Compares codes against one shared secret
#[derive(Debug, Clone)]
pub struct StaticSecretVerifier {
    secret: String,
    grants: CapabilityType,
}

impl StaticSecretVerifier {
    /// The secret goes through the same normalization as typed input
    pub fn new(secret: impl AsRef<str>, grants: CapabilityType) -> Self {
        Self {
            secret: normalize_code(secret.as_ref()),
            grants,
        }
    }

    pub fn grants(&self) -> CapabilityType {
        self.grants
    }
}

#[async_trait(?Send)]
impl CodeVerifier for StaticSecretVerifier {
    async fn verify(&self, code: &str) -> Result<VerifiedCode, CodeError> {
        if self.secret.is_empty() {
            warn!("Static access code is empty; rejecting every code");
            return Err(CodeError::Incorrect);
        }

        if normalize_code(code) != self.secret {
            return Err(CodeError::Incorrect);
        }

        Ok(VerifiedCode {
            capability_type: self.grants,
            institution_link: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_matches_normalized_secret() {
        let verifier = StaticSecretVerifier::new("asd-fgh", CapabilityType::RoleSelection);

        let verified = verifier.verify("ASDFGH").await.unwrap();

        assert_eq!(verified.capability_type, CapabilityType::RoleSelection);
        assert_eq!(verifier.verify("ASDFGX").await, Err(CodeError::Incorrect));
    }

    #[tokio::test]
    async fn test_empty_secret_rejects_everything() {
        let verifier = StaticSecretVerifier::new("1234", CapabilityType::RoleSelection);

        assert_eq!(verifier.verify("").await, Err(CodeError::Incorrect));
        assert_eq!(verifier.verify("ABCD").await, Err(CodeError::Incorrect));
    }
}
