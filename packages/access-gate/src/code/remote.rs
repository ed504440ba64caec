use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use super::{CodeError, CodeVerifier, VerifiedCode};
use crate::capability::CapabilityType;
use crate::client::{ApiClient, ClientError};

#[derive(Serialize)]
struct VerifyCodeRequest<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeResponse {
    success: bool,
    #[serde(default)]
    data: Option<VerifyCodeData>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyCodeData {
    #[serde(rename = "type")]
    capability_type: String,
    #[serde(default)]
    institution_link: Option<String>,
}

/// Checks codes against the API's code table (`POST /codes/verify`)
#[derive(Clone)]
pub struct RemoteCodeVerifier {
    client: ApiClient,
}

impl RemoteCodeVerifier {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait(?Send)]
impl CodeVerifier for RemoteCodeVerifier {
    async fn verify(&self, code: &str) -> Result<VerifiedCode, CodeError> {
        let response: VerifyCodeResponse = match self
            .client
            .post_json("/codes/verify", &VerifyCodeRequest { code })
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_client_error() => {
                debug!(error = %e, "Code not found");
                return Err(CodeError::Incorrect);
            }
            Err(e @ ClientError::Serialization(_)) => {
                error!(error = %e, "Malformed code verification reply");
                return Err(CodeError::Network(e.to_string()));
            }
            Err(e) => {
                error!(error = %e, "Code verification request failed");
                return Err(CodeError::Network(e.to_string()));
            }
        };

        if !response.success {
            debug!(message = ?response.message, "Code rejected by API");
            return Err(CodeError::Incorrect);
        }

        let data = match response.data {
            Some(data) => data,
            None => {
                warn!("Code verification succeeded without data");
                return Err(CodeError::Network(
                    "verification reply carried no data".to_string(),
                ));
            }
        };

        // A code for a surface this client doesn't know unlocks nothing here.
        let capability_type = match data.capability_type.parse::<CapabilityType>() {
            Ok(capability_type) => capability_type,
            Err(e) => {
                warn!(error = %e, "Code grants an unknown capability type");
                return Err(CodeError::Incorrect);
            }
        };

        Ok(VerifiedCode {
            capability_type,
            institution_link: data.institution_link,
        })
    }
}
