use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::jwt::TokenVerifier;

const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";
const ANONYMOUS_PRINCIPAL: &str = "user";

/// Payload API Gateway sends to a `TOKEN` authorizer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub authorization_token: Option<String>,
    #[serde(default)]
    pub method_arn: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: String,
    pub effect: Effect,
    pub resource: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizerResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
}

impl AuthorizerResponse {
    fn with_effect(principal_id: impl Into<String>, effect: Effect) -> Self {
        Self {
            principal_id: principal_id.into(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    action: INVOKE_ACTION.to_string(),
                    effect,
                    resource: "*".to_string(),
                }],
            },
        }
    }

    pub fn allow(principal_id: impl Into<String>) -> Self {
        Self::with_effect(principal_id, Effect::Allow)
    }

    pub fn deny() -> Self {
        Self::with_effect(ANONYMOUS_PRINCIPAL, Effect::Deny)
    }

    pub fn is_allowed(&self) -> bool {
        self.policy_document
            .statement
            .iter()
            .all(|statement| statement.effect == Effect::Allow)
    }
}

/// Turns an authorizer request into an IAM policy. Any failure denies.
pub fn authorize(verifier: &TokenVerifier, request: &AuthorizerRequest) -> AuthorizerResponse {
    match verifier.verify_header(request.authorization_token.as_deref()) {
        Ok(payload) => {
            info!(principal = %payload.sub, "User was authorized");
            AuthorizerResponse::allow(payload.sub)
        }
        Err(e) => {
            warn!(error = %e, method_arn = ?request.method_arn, "User not authorized");
            AuthorizerResponse::deny()
        }
    }
}
