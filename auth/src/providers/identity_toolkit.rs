//! Google Identity Toolkit provider implementation.

use crate::constants::DEFAULT_PROVIDER;
use crate::error::{AuthError, Result};
use crate::providers::{IdentityAccount, IdentityProvider, NewAccount};
use crate::state::{ExternalCredential, SubjectId, VerifiedIdentity};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Default Identity Toolkit endpoint.
pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Identity Toolkit connection settings.
#[derive(Clone)]
pub struct IdentityToolkitConfig {
    /// Web API key, used for ID token lookups.
    pub api_key: String,

    /// Project id, used for account administration.
    pub project_id: String,

    /// OAuth access token with the identity admin scope.
    pub access_token: String,

    /// API base URL.
    ///
    /// Default: `https://identitytoolkit.googleapis.com/v1`
    pub base_url: String,
}

impl IdentityToolkitConfig {
    /// Create a configuration against the public endpoint.
    #[must_use]
    pub fn new(api_key: String, project_id: String, access_token: String) -> Self {
        Self {
            api_key,
            project_id,
            access_token,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the provider at another endpoint (e.g. the local emulator).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl std::fmt::Debug for IdentityToolkitConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityToolkitConfig")
            .field("project_id", &self.project_id)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Identity provider backed by the Identity Toolkit REST API.
///
/// # Example
///
/// ```no_run
/// use boxoffice_auth::providers::{IdentityToolkitConfig, IdentityToolkitProvider};
///
/// let provider = IdentityToolkitProvider::new(IdentityToolkitConfig::new(
///     "api-key".to_string(),
///     "box-office".to_string(),
///     "ya29.token".to_string(),
/// ));
/// ```
#[derive(Clone, Debug)]
pub struct IdentityToolkitProvider {
    config: IdentityToolkitConfig,
    http_client: Client,
}

impl IdentityToolkitProvider {
    /// Create a new provider with a fresh HTTP client.
    #[must_use]
    pub fn new(config: IdentityToolkitConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a new provider sharing an existing HTTP client.
    #[must_use]
    pub const fn with_client(config: IdentityToolkitConfig, http_client: Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn project_url(&self, method: &str) -> String {
        format!(
            "{}/projects/{}/{method}",
            self.config.base_url, self.config.project_id
        )
    }

    /// POST an admin request and decode the response.
    async fn admin_call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        let response = self
            .http_client
            .post(self.project_url(method))
            .bearer_auth(&self.config.access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let code = error_code(response).await;
            tracing::error!(method, %status, code = %code, "Identity Toolkit call failed");
            return Err(map_error_code(&code));
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))
    }

    async fn lookup(&self, body: Value) -> Result<Option<IdentityAccount>> {
        let response: LookupResponse = self.admin_call("accounts:lookup", &body).await?;
        response
            .users
            .into_iter()
            .next()
            .map(ToolkitUser::into_account)
            .transpose()
    }
}

impl IdentityProvider for IdentityToolkitProvider {
    async fn verify_token(&self, credential: &ExternalCredential) -> Result<VerifiedIdentity> {
        let response = self
            .http_client
            .post(format!("{}/accounts:lookup", self.config.base_url))
            .query(&[("key", self.config.api_key.as_str())])
            .json(&json!({ "idToken": credential.expose() }))
            .send()
            .await
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let code = error_code(response).await;
            tracing::warn!(code = %code, "Credential rejected by identity provider");
            return Err(AuthError::InvalidCredential);
        }
        if !status.is_success() {
            let code = error_code(response).await;
            tracing::error!(%status, code = %code, "Token lookup failed");
            return Err(AuthError::IdentityProvider(code));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AuthError::IdentityProvider(e.to_string()))?;

        let Some(Value::Object(user)) = body.get("users").and_then(|u| u.get(0)).cloned() else {
            return Err(AuthError::InvalidCredential);
        };

        if user.get("disabled").and_then(Value::as_bool).unwrap_or(false) {
            return Err(AuthError::InvalidCredential);
        }

        let subject_id = user
            .get("localId")
            .and_then(Value::as_str)
            .ok_or(AuthError::InvalidCredential)
            .and_then(SubjectId::new)?;

        let email = user
            .get("email")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .ok_or(AuthError::MissingEmail)?
            .to_string();

        let provider = user
            .get("providerUserInfo")
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("providerId"))
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_PROVIDER)
            .to_string();

        Ok(VerifiedIdentity {
            subject_id,
            email,
            provider,
            claims: user,
        })
    }

    async fn get_account(&self, subject_id: &SubjectId) -> Result<IdentityAccount> {
        self.lookup(json!({ "localId": [subject_id.as_str()] }))
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("account {subject_id}")))
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<IdentityAccount>> {
        self.lookup(json!({ "email": [email] })).await
    }

    async fn create_account(&self, account: &NewAccount) -> Result<IdentityAccount> {
        let request = SignUpRequest {
            email: &account.email,
            display_name: &account.display_name,
            password: account.password.as_deref(),
            email_verified: account.email_verified,
            disabled: account.disabled,
        };
        let body = serde_json::to_value(&request)?;

        let created: ToolkitUser = self
            .admin_call("accounts", &body)
            .await
            .map_err(|e| match e {
                AuthError::DuplicateEmail { .. } => AuthError::DuplicateEmail {
                    email: account.email.clone(),
                },
                other => other,
            })?;

        let subject_id = SubjectId::new(created.local_id)
            .map_err(|_| AuthError::IdentityProvider("signUp returned no localId".into()))?;

        Ok(IdentityAccount {
            subject_id,
            email: account.email.clone(),
            display_name: Some(account.display_name.clone()),
            disabled: account.disabled,
            email_verified: account.email_verified,
        })
    }

    async fn set_disabled(&self, subject_id: &SubjectId, disabled: bool) -> Result<()> {
        let _: Value = self
            .admin_call(
                "accounts:update",
                &json!({ "localId": subject_id.as_str(), "disableUser": disabled }),
            )
            .await?;
        Ok(())
    }

    async fn update_display_name(&self, subject_id: &SubjectId, display_name: &str) -> Result<()> {
        let _: Value = self
            .admin_call(
                "accounts:update",
                &json!({ "localId": subject_id.as_str(), "displayName": display_name }),
            )
            .await?;
        Ok(())
    }

    async fn delete_account(&self, subject_id: &SubjectId) -> Result<()> {
        let _: Value = self
            .admin_call("accounts:delete", &json!({ "localId": subject_id.as_str() }))
            .await?;
        Ok(())
    }

    async fn generate_password_reset_link(&self, email: &str) -> Result<String> {
        let response: OobResponse = self
            .admin_call(
                "accounts:sendOobCode",
                &json!({
                    "requestType": "PASSWORD_RESET",
                    "email": email,
                    "returnOobLink": true,
                }),
            )
            .await?;

        response
            .oob_link
            .ok_or_else(|| AuthError::IdentityProvider("sendOobCode returned no link".into()))
    }
}

/// Extract the `error.message` code from a failed response.
async fn error_code(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap_or_default();
    body.pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("UNKNOWN")
        .to_string()
}

/// Map an Identity Toolkit error code to an `AuthError`.
///
/// Codes may carry a suffix (`"TOKEN_EXPIRED : ..."`), so only the leading
/// word is matched.
fn map_error_code(code: &str) -> AuthError {
    let head = code.split([' ', ':']).next().unwrap_or(code);
    match head {
        "EMAIL_EXISTS" | "DUPLICATE_EMAIL" => AuthError::DuplicateEmail {
            email: String::new(),
        },
        "USER_NOT_FOUND" | "EMAIL_NOT_FOUND" => AuthError::NotFound(code.to_string()),
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_DISABLED" => AuthError::InvalidCredential,
        "INVALID_EMAIL" => AuthError::InvalidEmail,
        _ => AuthError::IdentityProvider(code.to_string()),
    }
}

/// `accounts` (signUp) request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignUpRequest<'a> {
    email: &'a str,
    display_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<&'a str>,
    email_verified: bool,
    disabled: bool,
}

/// `accounts:lookup` response.
#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ToolkitUser>,
}

/// User object as returned by the Identity Toolkit.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolkitUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    email_verified: bool,
}

impl ToolkitUser {
    fn into_account(self) -> Result<IdentityAccount> {
        Ok(IdentityAccount {
            subject_id: SubjectId::new(self.local_id)
                .map_err(|_| AuthError::IdentityProvider("account without localId".into()))?,
            email: self.email.unwrap_or_default(),
            display_name: self.display_name,
            disabled: self.disabled,
            email_verified: self.email_verified,
        })
    }
}

/// `accounts:sendOobCode` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OobResponse {
    #[serde(default)]
    oob_link: Option<String>,
}
