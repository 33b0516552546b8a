use crate::azure::client::AzureError;
use crate::azure::ntlm;
use async_trait::async_trait;
use azure_core::auth::TokenCredential;
use base64::Engine;
use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, HeaderMap, WWW_AUTHENTICATE};
use std::sync::Arc;

const AZURE_DEVOPS_SCOPE: &str = "499b84ac-1321-427f-aa17-267ca6975798";

/// Attaches credentials to outgoing requests.
///
/// One implementation exists per authentication kind. Entra handlers are
/// supplied from outside the configuration layer and used as-is.
#[cfg_attr(any(test, feature = "test-support"), mockall::automock)]
#[async_trait]
pub trait CredentialHandler: Send + Sync {
    /// Short name used in logs.
    fn kind(&self) -> &'static str;

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AzureError>;

    /// Answers the challenge carried by a `401` response.
    ///
    /// `request` is a fresh copy of the original request without credentials.
    /// Returns `Ok(None)` when the handler has no challenge round trip.
    async fn answer_challenge(
        &self,
        request: RequestBuilder,
        challenge: &HeaderMap,
    ) -> Result<Option<RequestBuilder>, AzureError>;
}

fn basic_header(username: &str, password: &str) -> String {
    let encoded =
        base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, password));
    format!("Basic {}", encoded)
}

/// Personal access token sent as HTTP Basic with an empty user name.
pub struct PatCredentialHandler {
    header: String,
}

impl PatCredentialHandler {
    pub fn new(token: &str) -> Self {
        Self {
            header: basic_header("", token),
        }
    }
}

#[async_trait]
impl CredentialHandler for PatCredentialHandler {
    fn kind(&self) -> &'static str {
        "pat"
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AzureError> {
        Ok(request.header(AUTHORIZATION, &self.header))
    }

    async fn answer_challenge(
        &self,
        _request: RequestBuilder,
        _challenge: &HeaderMap,
    ) -> Result<Option<RequestBuilder>, AzureError> {
        Ok(None)
    }
}

pub struct BasicCredentialHandler {
    header: String,
}

impl BasicCredentialHandler {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            header: basic_header(username, password),
        }
    }
}

#[async_trait]
impl CredentialHandler for BasicCredentialHandler {
    fn kind(&self) -> &'static str {
        "basic"
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AzureError> {
        Ok(request.header(AUTHORIZATION, &self.header))
    }

    async fn answer_challenge(
        &self,
        _request: RequestBuilder,
        _challenge: &HeaderMap,
    ) -> Result<Option<RequestBuilder>, AzureError> {
        Ok(None)
    }
}

/// NTLMv2 over HTTP: the first request carries a NEGOTIATE message, the
/// server answers `401` with a CHALLENGE, the retry carries AUTHENTICATE.
pub struct NtlmCredentialHandler {
    credentials: ntlm::Credentials,
}

impl NtlmCredentialHandler {
    pub fn new(username: &str, password: &str, domain: Option<&str>) -> Self {
        Self {
            credentials: ntlm::Credentials {
                username: username.to_string(),
                password: password.to_string(),
                domain: domain.unwrap_or_default().to_string(),
                workstation: String::new(),
            },
        }
    }
}

#[async_trait]
impl CredentialHandler for NtlmCredentialHandler {
    fn kind(&self) -> &'static str {
        "ntlm"
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AzureError> {
        let negotiate = ntlm::negotiate_message();
        Ok(request.header(
            AUTHORIZATION,
            format!(
                "NTLM {}",
                base64::engine::general_purpose::STANDARD.encode(negotiate)
            ),
        ))
    }

    async fn answer_challenge(
        &self,
        request: RequestBuilder,
        challenge: &HeaderMap,
    ) -> Result<Option<RequestBuilder>, AzureError> {
        let Some(token) = challenge
            .get_all(WWW_AUTHENTICATE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| v.strip_prefix("NTLM "))
        else {
            return Ok(None);
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(token.trim())
            .map_err(|e| AzureError::Challenge(format!("Invalid NTLM challenge encoding: {}", e)))?;
        let parsed = ntlm::Challenge::parse(&bytes)
            .map_err(|e| AzureError::Challenge(format!("Invalid NTLM challenge: {}", e)))?;

        let client_challenge: [u8; 8] = std::array::from_fn(|_| fastrand::u8(..));
        let authenticate = ntlm::authenticate_message(
            &self.credentials,
            &parsed,
            client_challenge,
            ntlm::current_filetime(),
        );

        Ok(Some(request.header(
            AUTHORIZATION,
            format!(
                "NTLM {}",
                base64::engine::general_purpose::STANDARD.encode(authenticate)
            ),
        )))
    }
}

/// Bearer tokens from a Microsoft Entra ID credential.
pub struct EntraCredentialHandler {
    credential: Arc<dyn TokenCredential>,
}

impl EntraCredentialHandler {
    pub fn new(credential: Arc<dyn TokenCredential>) -> Self {
        Self { credential }
    }
}

#[async_trait]
impl CredentialHandler for EntraCredentialHandler {
    fn kind(&self) -> &'static str {
        "entra"
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, AzureError> {
        let token_response = self.credential.get_token(AZURE_DEVOPS_SCOPE).await?;
        Ok(request.bearer_auth(token_response.token.secret()))
    }

    async fn answer_challenge(
        &self,
        _request: RequestBuilder,
        _challenge: &HeaderMap,
    ) -> Result<Option<RequestBuilder>, AzureError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn authorization_of(request: RequestBuilder) -> String {
        let built = request.build().unwrap();
        built
            .headers()
            .get(AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    fn request() -> RequestBuilder {
        reqwest::Client::new().get("https://dev.azure.com/contoso/_apis/projects")
    }

    #[tokio::test]
    async fn pat_uses_basic_with_empty_user() {
        let handler = PatCredentialHandler::new("token");
        let authorized = handler.authorize(request()).await.unwrap();
        // base64(":token")
        assert_eq!(authorization_of(authorized), "Basic OnRva2Vu");
    }

    #[tokio::test]
    async fn basic_encodes_username_and_password() {
        let handler = BasicCredentialHandler::new("jdoe", "hunter2");
        let authorized = handler.authorize(request()).await.unwrap();
        // base64("jdoe:hunter2")
        assert_eq!(authorization_of(authorized), "Basic amRvZTpodW50ZXIy");
    }

    #[tokio::test]
    async fn ntlm_starts_with_negotiate() {
        let handler = NtlmCredentialHandler::new("jdoe", "hunter2", Some("CORP"));
        let header = authorization_of(handler.authorize(request()).await.unwrap());
        let token = header.strip_prefix("NTLM ").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(token)
            .unwrap();
        assert_eq!(&bytes[..8], b"NTLMSSP\0");
        assert_eq!(bytes[8], 1);
    }

    #[tokio::test]
    async fn ntlm_answers_challenge_with_authenticate() {
        let handler = NtlmCredentialHandler::new("jdoe", "hunter2", Some("CORP"));
        let challenge = ntlm::tests::challenge_bytes([1, 2, 3, 4, 5, 6, 7, 8], &[]);
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("Negotiate"));
        headers.append(
            WWW_AUTHENTICATE,
            HeaderValue::from_str(&format!(
                "NTLM {}",
                base64::engine::general_purpose::STANDARD.encode(challenge)
            ))
            .unwrap(),
        );

        let answered = handler
            .answer_challenge(request(), &headers)
            .await
            .unwrap()
            .expect("challenge answered");
        let header = authorization_of(answered);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(header.strip_prefix("NTLM ").unwrap())
            .unwrap();
        assert_eq!(&bytes[..8], b"NTLMSSP\0");
        assert_eq!(bytes[8], 3);
    }

    #[tokio::test]
    async fn ntlm_ignores_non_ntlm_challenges() {
        let handler = NtlmCredentialHandler::new("jdoe", "hunter2", None);
        let mut headers = HeaderMap::new();
        headers.append(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        assert!(
            handler
                .answer_challenge(request(), &headers)
                .await
                .unwrap()
                .is_none()
        );
    }
}
