use crate::azure::auth::{
    BasicCredentialHandler, CredentialHandler, NtlmCredentialHandler, PatCredentialHandler,
};
use crate::config::{AuthenticationDescriptor, AzureDevOpsConfig};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzureError {
    #[error("Failed to create Azure DevOps connection: {0}")]
    Connection(String),
    #[error("Authentication failed: {0}")]
    AuthError(#[from] azure_core::Error),
    #[error("Authentication challenge failed: {0}")]
    Challenge(String),
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error(
        "Pull request {pull_request_id} belongs to repository {actual}, not {expected}"
    )]
    RepositoryMismatch {
        pull_request_id: u32,
        expected: String,
        actual: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Connection to one Azure DevOps organization (or on-premises collection).
///
/// The only way to obtain one is [`AzureDevOpsClient::connect`]; every
/// resource service receives a reference to it.
pub struct AzureDevOpsClient {
    client: Client,
    base_url: String,
    project: String,
    handler: Arc<dyn CredentialHandler>,
}

impl AzureDevOpsClient {
    /// Builds the connection for `config`.
    ///
    /// Failures are logged with the sanitized configuration and returned.
    pub fn connect(config: &AzureDevOpsConfig) -> Result<Self, AzureError> {
        Self::build(config).inspect_err(|e| {
            log::error!(
                "Failed to create Azure DevOps connection: {} (config: {})",
                e,
                config.sanitized()
            );
        })
    }

    fn build(config: &AzureDevOpsConfig) -> Result<Self, AzureError> {
        let handler = credential_handler(config);
        let base_url = config.base_url();
        reqwest::Url::parse(&base_url)
            .map_err(|e| AzureError::Connection(format!("invalid organization URL: {}", e)))?;

        let client = Client::builder()
            .default_headers(default_headers(config)?)
            .build()
            .map_err(|e| AzureError::Connection(e.to_string()))?;

        log::info!(
            "Connected to Azure DevOps ({} auth, {})",
            handler.kind(),
            config.hosting()
        );

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            project: config.project.clone(),
            handler,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The configured project every project-scoped request targets.
    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn auth_kind(&self) -> &'static str {
        self.handler.kind()
    }

    /// Runs one remote operation, logging failures with the operation name.
    /// The error is returned unchanged.
    pub async fn operation<T, F>(&self, name: &str, future: F) -> Result<T, AzureError>
    where
        F: Future<Output = Result<T, AzureError>>,
    {
        log::debug!("Operation started: {}", name);
        match future.await {
            Ok(value) => Ok(value),
            Err(e) => {
                log::error!("Operation {} failed: {}", name, e);
                Err(e)
            }
        }
    }

    fn project_url(&self, path: &str) -> String {
        format!(
            "{}/{}/_apis/{}",
            self.base_url,
            urlencoding::encode(&self.project),
            path
        )
    }

    fn team_url(&self, team: &str, path: &str) -> String {
        format!(
            "{}/{}/{}/_apis/{}",
            self.base_url,
            urlencoding::encode(&self.project),
            urlencoding::encode(team),
            path
        )
    }

    fn org_url(&self, path: &str) -> String {
        format!("{}/_apis/{}", self.base_url, path)
    }

    /// Sends a request built by `request`, authorizing it with the credential
    /// handler and answering at most one authentication challenge.
    async fn send(&self, request: RequestBuilder) -> Result<Response, AzureError> {
        let retry = request.try_clone();
        let response = self.handler.authorize(request).await?.send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }
        let Some(retry) = retry else {
            return Ok(response);
        };

        let challenge = response.headers().clone();
        match self.handler.answer_challenge(retry, &challenge).await? {
            Some(answer) => {
                log::debug!("Answering {} authentication challenge", self.handler.kind());
                // Drain the 401 body so the connection is reused for the handshake.
                let _ = response.bytes().await;
                Ok(answer.send().await?)
            }
            None => Ok(response),
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, AzureError> {
        let response = self.send(request).await?;
        let status = response.status();

        log::debug!("Response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::debug!("Error response: {}", error_text);
            return Err(AzureError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await?;
        log::debug!("Response body: {}", response_text);
        Ok(response_text)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<&(impl Serialize + ?Sized)>,
        content_type: &str,
    ) -> Result<T, AzureError> {
        log::debug!("Request: {} {}", method, url);
        if let Some(b) = &body
            && let Ok(json) = serde_json::to_string_pretty(b)
        {
            log::debug!("Request body: {}", json);
        }

        let mut request = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, content_type);

        if let Some(b) = body {
            request = request.body(serde_json::to_vec(b)?);
        }

        let response_text = self.execute(request).await?;
        let data = serde_json::from_str(&response_text)?;
        Ok(data)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AzureError> {
        self.request_json(
            Method::GET,
            self.project_url(path),
            None::<&()>,
            "application/json",
        )
        .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request_json(
            Method::POST,
            self.project_url(path),
            Some(body),
            "application/json",
        )
        .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request_json(
            Method::PATCH,
            self.project_url(path),
            Some(body),
            "application/json",
        )
        .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request_json(
            Method::PUT,
            self.project_url(path),
            Some(body),
            "application/json",
        )
        .await
    }

    pub async fn post_patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request_json(
            Method::POST,
            self.project_url(path),
            Some(body),
            "application/json-patch+json",
        )
        .await
    }

    pub async fn patch_patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl Serialize + ?Sized),
    ) -> Result<T, AzureError> {
        self.request_json(
            Method::PATCH,
            self.project_url(path),
            Some(body),
            "application/json-patch+json",
        )
        .await
    }

    /// GET at the team level: `{base}/{project}/{team}/_apis/{path}`
    pub async fn team_get<T: DeserializeOwned>(
        &self,
        team: &str,
        path: &str,
    ) -> Result<T, AzureError> {
        self.request_json(
            Method::GET,
            self.team_url(team, path),
            None::<&()>,
            "application/json",
        )
        .await
    }

    /// GET at the organization level (not project-scoped)
    pub async fn org_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AzureError> {
        self.request_json(
            Method::GET,
            self.org_url(path),
            None::<&()>,
            "application/json",
        )
        .await
    }
}

fn credential_handler(config: &AzureDevOpsConfig) -> Arc<dyn CredentialHandler> {
    match &config.auth {
        AuthenticationDescriptor::Pat => {
            Arc::new(PatCredentialHandler::new(&config.personal_access_token))
        }
        AuthenticationDescriptor::Basic { username, password } => {
            Arc::new(BasicCredentialHandler::new(username, password))
        }
        AuthenticationDescriptor::Ntlm {
            username,
            password,
            domain,
        } => Arc::new(NtlmCredentialHandler::new(
            username,
            password,
            domain.as_deref(),
        )),
        AuthenticationDescriptor::Entra(handler) => Arc::clone(handler),
    }
}

/// Headers sent with every request. On-premises servers pinned to an API
/// version get it in the `Accept` header.
fn default_headers(config: &AzureDevOpsConfig) -> Result<HeaderMap, AzureError> {
    let mut headers = HeaderMap::new();
    if config.is_on_premises
        && let Some(version) = &config.api_version
    {
        let value = HeaderValue::from_str(&format!("application/json;api-version={}", version))
            .map_err(|e| AzureError::Connection(format!("invalid API version: {}", e)))?;
        headers.insert(ACCEPT, value);
    }
    Ok(headers)
}
