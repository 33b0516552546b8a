//! Configuration resolution from the process environment.
//!
//! [`EnvSettings`] carries the raw values (parsed by clap from the environment
//! or command line), [`AzureDevOpsConfig::resolve`] validates them and picks an
//! [`AuthenticationDescriptor`] according to the auth type and hosting mode.

use crate::azure::auth::CredentialHandler;
use clap::Args;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub const ORG_URL_VAR: &str = "AZURE_DEVOPS_ORG_URL";
pub const PROJECT_VAR: &str = "AZURE_DEVOPS_PROJECT";
pub const PAT_VAR: &str = "AZURE_DEVOPS_PERSONAL_ACCESS_TOKEN";
pub const USERNAME_VAR: &str = "AZURE_DEVOPS_USERNAME";
pub const PASSWORD_VAR: &str = "AZURE_DEVOPS_PASSWORD";

/// Raw Azure DevOps settings, one field per environment variable.
#[derive(Args, Clone, Default)]
pub struct EnvSettings {
    /// Organization URL (e.g. https://dev.azure.com/contoso or https://ado.example.com)
    #[arg(long, env = "AZURE_DEVOPS_ORG_URL")]
    pub org_url: Option<String>,

    /// Default project
    #[arg(long, env = "AZURE_DEVOPS_PROJECT")]
    pub project: Option<String>,

    /// Personal access token
    #[arg(long, env = "AZURE_DEVOPS_PERSONAL_ACCESS_TOKEN", hide_env_values = true)]
    pub personal_access_token: Option<String>,

    /// "true" when targeting Azure DevOps Server
    #[arg(long, env = "AZURE_DEVOPS_IS_ON_PREMISES")]
    pub is_on_premises: Option<String>,

    /// Collection name (on-premises only)
    #[arg(long, env = "AZURE_DEVOPS_COLLECTION")]
    pub collection: Option<String>,

    /// REST API version sent in the Accept header (on-premises only)
    #[arg(long, env = "AZURE_DEVOPS_API_VERSION")]
    pub api_version: Option<String>,

    /// Authentication type: pat, ntlm, basic or entra
    #[arg(long, env = "AZURE_DEVOPS_AUTH_TYPE")]
    pub auth_type: Option<String>,

    /// Username for ntlm/basic authentication
    #[arg(long, env = "AZURE_DEVOPS_USERNAME")]
    pub username: Option<String>,

    /// Password for ntlm/basic authentication
    #[arg(long, env = "AZURE_DEVOPS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Domain for ntlm authentication
    #[arg(long, env = "AZURE_DEVOPS_DOMAIN")]
    pub domain: Option<String>,
}

impl fmt::Debug for EnvSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvSettings")
            .field("org_url", &self.org_url.as_deref().map(mask_url_host))
            .field("project", &self.project)
            .field("has_token", &self.personal_access_token.is_some())
            .field("is_on_premises", &self.is_on_premises)
            .field("collection", &self.collection)
            .field("api_version", &self.api_version)
            .field("auth_type", &self.auth_type)
            .field("has_username", &self.username.is_some())
            .field("has_password", &self.password.is_some())
            .field("domain", &self.domain)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Pat,
    Ntlm,
    Basic,
    Entra,
}

impl AuthKind {
    /// Parses the free-text auth type. Returns `None` for values that are not
    /// one of the known kinds; callers fall back to [`AuthKind::Pat`].
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pat" => Some(Self::Pat),
            "ntlm" => Some(Self::Ntlm),
            "basic" => Some(Self::Basic),
            "entra" => Some(Self::Entra),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pat => "pat",
            Self::Ntlm => "ntlm",
            Self::Basic => "basic",
            Self::Entra => "entra",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hosting {
    Cloud,
    OnPremises,
}

impl fmt::Display for Hosting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloud => f.write_str("cloud"),
            Self::OnPremises => f.write_str("on-premises"),
        }
    }
}

/// Configuration and authentication setup errors. All of them are fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .fields.join(", "))]
    MissingRequiredField { fields: Vec<&'static str> },
    #[error("Authentication type '{auth}' is not supported for {hosting} deployments")]
    UnsupportedAuthForHosting { auth: AuthKind, hosting: Hosting },
    #[error("Entra authentication requires an external credential handler")]
    MissingCredentialHandler,
    #[error("{auth} authentication requires {}", .fields.join(" and "))]
    MissingCredentials {
        auth: AuthKind,
        fields: Vec<&'static str>,
    },
    #[error("A personal access token is required ({PAT_VAR})")]
    MissingToken,
}

#[derive(Clone)]
pub enum AuthenticationDescriptor {
    Pat,
    Basic {
        username: String,
        password: String,
    },
    Ntlm {
        username: String,
        password: String,
        domain: Option<String>,
    },
    Entra(Arc<dyn CredentialHandler>),
}

impl AuthenticationDescriptor {
    pub fn kind(&self) -> AuthKind {
        match self {
            Self::Pat => AuthKind::Pat,
            Self::Basic { .. } => AuthKind::Basic,
            Self::Ntlm { .. } => AuthKind::Ntlm,
            Self::Entra(_) => AuthKind::Entra,
        }
    }
}

impl fmt::Debug for AuthenticationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pat => f.write_str("Pat"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Ntlm {
                username, domain, ..
            } => f
                .debug_struct("Ntlm")
                .field("username", username)
                .field("domain", domain)
                .finish_non_exhaustive(),
            Self::Entra(handler) => f.debug_tuple("Entra").field(&handler.kind()).finish(),
        }
    }
}

/// Resolved, immutable configuration.
#[derive(Clone)]
pub struct AzureDevOpsConfig {
    pub org_url: String,
    pub project: String,
    pub personal_access_token: String,
    pub is_on_premises: bool,
    pub collection: Option<String>,
    pub api_version: Option<String>,
    pub auth: AuthenticationDescriptor,
}

impl fmt::Debug for AzureDevOpsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.sanitized(), f)
    }
}

/// Log-safe view of [`AzureDevOpsConfig`]: URL host masked, secrets reduced
/// to presence flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedConfig {
    pub org_url: String,
    pub project: String,
    pub has_token: bool,
    pub has_password: bool,
    pub is_on_premises: bool,
    pub collection: Option<String>,
    pub api_version: Option<String>,
    pub auth_type: AuthKind,
}

impl fmt::Display for SanitizedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ org_url: {}, project: {}, auth_type: {}, has_token: {}, has_password: {}, is_on_premises: {}, collection: {:?}, api_version: {:?} }}",
            self.org_url,
            self.project,
            self.auth_type,
            self.has_token,
            self.has_password,
            self.is_on_premises,
            self.collection,
            self.api_version
        )
    }
}

impl AzureDevOpsConfig {
    /// Resolves the configuration from raw settings.
    ///
    /// `entra_handler` is the externally supplied credential handler used when
    /// the auth type is `entra`.
    pub fn resolve(
        settings: &EnvSettings,
        entra_handler: Option<Arc<dyn CredentialHandler>>,
    ) -> Result<Self, ConfigError> {
        let org_url = non_blank(&settings.org_url);
        let project = non_blank(&settings.project);

        let (Some(org_url), Some(project)) = (org_url.clone(), project.clone()) else {
            let mut fields = Vec::new();
            if org_url.is_none() {
                fields.push(ORG_URL_VAR);
            }
            if project.is_none() {
                fields.push(PROJECT_VAR);
            }
            return Err(ConfigError::MissingRequiredField { fields });
        };

        let is_on_premises = settings.is_on_premises.as_deref() == Some("true");
        let hosting = if is_on_premises {
            Hosting::OnPremises
        } else {
            Hosting::Cloud
        };

        let auth_kind = match settings.auth_type.as_deref() {
            None => AuthKind::Pat,
            Some(raw) => AuthKind::parse(raw).unwrap_or_else(|| {
                log::warn!("Unrecognized AZURE_DEVOPS_AUTH_TYPE '{}', using pat", raw);
                AuthKind::Pat
            }),
        };

        let personal_access_token = non_blank(&settings.personal_access_token).unwrap_or_default();
        let auth = resolve_auth(
            auth_kind,
            hosting,
            settings,
            &personal_access_token,
            entra_handler,
        )?;

        Ok(Self {
            org_url,
            project,
            personal_access_token,
            is_on_premises,
            collection: non_blank(&settings.collection),
            api_version: non_blank(&settings.api_version),
            auth,
        })
    }

    pub fn hosting(&self) -> Hosting {
        if self.is_on_premises {
            Hosting::OnPremises
        } else {
            Hosting::Cloud
        }
    }

    /// Base URL for all requests: the org URL for cloud, org URL plus the
    /// collection segment on-premises.
    pub fn base_url(&self) -> String {
        match (&self.collection, self.is_on_premises) {
            (Some(collection), true) => {
                format!("{}/{}", self.org_url.trim_end_matches('/'), collection)
            }
            _ => self.org_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn sanitized(&self) -> SanitizedConfig {
        let has_password = matches!(
            &self.auth,
            AuthenticationDescriptor::Basic { password, .. }
                | AuthenticationDescriptor::Ntlm { password, .. } if !password.is_empty()
        );
        SanitizedConfig {
            org_url: mask_url_host(&self.org_url),
            project: self.project.clone(),
            has_token: !self.personal_access_token.is_empty(),
            has_password,
            is_on_premises: self.is_on_premises,
            collection: self.collection.clone(),
            api_version: self.api_version.clone(),
            auth_type: self.auth.kind(),
        }
    }
}

fn resolve_auth(
    kind: AuthKind,
    hosting: Hosting,
    settings: &EnvSettings,
    token: &str,
    entra_handler: Option<Arc<dyn CredentialHandler>>,
) -> Result<AuthenticationDescriptor, ConfigError> {
    match (kind, hosting) {
        (AuthKind::Entra, Hosting::OnPremises)
        | (AuthKind::Ntlm | AuthKind::Basic, Hosting::Cloud) => {
            Err(ConfigError::UnsupportedAuthForHosting {
                auth: kind,
                hosting,
            })
        }
        (AuthKind::Entra, Hosting::Cloud) => entra_handler
            .map(AuthenticationDescriptor::Entra)
            .ok_or(ConfigError::MissingCredentialHandler),
        (AuthKind::Ntlm, Hosting::OnPremises) => {
            let (username, password) = require_username_password(kind, settings)?;
            Ok(AuthenticationDescriptor::Ntlm {
                username,
                password,
                domain: non_blank(&settings.domain),
            })
        }
        (AuthKind::Basic, Hosting::OnPremises) => {
            let (username, password) = require_username_password(kind, settings)?;
            Ok(AuthenticationDescriptor::Basic { username, password })
        }
        (AuthKind::Pat, _) => {
            if token.is_empty() {
                Err(ConfigError::MissingToken)
            } else {
                Ok(AuthenticationDescriptor::Pat)
            }
        }
    }
}

fn require_username_password(
    kind: AuthKind,
    settings: &EnvSettings,
) -> Result<(String, String), ConfigError> {
    match (non_blank(&settings.username), non_blank(&settings.password)) {
        (Some(username), Some(password)) => Ok((username, password)),
        (username, password) => {
            let mut fields = Vec::new();
            if username.is_none() {
                fields.push(USERNAME_VAR);
            }
            if password.is_none() {
                fields.push(PASSWORD_VAR);
            }
            Err(ConfigError::MissingCredentials { auth: kind, fields })
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Replaces the host of `url` with `***`, keeping scheme and path.
pub fn mask_url_host(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => format!(
            "{}://***{}",
            parsed.scheme(),
            parsed.path().trim_end_matches('/')
        ),
        Err(_) => "***".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::azure::auth::MockCredentialHandler;

    fn cloud_pat() -> EnvSettings {
        EnvSettings {
            org_url: Some("https://dev.azure.com/contoso".into()),
            project: Some("Fabrikam".into()),
            personal_access_token: Some("secret-pat".into()),
            ..Default::default()
        }
    }

    fn on_premises(auth_type: &str) -> EnvSettings {
        EnvSettings {
            org_url: Some("https://ado.example.com".into()),
            project: Some("Fabrikam".into()),
            is_on_premises: Some("true".into()),
            collection: Some("DefaultCollection".into()),
            auth_type: Some(auth_type.into()),
            username: Some("jdoe".into()),
            password: Some("hunter2".into()),
            personal_access_token: Some("secret-pat".into()),
            ..Default::default()
        }
    }

    fn entra_handler() -> Arc<dyn CredentialHandler> {
        let mut handler = MockCredentialHandler::new();
        handler.expect_kind().return_const("entra");
        Arc::new(handler)
    }

    #[test]
    fn missing_org_url_and_project_are_reported_together() {
        let err = AzureDevOpsConfig::resolve(&EnvSettings::default(), None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRequiredField {
                fields: vec![ORG_URL_VAR, PROJECT_VAR]
            }
        );
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: AZURE_DEVOPS_ORG_URL, AZURE_DEVOPS_PROJECT"
        );
    }

    #[test]
    fn missing_project_only_names_project() {
        let settings = EnvSettings {
            project: None,
            ..cloud_pat()
        };
        let err = AzureDevOpsConfig::resolve(&settings, None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRequiredField {
                fields: vec![PROJECT_VAR]
            }
        );
    }

    #[test]
    fn blank_org_url_counts_as_missing() {
        let settings = EnvSettings {
            org_url: Some("   ".into()),
            ..cloud_pat()
        };
        let err = AzureDevOpsConfig::resolve(&settings, None).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingRequiredField {
                fields: vec![ORG_URL_VAR]
            }
        );
    }

    #[test]
    fn defaults_to_pat_on_cloud() {
        let config = AzureDevOpsConfig::resolve(&cloud_pat(), None).unwrap();
        assert_eq!(config.auth.kind(), AuthKind::Pat);
        assert_eq!(config.hosting(), Hosting::Cloud);
        assert_eq!(config.personal_access_token, "secret-pat");
    }

    #[test]
    fn unrecognized_auth_type_falls_back_to_pat() {
        for raw in ["kerberos", "", "PATT", "oauth"] {
            let settings = EnvSettings {
                auth_type: Some(raw.into()),
                ..cloud_pat()
            };
            let config = AzureDevOpsConfig::resolve(&settings, None).unwrap();
            assert_eq!(config.auth.kind(), AuthKind::Pat, "auth type {raw:?}");
        }
    }

    #[test]
    fn auth_type_is_case_insensitive() {
        let config = AzureDevOpsConfig::resolve(&on_premises(" NTLM "), None).unwrap();
        assert_eq!(config.auth.kind(), AuthKind::Ntlm);
    }

    #[test]
    fn pat_requires_token() {
        let settings = EnvSettings {
            personal_access_token: None,
            ..cloud_pat()
        };
        assert_eq!(
            AzureDevOpsConfig::resolve(&settings, None).unwrap_err(),
            ConfigError::MissingToken
        );

        let settings = EnvSettings {
            personal_access_token: None,
            ..on_premises("pat")
        };
        assert_eq!(
            AzureDevOpsConfig::resolve(&settings, None).unwrap_err(),
            ConfigError::MissingToken
        );
    }

    #[test]
    fn entra_on_premises_always_fails() {
        let err = AzureDevOpsConfig::resolve(&on_premises("entra"), Some(entra_handler()))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnsupportedAuthForHosting {
                auth: AuthKind::Entra,
                hosting: Hosting::OnPremises
            }
        );
    }

    #[test]
    fn entra_on_cloud_requires_handler() {
        let settings = EnvSettings {
            auth_type: Some("entra".into()),
            personal_access_token: None,
            ..cloud_pat()
        };
        assert_eq!(
            AzureDevOpsConfig::resolve(&settings, None).unwrap_err(),
            ConfigError::MissingCredentialHandler
        );

        let config = AzureDevOpsConfig::resolve(&settings, Some(entra_handler())).unwrap();
        assert_eq!(config.auth.kind(), AuthKind::Entra);
        assert!(config.personal_access_token.is_empty());
    }

    #[test]
    fn ntlm_and_basic_on_cloud_always_fail() {
        for kind in ["ntlm", "basic"] {
            let settings = EnvSettings {
                auth_type: Some(kind.into()),
                username: Some("jdoe".into()),
                password: Some("hunter2".into()),
                ..cloud_pat()
            };
            let err = AzureDevOpsConfig::resolve(&settings, None).unwrap_err();
            assert!(
                matches!(
                    err,
                    ConfigError::UnsupportedAuthForHosting {
                        hosting: Hosting::Cloud,
                        ..
                    }
                ),
                "{kind}: {err:?}"
            );
        }
    }

    #[test]
    fn basic_requires_password() {
        let settings = EnvSettings {
            password: None,
            ..on_premises("basic")
        };
        assert_eq!(
            AzureDevOpsConfig::resolve(&settings, None).unwrap_err(),
            ConfigError::MissingCredentials {
                auth: AuthKind::Basic,
                fields: vec![PASSWORD_VAR]
            }
        );
    }

    #[test]
    fn ntlm_carries_optional_domain() {
        let settings = EnvSettings {
            domain: Some("CORP".into()),
            ..on_premises("ntlm")
        };
        let config = AzureDevOpsConfig::resolve(&settings, None).unwrap();
        match config.auth {
            AuthenticationDescriptor::Ntlm {
                username,
                password,
                domain,
            } => {
                assert_eq!(username, "jdoe");
                assert_eq!(password, "hunter2");
                assert_eq!(domain.as_deref(), Some("CORP"));
            }
            other => panic!("unexpected auth {other:?}"),
        }
    }

    #[test]
    fn on_premises_flag_requires_exact_literal() {
        for raw in ["TRUE", "1", "yes"] {
            let settings = EnvSettings {
                is_on_premises: Some(raw.into()),
                ..cloud_pat()
            };
            let config = AzureDevOpsConfig::resolve(&settings, None).unwrap();
            assert!(!config.is_on_premises, "{raw}");
        }
    }

    #[test]
    fn on_premises_base_url_appends_collection() {
        let config = AzureDevOpsConfig::resolve(&on_premises("pat"), None).unwrap();
        assert_eq!(config.base_url(), "https://ado.example.com/DefaultCollection");
    }

    #[test]
    fn cloud_base_url_ignores_collection() {
        let settings = EnvSettings {
            collection: Some("DefaultCollection".into()),
            ..cloud_pat()
        };
        let config = AzureDevOpsConfig::resolve(&settings, None).unwrap();
        assert_eq!(config.base_url(), "https://dev.azure.com/contoso");
    }

    #[test]
    fn cloud_base_url_drops_trailing_slash() {
        let settings = EnvSettings {
            org_url: Some("https://dev.azure.com/contoso/".into()),
            ..cloud_pat()
        };
        let config = AzureDevOpsConfig::resolve(&settings, None).unwrap();
        assert_eq!(config.base_url(), "https://dev.azure.com/contoso");
    }

    #[test]
    fn sanitized_config_hides_secrets() {
        let config = AzureDevOpsConfig::resolve(&on_premises("basic"), None).unwrap();
        let sanitized = config.sanitized();
        assert_eq!(sanitized.org_url, "https://***");
        assert!(sanitized.has_token);
        assert!(sanitized.has_password);

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret-pat"));
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("ado.example.com"));
    }

    #[test]
    fn mask_url_host_keeps_path() {
        assert_eq!(
            mask_url_host("https://dev.azure.com/contoso"),
            "https://***/contoso"
        );
        assert_eq!(mask_url_host("not a url"), "***");
    }
}
