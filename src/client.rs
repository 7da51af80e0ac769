//! The remote side of file deletion.
//!
//! [`FileHandle::delete`](crate::FileHandle::delete) only needs one
//! capability from the file service, captured by [`FileClient`]. Callers
//! can inject their own implementation; otherwise a process-wide
//! [`HttpFileClient`] configured from the environment is created on first
//! use and reused afterwards.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v1beta";

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";
pub const ENDPOINT_VAR: &str = "GOOGLE_API_ENDPOINT";
pub const API_VERSION_VAR: &str = "GOOGLE_API_VERSION";

const API_KEY_HEADER: &str = "x-goog-api-key";

static DEFAULT_CLIENT: OnceCell<Arc<dyn FileClient>> = OnceCell::new();

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Server responded with {code}: {message}")]
    Status { code: u16, message: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Operations of the file service this crate delegates to.
pub trait FileClient: Send + Sync {
    /// Delete the file with the given resource name on the server.
    fn delete_file(&self, name: &str) -> Result<(), ClientError>;
}

/// Where and how to reach the file service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_key: String,
    pub endpoint: Url,
    pub api_version: String,
}

impl ClientConfig {
    pub fn new(api_key: String, endpoint: Url) -> Self {
        Self {
            api_key,
            endpoint,
            api_version: DEFAULT_API_VERSION.to_owned(),
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// The API key is required, endpoint and API version fall back to
    /// [`DEFAULT_ENDPOINT`] and [`DEFAULT_API_VERSION`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let api_key = lookup(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ClientError::Config(format!("{} is not set", API_KEY_VAR))
            })?;

        let endpoint =
            lookup(ENDPOINT_VAR).unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned());
        let endpoint = Url::parse(&endpoint).map_err(|err| {
            ClientError::Config(format!(
                "{} is not a valid URL ({}): {}",
                ENDPOINT_VAR, endpoint, err
            ))
        })?;

        let api_version = lookup(API_VERSION_VAR)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());

        Ok(Self {
            api_key,
            endpoint,
            api_version,
        })
    }
}

/// REST implementation of [`FileClient`].
///
/// Calls are blocking: each one runs to completion on a private
/// current-thread runtime, so it must not be used from inside another
/// tokio runtime.
pub struct HttpFileClient {
    config: ClientConfig,
    http: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpFileClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            config,
            http,
            runtime,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Address of the resource `name`, e.g. `files/abc`.
    pub fn resource_url(&self, name: &str) -> Result<Url, ClientError> {
        let url = format!(
            "{}/{}/{}",
            self.config.endpoint.as_str().trim_end_matches('/'),
            self.config.api_version,
            name.trim_start_matches('/')
        );
        Url::parse(&url).map_err(|err| {
            ClientError::Config(format!("Bad resource URL {}: {}", url, err))
        })
    }

    async fn delete_file_async(&self, name: &str) -> Result<(), ClientError> {
        let url = self.resource_url(name)?;
        let response = self
            .http
            .delete(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, name, body))
    }
}

impl FileClient for HttpFileClient {
    fn delete_file(&self, name: &str) -> Result<(), ClientError> {
        log::debug!("Deleting {} at {}", name, self.config.endpoint);
        self.runtime.block_on(self.delete_file_async(name))
    }
}

fn status_error(status: StatusCode, name: &str, body: String) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(name.to_owned()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::PermissionDenied(name.to_owned())
        }
        _ => ClientError::Status {
            code: status.as_u16(),
            message: body,
        },
    }
}

/// The process-wide client, created from [`ClientConfig::from_env`] the
/// first time it is requested.
pub fn default_file_client() -> Result<Arc<dyn FileClient>, ClientError> {
    DEFAULT_CLIENT
        .get_or_try_init(|| {
            let config = ClientConfig::from_env()?;
            log::info!("Creating default file client for {}", config.endpoint);
            let client: Arc<dyn FileClient> =
                Arc::new(HttpFileClient::new(config)?);
            Ok(client)
        })
        .cloned()
}

/// Install `client` as the process-wide default.
///
/// Returns `false` if a default client already exists, in which case
/// the existing one stays in place.
pub fn set_default_file_client(client: Arc<dyn FileClient>) -> bool {
    DEFAULT_CLIENT.set(client).is_ok()
}
