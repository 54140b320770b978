use google_logging2::api::WriteLogEntriesRequest;

use chrono::{DateTime, TimeDelta, Utc};

use reqwest::{Client, Response};

use crate::error::Error;

/// Where the metadata server lives when running on GCP
pub const DEFAULT_METADATA_HOST: &str = "http://metadata.google.internal";

/// The Google Logging API
pub const DEFAULT_API_BASE: &str = "https://logging.googleapis.com";

/// Token caching
#[derive(Default)]
pub struct Token {
    token: Option<String>,
    renew_after: DateTime<Utc>,
}

async fn get_error_response(response: Response, context: String) -> Error {
    let status = response.status();

    let body = match response.bytes().await {
        Ok(bytes) => match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(json) => json.to_string(),
            Err(_) => String::from_utf8_lossy(&bytes).to_string(),
        },
        Err(e) => format!("could not decode body of HTTP Error response: {e}"),
    };

    Error::HttpResponseError {
        context,
        status,
        body,
    }
}

impl Token {
    fn renew_after_from_expires_in(expires_in: u64) -> DateTime<Utc> {
        let renew_after = TimeDelta::seconds(expires_in.saturating_sub(60) as i64);
        Utc::now() + renew_after
    }

    fn cached(&self) -> Option<&str> {
        match &self.token {
            Some(token) if Utc::now() < self.renew_after => Some(token),
            _ => None,
        }
    }

    async fn fetch_access_token(
        &mut self,
        client: &Client,
        metadata_host: &str,
    ) -> Result<String, Error> {
        if let Some(token) = self.cached() {
            return Ok(token.to_string());
        }

        let response = client
            .get(format!(
                "{metadata_host}/computeMetadata/v1/instance/service-accounts/default/token"
            ))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| Error::ReqwestError {
                context: "performing HTTP GET token credentials from metadata server".to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(get_error_response(response, "fetching token".to_string()).await);
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::ReqwestError {
                context: "consuming response body of access token request".to_string(),
                source: e,
            })?;
        let token_data: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::SerializeError {
                context: "deserializing token data".to_string(),
                source: e,
            })?;
        let token_str = token_data["access_token"]
            .as_str()
            .ok_or(Error::TokenNotFound)?
            .to_string();
        let expires_in = token_data["expires_in"]
            .as_u64()
            .ok_or(Error::TokenExpiryNotFound)?;

        self.token = Some(token_str.clone());
        self.renew_after = Self::renew_after_from_expires_in(expires_in);
        Ok(token_str)
    }
}

/// Talks HTTP to the metadata server and the Google Logging API
pub struct Shipper {
    client: Client,
    api_base: String,
    metadata_host: String,
    token: tokio::sync::Mutex<Token>,
    log: slog::Logger,
}

impl Shipper {
    pub fn new(api_base: String, metadata_host: String, log: slog::Logger) -> Self {
        Shipper {
            client: Client::new(),
            api_base,
            metadata_host,
            token: tokio::sync::Mutex::new(Token::default()),
            log,
        }
    }

    /// Asks the metadata server which project we are running in
    pub async fn fetch_project_id(&self) -> Result<String, Error> {
        let response = self
            .client
            .get(format!(
                "{}/computeMetadata/v1/project/project-id",
                self.metadata_host
            ))
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| Error::ReqwestError {
                context: "performing HTTP GET project id from metadata server".to_string(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(get_error_response(response, "fetching project id".to_string()).await);
        }

        let project = response.text().await?.trim().to_string();
        if project.is_empty() {
            return Err(Error::ProjectNotFound);
        }
        slog::debug!(self.log, "Resolved project from metadata server"; "project" => &project);
        Ok(project)
    }

    async fn access_token(&self) -> Result<String, Error> {
        let mut token = self.token.lock().await;
        if token.cached().is_none() {
            slog::debug!(self.log, "Fetching access token from metadata server");
        }
        token
            .fetch_access_token(&self.client, &self.metadata_host)
            .await
    }

    /// Sends one `entries:write` request
    pub async fn send_log_entries(&self, body: &WriteLogEntriesRequest) -> Result<(), Error> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/entries:write", self.api_base);

        slog::debug!(self.log, "Writing log entries";
            "log_name" => body.log_name.as_deref().unwrap_or_default(),
            "count" => body.entries.as_ref().map_or(0, Vec::len)
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::ReqwestError {
                context: "performing HTTP POST request to the Google Logging API".to_string(),
                source: e,
            })?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(get_error_response(
                response,
                "response when sending log entries to Google Logging API".to_string(),
            )
            .await)
        }
    }
}
