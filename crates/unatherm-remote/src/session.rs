//! HTTP session against the UNAFold two-state melting form.
//!
//! One session (one client, one cookie jar) is opened per run and reused
//! for every row. Each row reloads the form, posts the sequence with the
//! configured energy rules, then polls until the results table renders or
//! the element timeout passes.

use std::time::{Duration, Instant};

use reqwest::{Client, Url};
use tracing::{debug, info};
use unatherm_core::RemoteConfig;

use crate::error::RemoteError;
use crate::parse::{extract_results_row, form_action, has_input_field, parse_thermo_text};
use crate::service::{MeltingService, ServiceResponse};

/// A live session with the melting service.
pub struct UnafoldSession {
    client: Client,
    config: RemoteConfig,
    form_url: Url,
    requests: u64,
    closed: bool,
}

impl UnafoldSession {
    /// Build the HTTP client and check the form page is reachable.
    pub async fn open(config: RemoteConfig) -> Result<Self, RemoteError> {
        let form_url = Url::parse(&config.form_url)
            .map_err(|e| RemoteError::Session(format!("invalid form URL {}: {}", config.form_url, e)))?;
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.page_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| RemoteError::Session(format!("failed to build HTTP client: {}", e)))?;

        let mut session = Self {
            client,
            config,
            form_url,
            requests: 0,
            closed: false,
        };
        session
            .load_form()
            .await
            .map_err(|e| RemoteError::Session(format!("form page unavailable: {}", e)))?;

        info!(
            "Opened melting session: {} (energy rules {})",
            session.form_url, session.config.energy_model
        );
        Ok(session)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms.max(50))
    }

    fn element_timeout(&self) -> Duration {
        Duration::from_secs(self.config.element_timeout_secs)
    }

    async fn fetch(&mut self, request: reqwest::RequestBuilder) -> Result<(Url, String), RemoteError> {
        self.requests += 1;
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Http(format!("{} from {}", status, response.url())));
        }
        let url = response.url().clone();
        let body = response.text().await?;
        Ok((url, body))
    }

    /// Reset the interaction surface: reload the form and wait for the
    /// sequence field. Returns the URL the form posts to.
    async fn load_form(&mut self) -> Result<Url, RemoteError> {
        let deadline = Instant::now() + self.element_timeout();
        loop {
            let request = self.client.get(self.form_url.clone());
            let (page_url, body) = self.fetch(request).await?;
            if has_input_field(&body, &self.config.sequence_field) {
                let action = match form_action(&body) {
                    Some(action) => page_url.join(&action).map_err(|e| {
                        RemoteError::MalformedResponse(format!("form action {}: {}", action, e))
                    })?,
                    None => page_url,
                };
                return Ok(action);
            }
            if Instant::now() >= deadline {
                return Err(RemoteError::MissingElement(format!(
                    "input field '{}' on {}",
                    self.config.sequence_field, self.form_url
                )));
            }
            tokio::time::sleep(self.poll_interval()).await;
        }
    }

    /// Post the sequence and energy rules; returns the landing page.
    async fn submit(&mut self, action: Url, sequence: &str) -> Result<(Url, String), RemoteError> {
        let form = [
            (self.config.sequence_field.as_str(), sequence),
            (
                self.config.energy_field.as_str(),
                self.config.energy_model.form_value(),
            ),
        ];
        let request = self.client.post(action).form(&form);
        self.fetch(request).await
    }

    /// Poll the landing page until a results row renders.
    async fn await_results(&mut self, url: Url, first_body: String) -> Result<String, RemoteError> {
        let deadline = Instant::now() + self.element_timeout();
        let mut body = first_body;
        loop {
            if let Some(text) = extract_results_row(&body) {
                return Ok(text);
            }
            if Instant::now() >= deadline {
                return Err(RemoteError::Timeout(format!(
                    "results table did not render within {}s",
                    self.config.element_timeout_secs
                )));
            }
            tokio::time::sleep(self.poll_interval()).await;
            let request = self.client.get(url.clone());
            body = self.fetch(request).await?.1;
        }
    }

    /// Number of HTTP requests issued so far.
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Release the session.
    pub async fn close(mut self) {
        self.closed = true;
        info!("Closed melting session after {} requests", self.request_count());
    }
}

impl Drop for UnafoldSession {
    fn drop(&mut self) {
        if !self.closed {
            debug!(
                "Melting session dropped without close after {} requests",
                self.requests
            );
        }
    }
}

impl MeltingService for UnafoldSession {
    async fn compute(&mut self, sequence: &str) -> Result<ServiceResponse, RemoteError> {
        let action = self.load_form().await?;
        let (landing_url, body) = self.submit(action, sequence).await?;
        let result_text = self.await_results(landing_url, body).await?;
        debug!("Results row: {}", result_text);
        let params = parse_thermo_text(&result_text)?;
        Ok(ServiceResponse {
            params,
            result_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_rejects_invalid_url() {
        let config = RemoteConfig {
            form_url: "not a url".into(),
            ..RemoteConfig::default()
        };
        match UnafoldSession::open(config).await {
            Err(RemoteError::Session(msg)) => assert!(msg.contains("invalid form URL")),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("session opened with an invalid URL"),
        }
    }

    #[tokio::test]
    async fn test_open_unreachable_host_is_session_error() {
        let config = RemoteConfig {
            form_url: "http://127.0.0.1:9/form.php".into(),
            page_timeout_secs: 2,
            element_timeout_secs: 0,
            ..RemoteConfig::default()
        };
        let result = UnafoldSession::open(config).await;
        assert!(matches!(result, Err(RemoteError::Session(_))));
    }
}
