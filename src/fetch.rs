use crate::error::FetchError;
use crate::settings::Settings;
use tracing::debug;

/// Thin wrapper around a configured [`reqwest::Client`].
///
/// Every call issues exactly one request; there is no retry and no throttling.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(settings: &Settings) -> Result<Fetcher, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()?;
        Ok(Fetcher { client })
    }

    /// Returns the response body. Non-2xx responses are reported as [`FetchError::Status`].
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!("Visit {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        Ok(response.text().await?)
    }
}
