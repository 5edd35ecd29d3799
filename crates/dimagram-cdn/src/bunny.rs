use async_trait::async_trait;
use tracing::info;

use crate::config::CdnConfig;
use crate::error::{CdnError, CdnResult};
use crate::traits::CacheInvalidator;

/// Bunny.net purge API client.
///
/// Issues `POST {api_endpoint}?url=<target>` with the `AccessKey` header.
#[derive(Clone, Debug)]
pub struct BunnyPurger {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl BunnyPurger {
    pub fn new(config: &CdnConfig) -> CdnResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| CdnError::Config("api_key is not set".into()))?;
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.api_endpoint.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl CacheInvalidator for BunnyPurger {
    async fn purge(&self, url: &str) -> CdnResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("url", url)])
            .header("AccessKey", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CdnError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        info!(url, "CDN cache purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> CdnConfig {
        CdnConfig {
            api_key: Some("secret-key".into()),
            cdn_base_url: "https://cdn.example.com".into(),
            api_endpoint: format!("{}/purge", server.uri()),
            timeout_secs: 5,
        }
    }

    #[test]
    fn requires_api_key() {
        let err = BunnyPurger::new(&CdnConfig::default()).unwrap_err();
        assert!(matches!(err, CdnError::Config(_)));
    }

    #[tokio::test]
    async fn purge_sends_url_and_access_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/purge"))
            .and(query_param("url", "https://cdn.example.com/today.json"))
            .and(header("AccessKey", "secret-key"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let purger = BunnyPurger::new(&config_for(&server)).unwrap();
        purger.purge("https://cdn.example.com/today.json").await.unwrap();
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let purger = BunnyPurger::new(&config_for(&server)).unwrap();
        let err = purger.purge("https://cdn.example.com/today.json").await.unwrap_err();
        match err {
            CdnError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "bad key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn noop_always_succeeds() {
        crate::NoopInvalidator.purge("https://x/today.json").await.unwrap();
    }
}
