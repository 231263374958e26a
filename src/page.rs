use crate::error::FetchError;
use async_trait::async_trait;

#[async_trait]
pub trait PageSource {
    async fn fetch(&self) -> Result<String, FetchError>;
}

/// Plain GET of the watched page. HTTP status is not inspected; only
/// transport failures are errors.
pub struct HttpPageSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPageSource {
    pub fn new(url: &str, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let err = |e: reqwest::Error| FetchError {
            url: self.url.clone(),
            message: e.to_string(),
        };
        let res = self.client.get(&self.url).send().await.map_err(err)?;
        tracing::debug!(status = %res.status(), url = %self.url, "Fetched page");
        res.text().await.map_err(err)
    }
}
