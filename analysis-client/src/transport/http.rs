use super::Transport;
use crate::error::Result;
use crate::form::FormData;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, Response};
use url::Url;

/// Posts forms over HTTP, resolving paths against the origin of `base_url`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: Url) -> HttpTransport {
        HttpTransport { client, base_url }
    }

    pub fn from_base(base_url: &str) -> Result<HttpTransport> {
        Ok(HttpTransport::new(Client::new(), Url::parse(base_url)?))
    }

    fn destination(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, path: &str, form: FormData) -> Result<Bytes> {
        let destination_address: Url = self.destination(path)?;
        log::debug!(
            "posting {} field(s) to {}",
            form.fields().len(),
            destination_address
        );

        let response: Response = self
            .client
            .post(destination_address)
            .multipart(form.into_multipart()?)
            .send()
            .await?;
        log::debug!("{} answered {}", response.url(), response.status());

        Ok(response.bytes().await?)
    }
}
