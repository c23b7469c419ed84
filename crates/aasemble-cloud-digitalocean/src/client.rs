//! DigitalOcean v2 REST client
//!
//! Bearer token authentication against `https://api.digitalocean.com/v2`.

use crate::api::{CreateDropletRequest, DigitalOceanApi, Droplet, Image, Region, Size, SshKey};
use crate::error::{DigitalOceanError, Result};
use aasemble_cloud::{CloudError, DriverArgs, DriverFactory};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub const PROVIDER: &str = "digitalocean";
pub const API_VERSION: &str = "v2";

const DIGITALOCEAN_API_BASE: &str = "https://api.digitalocean.com/v2";
const PER_PAGE: u32 = 200;

/// DigitalOcean REST client
pub struct DigitalOceanClient {
    client: reqwest::Client,
    api_token: String,
    base_url: String,
}

impl DigitalOceanClient {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_token: api_token.into(),
            base_url: DIGITALOCEAN_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check the response status and decode the JSON body
    async fn read_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body: Value = response.json().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Unknown error")
            .to_string();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(DigitalOceanError::AuthenticationFailed(message));
        }

        Err(DigitalOceanError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get(&self, url: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_token)
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(body)
            .send()
            .await?;
        Self::read_response(response).await
    }

    /// GET a paginated collection, following `links.pages.next`
    async fn get_all<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(format!("{}?per_page={}", self.url(path), PER_PAGE));

        while let Some(url) = next.take() {
            let mut page = self.get(&url).await?;
            let chunk: Vec<T> = serde_json::from_value(take_field(&mut page, key)?)?;
            items.extend(chunk);

            next = page
                .pointer("/links/pages/next")
                .and_then(Value::as_str)
                .map(str::to_string);
        }

        Ok(items)
    }
}

fn take_field(body: &mut Value, key: &str) -> Result<Value> {
    body.get_mut(key)
        .map(Value::take)
        .ok_or_else(|| DigitalOceanError::Api {
            status: 200,
            message: format!("response is missing `{}`", key),
        })
}

#[async_trait]
impl DigitalOceanApi for DigitalOceanClient {
    async fn list_droplets(&self) -> Result<Vec<Droplet>> {
        self.get_all("/droplets", "droplets").await
    }

    async fn list_sizes(&self) -> Result<Vec<Size>> {
        self.get_all("/sizes", "sizes").await
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        self.get_all("/regions", "regions").await
    }

    async fn get_image(&self, id_or_slug: &str) -> Result<Image> {
        let mut body = self.get(&self.url(&format!("/images/{}", id_or_slug))).await?;
        Ok(serde_json::from_value(take_field(&mut body, "image")?)?)
    }

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet> {
        let mut body = self.post("/droplets", request).await?;
        Ok(serde_json::from_value(take_field(&mut body, "droplet")?)?)
    }

    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        self.get_all("/account/keys", "ssh_keys").await
    }

    async fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey> {
        let request = serde_json::json!({ "name": name, "public_key": public_key });
        let mut body = self.post("/account/keys", &request).await?;
        Ok(serde_json::from_value(take_field(&mut body, "ssh_key")?)?)
    }
}

/// Builds [`DigitalOceanClient`] connections from driver arguments
///
/// Expects the API token as the first positional argument and an optional
/// `api_version` keyword argument, which must be `v2`.
#[derive(Debug, Clone, Default)]
pub struct DigitalOceanDriverFactory {
    base_url: Option<String>,
}

impl DigitalOceanDriverFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn build(&self, args: &DriverArgs) -> Result<DigitalOceanClient> {
        let api_key = args.arg(0).and_then(Value::as_str).ok_or_else(|| {
            DigitalOceanError::InvalidDriverArgs("expected the API key as first argument".into())
        })?;

        let version = args.kwarg_str("api_version").unwrap_or(API_VERSION);
        if version != API_VERSION {
            return Err(DigitalOceanError::UnsupportedApiVersion(version.to_string()));
        }

        let client = DigitalOceanClient::new(api_key);
        Ok(match &self.base_url {
            Some(url) => client.with_base_url(url.as_str()),
            None => client,
        })
    }
}

impl DriverFactory<Arc<dyn DigitalOceanApi>> for DigitalOceanDriverFactory {
    fn connect(
        &self,
        provider: &str,
        args: &DriverArgs,
    ) -> aasemble_cloud::Result<Arc<dyn DigitalOceanApi>> {
        if provider != PROVIDER {
            return Err(CloudError::ProviderNotFound(provider.to_string()));
        }
        let client = self.build(args)?;
        Ok(Arc::new(client))
    }
}
