//! DigitalOcean API surface used by the adapter
//!
//! [`DigitalOceanApi`] is the connection type of the adapter. The REST
//! implementation lives in [`crate::client`]; tests substitute fakes.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait DigitalOceanApi: Send + Sync {
    async fn list_droplets(&self) -> Result<Vec<Droplet>>;

    async fn list_sizes(&self) -> Result<Vec<Size>>;

    async fn list_regions(&self) -> Result<Vec<Region>>;

    /// Get an image by numeric id or slug
    async fn get_image(&self, id_or_slug: &str) -> Result<Image>;

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet>;

    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>>;

    async fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey>;
}

/// Droplet information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Droplet {
    pub id: u64,
    pub name: String,

    /// `new`, `active`, `off` or `archive`
    pub status: String,

    pub size_slug: String,
    pub image: Image,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Droplet {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: u64,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub slug: String,

    /// Memory in MB
    pub memory: u32,

    pub vcpus: u32,

    /// Disk in GB
    pub disk: u32,

    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub slug: String,
    pub name: String,

    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshKey {
    pub id: u64,
    pub fingerprint: String,
    pub public_key: String,
    pub name: String,
}

/// Image reference accepted by droplet creation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImageRef {
    Id(u64),
    Slug(String),
}

impl From<&Image> for ImageRef {
    fn from(image: &Image) -> Self {
        ImageRef::Id(image.id)
    }
}

/// Request body for `POST /v2/droplets`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDropletRequest {
    pub name: String,
    pub region: String,
    pub size: String,
    pub image: ImageRef,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
