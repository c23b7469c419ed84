//! In-memory DigitalOcean API for tests

use crate::api::{
    CreateDropletRequest, DigitalOceanApi, Droplet, Image, ImageRef, Region, Size, SshKey,
};
use crate::error::{DigitalOceanError, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Created droplets show up as `active` in later listings.
pub struct FakeApi {
    droplets: Mutex<Vec<Droplet>>,
    sizes: Vec<Size>,
    regions: Vec<Region>,
    images: Vec<Image>,
    ssh_keys: Mutex<Vec<SshKey>>,
    image_requests: Mutex<Vec<String>>,
    imported_keys: Mutex<Vec<String>>,
    created_droplets: Mutex<Vec<CreateDropletRequest>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            droplets: Mutex::new(Vec::new()),
            sizes: vec![
                size("512mb", 512, 1, 20),
                size("2gb", 2048, 2, 40),
                size("4gb", 4096, 2, 60),
            ],
            regions: vec![region("fra1", "Frankfurt 1"), region("ams3", "Amsterdam 3")],
            images: vec![
                image(127237412, None),
                image(6918990, Some("ubuntu-14-04-x64")),
                image(17154032, Some("ubuntu-16-04-x64")),
            ],
            ssh_keys: Mutex::new(Vec::new()),
            image_requests: Mutex::new(Vec::new()),
            imported_keys: Mutex::new(Vec::new()),
            created_droplets: Mutex::new(Vec::new()),
        }
    }

    pub fn with_droplets(self, droplets: Vec<Droplet>) -> Self {
        *self.droplets.lock().unwrap() = droplets;
        self
    }

    pub fn with_ssh_key(self, key: SshKey) -> Self {
        self.ssh_keys.lock().unwrap().push(key);
        self
    }

    /// A droplet running the custom image 127237412
    pub fn droplet(name: &str, status: &str, size_slug: &str) -> Droplet {
        Droplet {
            id: 3164444,
            name: name.to_string(),
            status: status.to_string(),
            size_slug: size_slug.to_string(),
            image: image(127237412, None),
            tags: Vec::new(),
        }
    }

    pub fn image_requests(&self) -> Vec<String> {
        self.image_requests.lock().unwrap().clone()
    }

    pub fn imported_keys(&self) -> Vec<String> {
        self.imported_keys.lock().unwrap().clone()
    }

    pub fn created_droplets(&self) -> Vec<CreateDropletRequest> {
        self.created_droplets.lock().unwrap().clone()
    }
}

fn size(slug: &str, memory: u32, vcpus: u32, disk: u32) -> Size {
    Size {
        slug: slug.to_string(),
        memory,
        vcpus,
        disk,
        available: true,
    }
}

fn region(slug: &str, name: &str) -> Region {
    Region {
        slug: slug.to_string(),
        name: name.to_string(),
        available: true,
    }
}

fn image(id: u64, slug: Option<&str>) -> Image {
    Image {
        id,
        slug: slug.map(str::to_string),
        name: None,
    }
}

fn not_found() -> DigitalOceanError {
    DigitalOceanError::Api {
        status: 404,
        message: "The resource you were accessing could not be found.".to_string(),
    }
}

#[async_trait]
impl DigitalOceanApi for FakeApi {
    async fn list_droplets(&self) -> Result<Vec<Droplet>> {
        Ok(self.droplets.lock().unwrap().clone())
    }

    async fn list_sizes(&self) -> Result<Vec<Size>> {
        Ok(self.sizes.clone())
    }

    async fn list_regions(&self) -> Result<Vec<Region>> {
        Ok(self.regions.clone())
    }

    async fn get_image(&self, id_or_slug: &str) -> Result<Image> {
        self.image_requests
            .lock()
            .unwrap()
            .push(id_or_slug.to_string());
        self.images
            .iter()
            .find(|i| i.id.to_string() == id_or_slug || i.slug.as_deref() == Some(id_or_slug))
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_droplet(&self, request: &CreateDropletRequest) -> Result<Droplet> {
        let mut created = self.created_droplets.lock().unwrap();
        created.push(request.clone());

        let image_id = match &request.image {
            ImageRef::Id(id) => *id,
            ImageRef::Slug(_) => 0,
        };
        let droplet = Droplet {
            id: 1000 + created.len() as u64,
            name: request.name.clone(),
            status: "new".to_string(),
            size_slug: request.size.clone(),
            image: image(image_id, None),
            tags: request.tags.clone(),
        };
        self.droplets.lock().unwrap().push(Droplet {
            status: "active".to_string(),
            ..droplet.clone()
        });
        Ok(droplet)
    }

    async fn list_ssh_keys(&self) -> Result<Vec<SshKey>> {
        Ok(self.ssh_keys.lock().unwrap().clone())
    }

    async fn create_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey> {
        self.imported_keys
            .lock()
            .unwrap()
            .push(public_key.to_string());

        let mut keys = self.ssh_keys.lock().unwrap();
        let key = SshKey {
            id: 512190 + keys.len() as u64,
            fingerprint: format!("fp:{}", public_key),
            public_key: public_key.to_string(),
            name: name.to_string(),
        };
        keys.push(key.clone());
        Ok(key)
    }
}
