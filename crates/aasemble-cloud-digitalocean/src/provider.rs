//! DigitalOcean adapter implementation

use crate::api::{
    CreateDropletRequest, DigitalOceanApi, Droplet, Image, ImageRef, Region, Size, SshKey,
};
use crate::client::{API_VERSION, PROVIDER};
use aasemble_cloud::mapping::{FLAVORS, IMAGES};
use aasemble_cloud::{
    BoundedPool, CloudAdapter, CloudConfig, CreateOutcome, DriverArgs, Mappings, Node, Result,
    SecurityGroup, SecurityGroupRule, WorkerPool, expand_path, get_resource_by_attr,
    namespace_matches,
};
use async_trait::async_trait;
use futures_util::FutureExt;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Tag prefix carrying a droplet's namespace
pub const NAMESPACE_TAG_PREFIX: &str = "aasemble-namespace:";

/// Connection options read from a cloud config
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitalOceanConfig {
    pub api_key: String,

    /// Region slug, e.g. `fra1`
    pub location: String,

    /// Public key to install on created droplets
    pub ssh_key_file: Option<PathBuf>,
}

/// Optional droplet creation settings contributed by the adapter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateNodeOptions {
    /// Key fingerprints
    pub ssh_keys: Option<Vec<String>>,

    /// cloud-init user data
    pub user_data: Option<String>,
}

/// DigitalOcean adapter
pub struct DigitalOceanAdapter<P = BoundedPool> {
    api_key: String,
    location: String,
    ssh_key_file: Option<PathBuf>,
    mappings: Mappings,
    pool: P,
}

impl DigitalOceanAdapter<BoundedPool> {
    pub fn new(config: DigitalOceanConfig) -> Self {
        Self::with_pool(config, BoundedPool::default())
    }

    /// Read connection options from the `connection` section
    ///
    /// `api_key` and `location` are required; `sshkey` is optional.
    pub fn get_kwargs_from_cloud_config(config: &CloudConfig) -> Result<DigitalOceanConfig> {
        Ok(DigitalOceanConfig {
            api_key: config.required("connection", "api_key")?,
            location: config.required("connection", "location")?,
            ssh_key_file: config.optional("connection", "sshkey")?.map(PathBuf::from),
        })
    }
}

impl<P: WorkerPool> DigitalOceanAdapter<P> {
    pub fn with_pool(config: DigitalOceanConfig, pool: P) -> Self {
        Self {
            api_key: config.api_key,
            location: config.location,
            ssh_key_file: config.ssh_key_file,
            mappings: default_mappings(),
            pool,
        }
    }

    /// Overlay `mappings` on the built-in defaults
    pub fn with_mappings(mut self, mappings: Mappings) -> Self {
        self.mappings.merge(mappings);
        self
    }

    pub fn set_ssh_key_file(&mut self, path: Option<PathBuf>) {
        self.ssh_key_file = path;
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn apply_mappings<'a>(&'a self, category: &str, name: &'a str) -> &'a str {
        self.mappings.apply(category, name)
    }

    /// Resolve a logical or provider image name
    pub async fn get_image(&self, conn: &Arc<dyn DigitalOceanApi>, name: &str) -> Result<Image> {
        let image = self.apply_mappings(IMAGES, name);
        Ok(conn.get_image(image).await?)
    }

    /// Resolve a logical or provider flavor name
    pub async fn resolve_size(
        &self,
        conn: &Arc<dyn DigitalOceanApi>,
        flavor: &str,
    ) -> Result<Size> {
        let slug = self.apply_mappings(FLAVORS, flavor);
        self.get_size(conn, slug).await
    }

    pub async fn get_size(&self, conn: &Arc<dyn DigitalOceanApi>, slug: &str) -> Result<Size> {
        let sizes = conn.list_sizes().await?;
        get_resource_by_attr(sizes, "slug", slug, |s| s.slug.as_str())
    }

    pub async fn get_location(
        &self,
        conn: &Arc<dyn DigitalOceanApi>,
        slug: &str,
    ) -> Result<Region> {
        let regions = conn.list_regions().await?;
        get_resource_by_attr(regions, "slug", slug, |r| r.slug.as_str())
    }

    /// Find the account key with this public key, importing it if missing
    pub async fn find_or_import_keypair_by_key_material(
        &self,
        conn: &Arc<dyn DigitalOceanApi>,
        public_key: &str,
    ) -> Result<SshKey> {
        let public_key = public_key.trim();
        let keys = conn.list_ssh_keys().await?;
        if let Some(key) = keys.into_iter().find(|k| k.public_key.trim() == public_key) {
            tracing::debug!("Using existing SSH key {} ({})", key.name, key.fingerprint);
            return Ok(key);
        }

        let name = key_name(public_key);
        tracing::info!("Importing SSH key {}", name);
        Ok(conn.create_ssh_key(&name, public_key).await?)
    }

    /// Attach the configured SSH key, if any
    pub async fn add_key_pair_info(
        &self,
        conn: &Arc<dyn DigitalOceanApi>,
        options: &mut CreateNodeOptions,
    ) -> Result<()> {
        let Some(path) = &self.ssh_key_file else {
            return Ok(());
        };

        let material = tokio::fs::read_to_string(expand_path(path)).await?;
        let key = self
            .find_or_import_keypair_by_key_material(conn, &material)
            .await?;
        options.ssh_keys = Some(vec![key.fingerprint]);
        Ok(())
    }

    /// Attach the node's script as user data, if it has one
    pub fn add_script_info(&self, node: &Node, options: &mut CreateNodeOptions) {
        if let Some(script) = node.script.as_deref().filter(|s| !s.is_empty()) {
            options.user_data = Some(script.to_string());
        }
    }
}

fn default_mappings() -> Mappings {
    Mappings::new()
        .with(IMAGES, "trusty", "ubuntu-14-04-x64")
        .with(IMAGES, "xenial", "ubuntu-16-04-x64")
        .with(FLAVORS, "small", "512mb")
        .with(FLAVORS, "medium", "2gb")
        .with(FLAVORS, "large", "4gb")
}

/// Droplet tag recording `namespace`
fn namespace_tag(namespace: &str) -> String {
    format!("{}{}", NAMESPACE_TAG_PREFIX, namespace)
}

/// Name for an imported key: its comment, or a fixed fallback
fn key_name(public_key: &str) -> String {
    public_key
        .split_whitespace()
        .nth(2)
        .map(|comment| format!("aasemble-{}", comment))
        .unwrap_or_else(|| "aasemble".to_string())
}

#[async_trait]
impl<P: WorkerPool> CloudAdapter for DigitalOceanAdapter<P> {
    type Connection = Arc<dyn DigitalOceanApi>;
    type ProviderNode = Droplet;

    fn provider(&self) -> &str {
        PROVIDER
    }

    fn name(&self) -> &str {
        "Digital Ocean"
    }

    fn driver_args(&self) -> DriverArgs {
        DriverArgs::new()
            .with_arg(self.api_key.as_str())
            .with_kwarg("api_version", API_VERSION)
    }

    async fn detect_provider_nodes(&self, conn: &Self::Connection) -> Result<Vec<Droplet>> {
        Ok(conn.list_droplets().await?)
    }

    fn get_namespace<'a>(&self, node: &'a Droplet) -> Option<&'a str> {
        node.tags
            .iter()
            .find_map(|tag| tag.strip_prefix(NAMESPACE_TAG_PREFIX))
    }

    /// Only running droplets are considered
    fn is_node_relevant(&self, node: &Droplet, namespace: Option<&str>) -> bool {
        node.is_active() && namespace_matches(namespace, self.get_namespace(node))
    }

    async fn node_from_provider_node(
        &self,
        conn: &Self::Connection,
        node: Droplet,
    ) -> Result<Node> {
        let size = self.get_size(conn, &node.size_slug).await?;

        Ok(Node::new(
            node.name.as_str(),
            node.size_slug.as_str(),
            node.image.id.to_string(),
            size.disk,
        )
        .with_private(node))
    }

    /// Size lookups for all droplets run through the worker pool
    async fn nodes_from_provider_nodes(
        &self,
        conn: &Self::Connection,
        nodes: Vec<Droplet>,
    ) -> Result<Vec<Node>> {
        let tasks: Vec<_> = nodes
            .into_iter()
            .map(|node| self.node_from_provider_node(conn, node).boxed())
            .collect();

        self.pool.map(tasks).await.into_iter().collect()
    }

    async fn detect_firewalls(
        &self,
        _conn: &Self::Connection,
    ) -> Result<(HashSet<SecurityGroup>, HashSet<SecurityGroupRule>)> {
        Ok((HashSet::new(), HashSet::new()))
    }

    async fn create_node(
        &self,
        conn: &Self::Connection,
        node: &Node,
        namespace: Option<&str>,
    ) -> Result<()> {
        let image = self.get_image(conn, &node.image).await?;
        let size = self.resolve_size(conn, &node.flavor).await?;
        let region = self.get_location(conn, &self.location).await?;

        let mut options = CreateNodeOptions::default();
        self.add_key_pair_info(conn, &mut options).await?;
        self.add_script_info(node, &mut options);

        let request = CreateDropletRequest {
            name: node.name.clone(),
            region: region.slug,
            size: size.slug,
            image: ImageRef::from(&image),
            ssh_keys: options.ssh_keys.unwrap_or_default(),
            user_data: options.user_data,
            tags: namespace.map(namespace_tag).into_iter().collect(),
        };

        let droplet = conn.create_droplet(&request).await?;
        tracing::info!("Created droplet {} (ID: {})", droplet.name, droplet.id);
        Ok(())
    }

    async fn create_security_group(
        &self,
        _conn: &Self::Connection,
        security_group: &SecurityGroup,
    ) -> Result<CreateOutcome> {
        tracing::warn!(
            "Security groups are not supported on DigitalOcean; skipping {}",
            security_group.name
        );
        Ok(CreateOutcome::Skipped)
    }

    async fn create_security_group_rule(
        &self,
        _conn: &Self::Connection,
        rule: &SecurityGroupRule,
    ) -> Result<CreateOutcome> {
        tracing::warn!(
            "Security group rules are not supported on DigitalOcean; skipping rule for {}",
            rule.security_group.name
        );
        Ok(CreateOutcome::Skipped)
    }
}
