//! Provider adapter trait definition

use crate::error::Result;
use crate::model::{Node, SecurityGroup, SecurityGroupRule};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Cloud provider adapter trait
///
/// Every cloud backend implements this trait. The [`CloudDriver`] engine
/// owns the connection and drives detection and creation through it.
///
/// [`CloudDriver`]: crate::driver::CloudDriver
#[async_trait]
pub trait CloudAdapter: Send + Sync {
    /// Provider-native client built by a [`DriverFactory`]
    type Connection: Send + Sync + 'static;

    /// Provider-native node as returned by the provider's listing
    type ProviderNode: Send + Sync + 'static;

    /// Returns the provider identifier handed to the driver factory
    fn provider(&self) -> &str;

    /// Returns the display name for logs and UI
    fn name(&self) -> &str;

    /// Arguments used to construct the connection
    fn driver_args(&self) -> DriverArgs;

    /// List every node the provider knows about
    async fn detect_provider_nodes(
        &self,
        conn: &Self::Connection,
    ) -> Result<Vec<Self::ProviderNode>>;

    /// Read whatever provider field encodes the node's namespace
    fn get_namespace<'a>(&self, node: &'a Self::ProviderNode) -> Option<&'a str>;

    /// Whether a node belongs to the driver's namespace
    fn is_node_relevant(&self, node: &Self::ProviderNode, namespace: Option<&str>) -> bool {
        namespace_matches(namespace, self.get_namespace(node))
    }

    /// Translate a provider node into a canonical [`Node`]
    ///
    /// Implementations set `private` to the provider node.
    async fn node_from_provider_node(
        &self,
        conn: &Self::Connection,
        node: Self::ProviderNode,
    ) -> Result<Node>;

    /// Translate a batch of provider nodes, preserving input order
    async fn nodes_from_provider_nodes(
        &self,
        conn: &Self::Connection,
        nodes: Vec<Self::ProviderNode>,
    ) -> Result<Vec<Node>> {
        let mut translated = Vec::with_capacity(nodes.len());
        for node in nodes {
            translated.push(self.node_from_provider_node(conn, node).await?);
        }
        Ok(translated)
    }

    /// Current security groups and rules
    async fn detect_firewalls(
        &self,
        conn: &Self::Connection,
    ) -> Result<(HashSet<SecurityGroup>, HashSet<SecurityGroupRule>)>;

    /// Create a node, recording `namespace` wherever the provider keeps it
    ///
    /// A node created under a namespace must pass `is_node_relevant` for
    /// that namespace once it is running.
    async fn create_node(
        &self,
        conn: &Self::Connection,
        node: &Node,
        namespace: Option<&str>,
    ) -> Result<()>;

    async fn create_security_group(
        &self,
        conn: &Self::Connection,
        security_group: &SecurityGroup,
    ) -> Result<CreateOutcome>;

    async fn create_security_group_rule(
        &self,
        conn: &Self::Connection,
        rule: &SecurityGroupRule,
    ) -> Result<CreateOutcome>;
}

/// What a creation call did on the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,

    /// The provider has no such resource kind; nothing was sent
    Skipped,
}

/// Default namespace policy
///
/// With no configured namespace everything matches. Otherwise the node's
/// namespace must be exactly equal.
pub fn namespace_matches(configured: Option<&str>, node: Option<&str>) -> bool {
    match configured {
        None => true,
        Some(ns) => node == Some(ns),
    }
}

/// Positional and keyword arguments for building a connection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverArgs {
    pub args: Vec<Value>,
    pub kwargs: Map<String, Value>,
}

impl DriverArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    pub fn kwarg(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    pub fn kwarg_str(&self, key: &str) -> Option<&str> {
        self.kwarg(key).and_then(Value::as_str)
    }
}

/// Builds provider connections
///
/// Looks up the provider-native driver for `provider` and instantiates it
/// with `args`.
pub trait DriverFactory<C>: Send + Sync {
    fn connect(&self, provider: &str, args: &DriverArgs) -> Result<C>;
}

impl<C, F> DriverFactory<C> for F
where
    F: Fn(&str, &DriverArgs) -> Result<C> + Send + Sync,
{
    fn connect(&self, provider: &str, args: &DriverArgs) -> Result<C> {
        self(provider, args)
    }
}
