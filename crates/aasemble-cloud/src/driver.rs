//! Cloud driver engine
//!
//! [`CloudDriver`] owns the connection lifecycle and runs the detect and
//! apply pipelines on top of a [`CloudAdapter`].

use crate::collection::{ResourceCollection, build_collection};
use crate::error::Result;
use crate::model::Node;
use crate::provider::{CloudAdapter, CreateOutcome, DriverFactory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Drives one provider adapter
pub struct CloudDriver<A: CloudAdapter> {
    adapter: A,
    factory: Arc<dyn DriverFactory<A::Connection>>,
    namespace: Option<String>,
    connection: OnceCell<A::Connection>,
}

impl<A: CloudAdapter> CloudDriver<A> {
    pub fn new(adapter: A, factory: Arc<dyn DriverFactory<A::Connection>>) -> Self {
        Self {
            adapter,
            factory,
            namespace: None,
            connection: OnceCell::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn set_namespace(&mut self, namespace: Option<String>) {
        self.namespace = namespace;
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Get the connection, creating it on first use
    ///
    /// The connection is built at most once per driver, including under
    /// concurrent first access. A failed attempt is not cached.
    pub async fn connection(&self) -> Result<&A::Connection> {
        self.connection
            .get_or_try_init(|| async {
                tracing::info!("Connecting to {}", self.adapter.name());
                let args = self.adapter.driver_args();
                self.factory.connect(self.adapter.provider(), &args)
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    pub fn is_node_relevant(&self, node: &A::ProviderNode) -> bool {
        self.adapter.is_node_relevant(node, self.namespace())
    }

    /// Detect the canonical nodes in this driver's namespace
    ///
    /// Every call re-queries the provider.
    pub async fn detect_nodes(&self) -> Result<Vec<Node>> {
        let conn = self.connection().await?;

        let relevant: Vec<A::ProviderNode> = self
            .adapter
            .detect_provider_nodes(conn)
            .await?
            .into_iter()
            .filter(|node| self.is_node_relevant(node))
            .collect();

        tracing::debug!(
            "Detected {} relevant nodes on {}",
            relevant.len(),
            self.adapter.name()
        );

        self.adapter.nodes_from_provider_nodes(conn, relevant).await
    }

    /// Detect nodes and firewalls and cross-link them
    pub async fn detect_resources(&self) -> Result<ResourceCollection> {
        let nodes = self.detect_nodes().await?;
        let conn = self.connection().await?;
        let (security_groups, rules) = self.adapter.detect_firewalls(conn).await?;

        build_collection(nodes, security_groups, rules)
    }

    /// Create every resource in the collection
    ///
    /// Security groups are created first, then rules, then nodes. There is no
    /// existence check and no rollback; the first failure is returned. Nodes
    /// are created in this driver's namespace. Groups and rules the provider
    /// cannot represent are counted as skipped.
    pub async fn apply_resources(&self, collection: ResourceCollection) -> Result<ApplyResult> {
        let conn = self.connection().await?;
        let start = std::time::Instant::now();
        let mut result = ApplyResult::new();

        for security_group in &collection.security_groups {
            tracing::debug!("Creating security group: {}", security_group.name);
            let outcome = self
                .adapter
                .create_security_group(conn, security_group)
                .await?;
            match outcome {
                CreateOutcome::Created => result.security_groups += 1,
                CreateOutcome::Skipped => result.skipped += 1,
            }
        }

        for rule in &collection.security_group_rules {
            tracing::debug!(
                "Creating security group rule: {} {} {}-{} from {}",
                rule.security_group.name,
                rule.protocol,
                rule.from_port,
                rule.to_port,
                rule.source_ip
            );
            let outcome = self.adapter.create_security_group_rule(conn, rule).await?;
            match outcome {
                CreateOutcome::Created => result.security_group_rules += 1,
                CreateOutcome::Skipped => result.skipped += 1,
            }
        }

        for collected in collection.nodes.values() {
            tracing::debug!("Creating node: {}", collected.node.name);
            self.adapter
                .create_node(conn, &collected.node, self.namespace())
                .await?;
            result.nodes += 1;
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!("Applied to {}: {}", self.adapter.name(), result);
        Ok(result)
    }
}

/// Result of applying a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyResult {
    pub security_groups: usize,
    pub security_group_rules: usize,
    pub nodes: usize,

    /// Groups and rules the provider could not represent
    pub skipped: usize,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resources actually created
    pub fn total(&self) -> usize {
        self.security_groups + self.security_group_rules + self.nodes
    }
}

impl std::fmt::Display for ApplyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} security groups, {} rules, {} nodes created, {} skipped in {}ms",
            self.security_groups,
            self.security_group_rules,
            self.nodes,
            self.skipped,
            self.duration_ms
        )
    }
}
