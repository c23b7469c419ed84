//! Canonical resource model
//!
//! Provider-independent descriptions of compute nodes, security groups and
//! security group rules. Adapters translate to and from these.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Opaque handle to a provider-native object
///
/// Only the adapter that produced the handle knows what is inside it.
#[derive(Clone)]
pub struct ProviderHandle(Arc<dyn Any + Send + Sync>);

impl ProviderHandle {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ProviderHandle(..)")
    }
}

/// A compute node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique within a collection
    pub name: String,

    /// Provider size identifier or logical flavor name
    pub flavor: String,

    /// Provider image identifier or logical image name
    pub image: String,

    /// Network identifiers, in attachment order
    #[serde(default)]
    pub networks: Vec<String>,

    /// Disk size in GB
    pub disk: u32,

    /// Names of the security groups this node belongs to
    #[serde(default)]
    pub security_group_names: BTreeSet<String>,

    /// cloud-init style user data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,

    /// Provider-native object, only set on detected nodes
    #[serde(skip)]
    pub private: Option<ProviderHandle>,
}

impl Node {
    pub fn new(
        name: impl Into<String>,
        flavor: impl Into<String>,
        image: impl Into<String>,
        disk: u32,
    ) -> Self {
        Self {
            name: name.into(),
            flavor: flavor.into(),
            image: image.into(),
            networks: Vec::new(),
            disk,
            security_group_names: BTreeSet::new(),
            script: None,
            private: None,
        }
    }

    pub fn with_networks<I, S>(mut self, networks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.networks = networks.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_security_groups<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.security_group_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_script(mut self, script: impl Into<String>) -> Self {
        self.script = Some(script.into());
        self
    }

    pub fn with_private<T: Any + Send + Sync>(mut self, native: T) -> Self {
        self.private = Some(ProviderHandle::new(native));
        self
    }

    /// Borrow the provider-native object if it has the expected type
    pub fn private_as<T: Any>(&self) -> Option<&T> {
        self.private.as_ref()?.downcast_ref::<T>()
    }
}

// `private` is not part of a node's identity.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.flavor == other.flavor
            && self.image == other.image
            && self.networks == other.networks
            && self.disk == other.disk
            && self.security_group_names == other.security_group_names
            && self.script == other.script
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.flavor.hash(state);
        self.image.hash(state);
        self.networks.hash(state);
        self.disk.hash(state);
        self.security_group_names.hash(state);
        self.script.hash(state);
    }
}

/// A security group, identified by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub name: String,
}

impl SecurityGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for SecurityGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// An ingress rule attached to a security group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    pub security_group: SecurityGroup,

    /// CIDR, e.g. `0.0.0.0/0`
    pub source_ip: String,

    pub from_port: u16,
    pub to_port: u16,

    /// e.g. `tcp`
    pub protocol: String,
}

impl SecurityGroupRule {
    pub fn new(
        security_group: &SecurityGroup,
        source_ip: impl Into<String>,
        from_port: u16,
        to_port: u16,
        protocol: impl Into<String>,
    ) -> Self {
        Self {
            security_group: security_group.clone(),
            source_ip: source_ip.into(),
            from_port,
            to_port,
            protocol: protocol.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_node_identity_ignores_private() {
        let desired = Node::new("web1", "512mb", "trusty", 20);
        let detected = desired.clone().with_private(42u64);

        assert_eq!(desired, detected);

        let mut set = HashSet::new();
        set.insert(desired);
        assert!(set.contains(&detected));
    }

    #[test]
    fn test_private_downcast() {
        let node = Node::new("web1", "512mb", "trusty", 20).with_private("native".to_string());

        assert_eq!(node.private_as::<String>().map(String::as_str), Some("native"));
        assert!(node.private_as::<u64>().is_none());
    }

    #[test]
    fn test_rule_identity_is_structural() {
        let sg = SecurityGroup::new("webapp");
        let a = SecurityGroupRule::new(&sg, "0.0.0.0/0", 443, 443, "tcp");
        let b = SecurityGroupRule::new(&sg, "0.0.0.0/0", 443, 443, "tcp");
        let c = SecurityGroupRule::new(&sg, "0.0.0.0/0", 443, 443, "udp");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_node_serde_skips_private() {
        let node = Node::new("web1", "512mb", "trusty", 20)
            .with_security_groups(["ssh"])
            .with_private(1u8);

        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("private").is_none());
        assert!(json.get("script").is_none());

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
        assert!(back.private.is_none());
    }
}
