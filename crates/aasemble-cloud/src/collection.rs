//! Resource collections
//!
//! A [`ResourceCollection`] cross-links nodes to the security groups that
//! apply to them. It is either produced by detection or assembled by a caller
//! as a desired-state declaration.

use crate::error::{CloudError, Result};
use crate::model::{Node, SecurityGroup, SecurityGroupRule};
use std::collections::{HashMap, HashSet};

/// A node together with its resolved security groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedNode {
    pub node: Node,
    pub security_groups: HashSet<SecurityGroup>,
}

/// Nodes, security groups and rules describing one cloud
#[derive(Debug, Clone, Default)]
pub struct ResourceCollection {
    /// Nodes indexed by name
    pub nodes: HashMap<String, CollectedNode>,

    pub security_groups: HashSet<SecurityGroup>,

    pub security_group_rules: HashSet<SecurityGroupRule>,
}

impl ResourceCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, name: &str) -> Option<&CollectedNode> {
        self.nodes.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
            && self.security_groups.is_empty()
            && self.security_group_rules.is_empty()
    }

    /// Rules whose security group is missing from this collection
    pub fn dangling_rules(&self) -> Vec<&SecurityGroupRule> {
        self.security_group_rules
            .iter()
            .filter(|rule| !self.security_groups.contains(&rule.security_group))
            .collect()
    }

    pub fn is_well_formed(&self) -> bool {
        self.dangling_rules().is_empty()
    }
}

/// A security group name on a node that matched no group in the batch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnresolvedSecurityGroup {
    pub node: String,
    pub security_group: String,
}

/// Build a collection, logging unresolved security group names
///
/// Names with no matching group are dropped from the node's resolved set.
pub fn build_collection<N, G, R>(
    nodes: N,
    security_groups: G,
    rules: R,
) -> Result<ResourceCollection>
where
    N: IntoIterator<Item = Node>,
    G: IntoIterator<Item = SecurityGroup>,
    R: IntoIterator<Item = SecurityGroupRule>,
{
    let (collection, unresolved) =
        build_collection_with_diagnostics(nodes, security_groups, rules)?;

    for missing in &unresolved {
        tracing::warn!(
            "Node {} references unknown security group {}; ignoring it",
            missing.node,
            missing.security_group
        );
    }

    Ok(collection)
}

/// Build a collection and report every dropped security group name
pub fn build_collection_with_diagnostics<N, G, R>(
    nodes: N,
    security_groups: G,
    rules: R,
) -> Result<(ResourceCollection, Vec<UnresolvedSecurityGroup>)>
where
    N: IntoIterator<Item = Node>,
    G: IntoIterator<Item = SecurityGroup>,
    R: IntoIterator<Item = SecurityGroupRule>,
{
    let security_groups: HashSet<SecurityGroup> = security_groups.into_iter().collect();
    let by_name: HashMap<&str, &SecurityGroup> = security_groups
        .iter()
        .map(|sg| (sg.name.as_str(), sg))
        .collect();

    let mut collected = HashMap::new();
    let mut unresolved = Vec::new();

    for node in nodes {
        let mut resolved = HashSet::new();
        for name in &node.security_group_names {
            match by_name.get(name.as_str()) {
                Some(sg) => {
                    resolved.insert((*sg).clone());
                }
                None => unresolved.push(UnresolvedSecurityGroup {
                    node: node.name.clone(),
                    security_group: name.clone(),
                }),
            }
        }

        if collected.contains_key(&node.name) {
            return Err(CloudError::DuplicateNode(node.name));
        }
        collected.insert(
            node.name.clone(),
            CollectedNode {
                node,
                security_groups: resolved,
            },
        );
    }

    let collection = ResourceCollection {
        nodes: collected,
        security_group_rules: rules.into_iter().collect(),
        security_groups,
    };

    Ok((collection, unresolved))
}
