//! aasemble cloud infrastructure
//!
//! This crate provides the provider-agnostic core for describing and
//! creating cloud infrastructure: compute nodes, security groups and
//! security group rules.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                 aasemble-cloud                   │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │        CloudDriver<A: CloudAdapter>       │   │
//! │  │  connection · detect · apply              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │ Resource     │  │ Mappings /   │            │
//! │  │ Collection   │  │ Lookup / Pool│            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────────────────────────────┘
//!         │ trait CloudAdapter
//! ┌───────▼───────┐
//! │ digitalocean  │
//! │   adapter     │
//! └───────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use aasemble_cloud::CloudDriver;
//!
//! let driver = CloudDriver::new(adapter, factory).with_namespace("prod");
//!
//! let current = driver.detect_resources().await?;
//! for (name, node) in &current.nodes {
//!     println!("{name}: {} security groups", node.security_groups.len());
//! }
//!
//! driver.apply_resources(desired).await?;
//! ```

pub mod cloud_config;
pub mod collection;
pub mod driver;
pub mod error;
pub mod lookup;
pub mod mapping;
pub mod model;
pub mod pool;
pub mod provider;

// Re-exports
pub use cloud_config::{CloudConfig, expand_path};
pub use collection::{
    CollectedNode, ResourceCollection, UnresolvedSecurityGroup, build_collection,
    build_collection_with_diagnostics,
};
pub use driver::{ApplyResult, CloudDriver};
pub use error::{CloudError, Result};
pub use lookup::get_resource_by_attr;
pub use mapping::Mappings;
pub use model::{Node, ProviderHandle, SecurityGroup, SecurityGroupRule};
pub use pool::{BoundedPool, InlinePool, WorkerPool};
pub use provider::{CloudAdapter, CreateOutcome, DriverArgs, DriverFactory, namespace_matches};
