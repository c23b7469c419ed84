//! DigitalOcean adapter for aasemble
//!
//! This crate implements the CloudAdapter trait for DigitalOcean,
//! enabling aasemble to detect and create droplets.
//!
//! # Features
//!
//! - Droplet detection, filtered by status and namespace tag
//! - Droplet creation with logical image/flavor names, SSH keys and user data
//! - Concurrent size lookups through a bounded worker pool
//!
//! # Requirements
//!
//! - A DigitalOcean API token (`api_key` in the `connection` section)
//!
//! # Example
//!
//! ```ignore
//! use aasemble_cloud::{CloudConfig, CloudDriver};
//! use aasemble_cloud_digitalocean::{DigitalOceanAdapter, DigitalOceanDriverFactory};
//! use std::sync::Arc;
//!
//! let config = CloudConfig::from_file("cloud.ini")?;
//! let options = DigitalOceanAdapter::get_kwargs_from_cloud_config(&config)?;
//! let adapter = DigitalOceanAdapter::new(options);
//! let driver = CloudDriver::new(adapter, Arc::new(DigitalOceanDriverFactory::new()));
//!
//! let current = driver.detect_resources().await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod provider;

#[cfg(test)]
mod testing;

pub use api::{
    CreateDropletRequest, DigitalOceanApi, Droplet, Image, ImageRef, Region, Size, SshKey,
};
pub use client::{DigitalOceanClient, DigitalOceanDriverFactory, PROVIDER};
pub use error::{DigitalOceanError, Result};
pub use provider::{
    CreateNodeOptions, DigitalOceanAdapter, DigitalOceanConfig, NAMESPACE_TAG_PREFIX,
};
