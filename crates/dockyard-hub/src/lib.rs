//! # dockyard-hub
//!
//! Removes stale images from Docker Hub repositories.
//!
//! This crate provides:
//! - A Docker Hub API client (login, image listing, batched deletes)
//! - Deletion planning that protects active and `latest`-tagged images
//! - The `dockerhub-clean` driver that walks a fixed set of repositories

#![warn(missing_docs)]

pub mod cli;
pub mod client;
pub mod config;
pub mod models;
pub mod prune;

pub use client::HubClient;
pub use config::PrunerConfig;
pub use models::{ImageRecord, ImageStatus, TagRecord};
pub use prune::{DeleteSummary, Pruner};
