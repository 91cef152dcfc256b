//! Atlas Core - cluster state model for kube-atlas
//!
//! This crate provides the pieces every other part of atlas builds on:
//! - `ClusterSpec`: the declared cluster state (defaults, repositories, releases)
//! - `ReleaseRegistry`: ordered, copy-on-lookup release collection
//! - `paths`: canonical, escape-proof package and release paths
//! - `classify`: chart directory content detection
//! - `RenderRequest`: immutable per-invocation view of one release

pub mod classify;
pub mod config;
pub mod error;
pub mod fileutil;
pub mod paths;
pub mod registry;
pub mod request;

pub use classify::{ContentType, classify};
pub use config::{
    ClusterSpec, CopyPolicy, DefaultConfig, ReleaseSpec, RenderMode, RepositorySpec,
    DEFAULT_CONFIG_FILE,
};
pub use error::{CoreError, Result};
pub use fileutil::{CopyFailure, CopyReport, DirNaming};
pub use registry::ReleaseRegistry;
pub use request::RenderRequest;
