//! Atlas Render - turns declared releases into plain manifests
//!
//! Rendering is delegated to external tools and the result is reassembled
//! into the release output directory:
//! - `Renderer`: classify, template or build, reassemble, merge manifests
//! - `Helm` / `Kustomize`: command line wrappers behind the `Templater`,
//!   `ChartFetcher` and `Kustomizer` traits
//! - `install_chart`: fetch a chart into its package
//!
//! # Example
//!
//! ```rust,no_run
//! use atlas_core::ClusterSpec;
//! use atlas_render::{Helm, Kustomize, Renderer};
//! use std::path::Path;
//!
//! let spec = ClusterSpec::load_from(Path::new("atlas.yaml")).unwrap();
//! let timeout = spec.defaults.templater_timeout();
//! let helm = Helm::new(spec.defaults.helm_binary(), timeout);
//! let kustomize = Kustomize::new(spec.defaults.kustomize_binary(), timeout);
//!
//! let report = Renderer::new(&helm, &kustomize)
//!     .render_all(&spec.defaults, spec.releases.all_releases())
//!     .unwrap();
//! println!("{}", report.summary());
//! ```

pub mod assemble;
pub mod driver;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod helm;
pub mod kustomize;
pub mod manifests;
pub mod report;

pub use driver::{Renderer, template_args};
pub use error::{RenderError, Result};
pub use exec::{CommandOutput, CommandRunner, ExecError, ShellRunner};
pub use fetch::install_chart;
pub use helm::{ChartFetcher, Helm, Templater};
pub use kustomize::{Kustomize, Kustomizer};
pub use manifests::merge_manifests;
pub use report::{ManifestOutcome, ReleaseOutcome, ReleaseReport, RenderReport};
