//! Init command - write a starter config file

use atlas_core::config::{DEFAULT_RELEASE_DIR, DEFAULT_SOURCE_DIR};
use atlas_core::{ClusterSpec, DEFAULT_CONFIG_FILE, DefaultConfig};
use console::style;
use std::path::Path;

use crate::error::{CliError, Result};
use crate::settings::GlobalArgs;

pub fn run(global: &GlobalArgs, dir: Option<&Path>) -> Result<()> {
    let config_path = match dir {
        Some(dir) => dir.join(DEFAULT_CONFIG_FILE),
        None => global.config.clone(),
    };

    if config_path.exists() {
        return Err(CliError::already_exists(
            format!("Config file {} already exists", config_path.display()),
            "edit it by hand, or pass --dir to create one elsewhere",
        ));
    }

    let mut spec = ClusterSpec {
        defaults: DefaultConfig {
            cluster_name: Some("default".to_string()),
            source_path: Some(DEFAULT_SOURCE_DIR.to_string()),
            release_path: Some(DEFAULT_RELEASE_DIR.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    global.apply(&mut spec.defaults);
    spec.save_to(&config_path)?;

    println!(
        "{} Created {}",
        style("✓").green().bold(),
        style(config_path.display()).cyan()
    );
    println!();
    println!("Next steps:");
    println!("  atlas add <name> --chart <repo/chart>   scaffold a package");
    println!("  atlas fetch <name>                      download its chart");
    println!("  atlas render --all                      render every release");

    Ok(())
}
