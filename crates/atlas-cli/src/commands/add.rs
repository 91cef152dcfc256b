//! Add command - scaffold package directories

use atlas_core::{ReleaseSpec, paths};
use console::style;
use serde::Serialize;

use crate::error::{CliError, Result};
use crate::settings::GlobalArgs;

#[derive(Serialize)]
struct Snippet {
    releases: Vec<ReleaseSpec>,
}

/// Create the package tree for each name. Names not yet declared get a
/// config snippet to paste into the config file.
pub fn run(
    global: &GlobalArgs,
    names: &[String],
    chart: Option<&str>,
    version: Option<&str>,
    namespace: Option<&str>,
) -> Result<()> {
    let spec = global.load()?;

    let mut new_releases = Vec::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(CliError::usage("release names must not be empty"));
        }
        let pkg_path = paths::ensure_dirs(&spec.defaults, name)?;
        println!(
            "{} {} {}",
            style("✓").green().bold(),
            style(name).bold(),
            style(pkg_path.display()).dim()
        );

        if !spec.releases.contains(name) {
            new_releases.push(ReleaseSpec {
                chart: chart.unwrap_or_default().to_string(),
                version: version.unwrap_or_default().to_string(),
                namespace: namespace.unwrap_or_default().to_string(),
                ..ReleaseSpec::new(name.as_str())
            });
        }
    }

    if new_releases.is_empty() {
        return Ok(());
    }

    let snippet = serde_yaml::to_string(&Snippet {
        releases: new_releases,
    })
    .map_err(atlas_core::CoreError::from)?;

    println!();
    println!(
        "Add to {}:",
        style(global.config.display()).cyan()
    );
    println!();
    print!("{}", snippet);

    Ok(())
}
