//! Repos command - register chart repositories with helm

use atlas_render::Helm;
use console::style;

use crate::error::{CliError, Result};
use crate::settings::GlobalArgs;

pub fn run(global: &GlobalArgs) -> Result<()> {
    let spec = global.load()?;

    if spec.repositories.is_empty() {
        println!("No repositories declared in {}", global.config.display());
        return Ok(());
    }

    let helm = Helm::new(
        spec.defaults.helm_binary(),
        spec.defaults.templater_timeout(),
    );

    for repo in &spec.repositories {
        helm.add_repo(repo).map_err(|e| CliError::Other {
            message: format!("failed to add repository '{}': {}", repo.name, e),
        })?;
        println!(
            "{} {} {}",
            style("✓").green().bold(),
            style(&repo.name).bold(),
            style(&repo.url).dim()
        );
    }

    helm.update_repo().map_err(|e| CliError::Other {
        message: format!("failed to update repositories: {}", e),
    })?;
    println!("{} Repositories updated", style("✓").green().bold());

    Ok(())
}
