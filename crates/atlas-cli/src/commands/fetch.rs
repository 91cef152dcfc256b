//! Fetch command - download a release's chart

use atlas_core::RenderRequest;
use atlas_render::{Helm, install_chart};
use console::style;

use crate::error::Result;
use crate::settings::GlobalArgs;

pub fn run(
    global: &GlobalArgs,
    name: &str,
    chart: Option<&str>,
    version: Option<&str>,
    force: bool,
) -> Result<()> {
    let spec = global.load()?;
    let release = spec.release_by_name(name)?;

    let request = RenderRequest::new(&spec.defaults, release)
        .with_chart(chart)
        .with_version(version);

    let helm = Helm::new(
        spec.defaults.helm_binary(),
        spec.defaults.templater_timeout(),
    );
    let path = install_chart(&request, &helm, force)?;

    let version = match request.version() {
        "" => String::new(),
        v => format!(" {}", v),
    };
    println!(
        "{} Fetched {}{} into {}",
        style("✓").green().bold(),
        style(request.chart()).bold(),
        version,
        style(path.display()).cyan()
    );

    if request.is_chart_overridden() || request.is_version_overridden() {
        println!(
            "  {} the config still declares {} {}",
            style("note:").yellow(),
            request.release.chart,
            request.release.version
        );
    }

    Ok(())
}
