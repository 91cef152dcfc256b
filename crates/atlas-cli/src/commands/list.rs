//! List command - list declared releases

use atlas_core::{ContentType, RenderMode, RenderRequest, classify, paths};
use console::style;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::Result;
use crate::settings::GlobalArgs;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReleaseRow {
    name: String,
    chart: String,
    version: String,
    namespace: String,
    render_mode: RenderMode,
    content: ContentType,
    package: PathBuf,
    output: PathBuf,
}

pub fn run(global: &GlobalArgs, json: bool) -> Result<()> {
    let spec = global.load()?;

    let mut rows = Vec::with_capacity(spec.releases.len());
    for release in spec.releases.all_releases() {
        let request = RenderRequest::new(&spec.defaults, release.clone());
        rows.push(ReleaseRow {
            name: release.name.clone(),
            chart: release.chart.clone(),
            version: release.version.clone(),
            namespace: release.namespace.clone(),
            render_mode: request.render_mode(),
            content: classify(&request.chart_path()?),
            package: paths::package_path(&spec.defaults, &release.name)?,
            output: request.output_path()?,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No releases declared in {}", global.config.display());
        return Ok(());
    }

    println!(
        "{:<20} {:<30} {:<10} {:<10} {:<7} {}",
        style("NAME").bold(),
        style("CHART").bold(),
        style("VERSION").bold(),
        style("CONTENT").bold(),
        style("MODE").bold(),
        style("OUTPUT").bold()
    );

    for row in rows {
        let content = match row.content {
            ContentType::None => style(row.content.to_string()).dim(),
            _ => style(row.content.to_string()).green(),
        };
        println!(
            "{:<20} {:<30} {:<10} {:<10} {:<7} {}",
            row.name,
            row.chart,
            row.version,
            content,
            row.render_mode,
            row.output.display()
        );
    }

    Ok(())
}
