//! Render command - render releases into the release path

use atlas_render::{Helm, Kustomize, ManifestOutcome, ReleaseOutcome, RenderReport, Renderer};
use console::style;

use crate::error::{CliError, Result};
use crate::settings::GlobalArgs;

pub fn run(global: &GlobalArgs, names: &[String], all: bool, json: bool) -> Result<()> {
    if !all && names.is_empty() {
        return Err(CliError::usage(
            "name at least one release, or pass --all",
        ));
    }

    let spec = global.load()?;
    let releases = if all {
        spec.releases.all_releases().to_vec()
    } else {
        spec.releases.select(names)?
    };

    spec.create_release_directories()?;

    let timeout = spec.defaults.templater_timeout();
    let helm = Helm::new(spec.defaults.helm_binary(), timeout);
    let kustomize = Kustomize::new(spec.defaults.kustomize_binary(), timeout);
    let report = Renderer::new(&helm, &kustomize).render_all(&spec.defaults, &releases)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.has_failures() {
        return Err(CliError::RenderFailed {
            summary: report.summary(),
        });
    }
    Ok(())
}

fn print_report(report: &RenderReport) {
    for release in &report.releases {
        let status = match &release.render {
            ReleaseOutcome::Rendered { output, mode, .. } => {
                let mark = if release.incomplete {
                    style("!").yellow().bold()
                } else {
                    style("✓").green().bold()
                };
                format!("{} {} ({}) {}", mark, style(&release.name).bold(), mode, style(output.display()).dim())
            }
            ReleaseOutcome::Skipped { reason } => {
                format!("{} {} {}", style("-").dim(), style(&release.name).bold(), style(reason).dim())
            }
            ReleaseOutcome::Failed { error } => {
                format!("{} {} {}", style("✗").red().bold(), style(&release.name).bold(), style(error).red())
            }
        };
        println!("{}", status);

        match &release.manifests {
            ManifestOutcome::Merged { files, .. } if *files > 0 => {
                println!("    + {} manifest file(s)", files);
            }
            ManifestOutcome::Failed { error } => {
                println!("    {} {}", style("manifests:").red(), error);
            }
            _ => {}
        }
    }

    println!();
    let summary = report.summary();
    if report.has_failures() {
        println!("{}", style(summary).red().bold());
    } else {
        println!("{}", style(summary).green().bold());
    }
}
