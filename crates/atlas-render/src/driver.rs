//! Rendering one release into its output directory

use atlas_core::{
    ContentType, DefaultConfig, ReleaseSpec, RenderMode, RenderRequest, classify, paths,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{error, info, info_span, warn};

use crate::assemble;
use crate::error::{RenderError, Result};
use crate::helm::Templater;
use crate::kustomize::Kustomizer;
use crate::manifests::merge_manifests;
use crate::report::{ManifestOutcome, ReleaseOutcome, ReleaseReport, RenderReport};

/// Renders releases by delegating to helm or kustomize and reassembling
/// the result
pub struct Renderer<'t> {
    templater: &'t dyn Templater,
    kustomizer: &'t dyn Kustomizer,
}

impl<'t> Renderer<'t> {
    pub fn new(templater: &'t dyn Templater, kustomizer: &'t dyn Kustomizer) -> Self {
        Self {
            templater,
            kustomizer,
        }
    }

    /// Render one release
    ///
    /// The output directory is only replaced once the external tool has
    /// succeeded. The scratch directory is removed on every exit path.
    pub fn render(&self, request: &RenderRequest<'_>) -> Result<ReleaseOutcome> {
        let name = request.name();
        let chart_dir = request.chart_path()?;
        let content = classify(&chart_dir);
        let mode = request.render_mode();

        if content == ContentType::None {
            return Ok(skipped(&chart_dir));
        }
        if mode == RenderMode::Custom {
            return Err(not_implemented(name));
        }

        let policy = request.defaults.copy_policy();
        let scratch = tempfile::Builder::new()
            .prefix("atlas-render-")
            .tempdir()
            .map_err(RenderError::io(name, std::env::temp_dir()))?;

        let mut staged = atlas_core::CopyReport::default();
        let produced = match content {
            ContentType::Helm => {
                let args = template_args(request, scratch.path())?;
                info!(content = %content, "running helm template");
                self.templater
                    .template(&chart_dir, &args)
                    .map_err(|e| e.for_release(name))?;
                single_top_level_dir(name, scratch.path())?
            }
            ContentType::Kustomize => {
                info!(content = %content, "running kustomize build");
                self.kustomize(request, &chart_dir, &scratch)?
            }
            ContentType::Raw => {
                staged = assemble::stage_yaml(&chart_dir, scratch.path(), policy)
                    .map_err(RenderError::copy(name))?;
                scratch.path().to_path_buf()
            }
            ContentType::None => return Ok(skipped(&chart_dir)),
        };

        let output = request.output_path()?;
        recreate_dir(name, &output)?;

        let mut copy = match mode {
            RenderMode::Single => {
                let (buf, report) =
                    assemble::concat_tree(&produced, policy).map_err(RenderError::copy(name))?;
                let file = output.join(format!("{}.yaml", name));
                fs::write(&file, buf).map_err(RenderError::io(name, &file))?;
                report
            }
            RenderMode::Multi => assemble::copy_tree(&produced, &output, policy)
                .map_err(RenderError::copy(name))?,
            RenderMode::Custom => return Err(not_implemented(name)),
        };
        staged.failures.append(&mut copy.failures);
        copy.failures = staged.failures;

        if copy.is_complete() {
            info!(output = %output.display(), mode = %mode, "rendered");
        } else {
            warn!(
                output = %output.display(),
                failed = copy.failures.len(),
                "rendered with missing files"
            );
        }
        Ok(ReleaseOutcome::rendered(content, mode, output, copy))
    }

    fn kustomize(
        &self,
        request: &RenderRequest<'_>,
        chart_dir: &Path,
        scratch: &TempDir,
    ) -> Result<PathBuf> {
        let name = request.name();
        match request.render_mode() {
            RenderMode::Single => {
                let out = self
                    .kustomizer
                    .build(chart_dir, None)
                    .map_err(|e| e.for_release(name))?;
                let file = scratch.path().join(format!("{}.yaml", name));
                fs::write(&file, &out.stdout).map_err(RenderError::io(name, &file))?;
            }
            RenderMode::Multi => {
                self.kustomizer
                    .build(chart_dir, Some(scratch.path()))
                    .map_err(|e| e.for_release(name))?;
            }
            RenderMode::Custom => return Err(not_implemented(name)),
        }
        Ok(scratch.path().to_path_buf())
    }

    /// Render and merge manifests for each release in order
    ///
    /// A release that fails is recorded and the run moves on. Path escapes
    /// and configuration errors stop the run.
    pub fn render_all(
        &self,
        defaults: &DefaultConfig,
        releases: &[ReleaseSpec],
    ) -> Result<RenderReport> {
        let mut report = RenderReport::new();

        for release in releases {
            let span = info_span!("release", release = %release.name);
            let _enter = span.enter();

            let request = RenderRequest::new(defaults, release.clone());

            let render = match self.render(&request) {
                Ok(outcome) => outcome,
                Err(e) if e.is_fatal_for_run() => return Err(e),
                Err(e) => {
                    error!(error = %e, "render failed");
                    ReleaseOutcome::failed(&e)
                }
            };

            let manifests = match merge_manifests(&request) {
                Ok(copy) => ManifestOutcome::merged(copy),
                Err(e) if e.is_fatal_for_run() => return Err(e),
                Err(e) => {
                    error!(error = %e, "manifest merge failed");
                    ManifestOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };

            report.push(ReleaseReport::new(&release.name, render, manifests));
        }

        Ok(report)
    }
}

/// Arguments for `helm template`, minus the chart
///
/// Values entries are resolved inside the values directory. Entries that
/// are missing or are not regular files are skipped.
pub fn template_args(request: &RenderRequest<'_>, output_dir: &Path) -> Result<Vec<String>> {
    let mut args = vec![
        "--output-dir".to_string(),
        output_dir.display().to_string(),
        "--name".to_string(),
        request.name().to_string(),
        "--kube-version".to_string(),
        request.kube_version().to_string(),
    ];

    if !request.release.namespace.is_empty() {
        args.extend(["--namespace".to_string(), request.release.namespace.clone()]);
    }

    let values_dir = request.values_path()?;
    for entry in &request.release.values {
        if paths::clean_path(entry) == Path::new(".") {
            warn!(values = %entry, "values entry names no file, skipping");
            continue;
        }
        let path = paths::secure_join(&values_dir, entry)?;
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                args.extend(["--values".to_string(), path.display().to_string()]);
            }
            Ok(_) => warn!(values = %entry, "values entry is not a regular file, skipping"),
            Err(_) => warn!(values = %entry, path = %path.display(), "values file does not exist, skipping"),
        }
    }

    Ok(args)
}

/// The one directory helm writes its output under
fn single_top_level_dir(release: &str, scratch: &Path) -> Result<PathBuf> {
    let mut entries: Vec<PathBuf> = fs::read_dir(scratch)
        .map_err(RenderError::io(release, scratch))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .collect();

    if entries.len() != 1 {
        return Err(RenderError::InternalConsistency {
            release: release.to_string(),
            path: scratch.to_path_buf(),
            message: format!("expected exactly one output directory, found {}", entries.len()),
        });
    }
    let dir = entries.remove(0);
    if !dir.is_dir() {
        return Err(RenderError::InternalConsistency {
            release: release.to_string(),
            path: dir,
            message: "expected a directory".to_string(),
        });
    }
    Ok(dir)
}

fn recreate_dir(release: &str, dir: &Path) -> Result<()> {
    // `.`, `/` and `..` hold other releases
    if dir.file_name().is_none() {
        return Err(RenderError::InternalConsistency {
            release: release.to_string(),
            path: dir.to_path_buf(),
            message: "refusing to replace a directory without a name of its own".to_string(),
        });
    }
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(RenderError::io(release, dir))?;
    }
    paths::create_dir_all(dir)?;
    Ok(())
}

fn skipped(chart_dir: &Path) -> ReleaseOutcome {
    info!(path = %chart_dir.display(), "no renderable content, skipping");
    ReleaseOutcome::Skipped {
        reason: format!("no renderable content in {}", chart_dir.display()),
    }
}

fn not_implemented(release: &str) -> RenderError {
    RenderError::NotImplemented {
        release: release.to_string(),
        feature: "custom render mode".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::{CommandOutput, ExecError};
    use std::sync::Mutex;

    /// Writes `files` under `<output-dir>/<wrappers...>` like helm does
    #[derive(Default)]
    struct FakeHelm {
        files: Vec<(&'static str, &'static str)>,
        wrappers: Vec<&'static str>,
        fail_for: Option<&'static str>,
        file_mode: Option<u32>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl FakeHelm {
        fn with_files(files: &[(&'static str, &'static str)]) -> Self {
            Self {
                files: files.to_vec(),
                wrappers: vec!["mychart"],
                ..Default::default()
            }
        }

        fn last_args(&self) -> Vec<String> {
            self.calls.lock().unwrap().last().cloned().unwrap_or_default()
        }

        fn last_output_dir(&self) -> PathBuf {
            let args = self.last_args();
            let pos = args.iter().position(|a| a == "--output-dir").unwrap();
            PathBuf::from(&args[pos + 1])
        }
    }

    impl Templater for FakeHelm {
        fn template(&self, _chart_dir: &Path, args: &[String]) -> std::result::Result<CommandOutput, ExecError> {
            self.calls.lock().unwrap().push(args.to_vec());
            let name_pos = args.iter().position(|a| a == "--name").unwrap();
            if self.fail_for == Some(args[name_pos + 1].as_str()) {
                return Err(ExecError::Failed {
                    command: "helm template".to_string(),
                    status: "exit status 1".to_string(),
                    output: "Error: parse error".to_string(),
                });
            }
            let out_pos = args.iter().position(|a| a == "--output-dir").unwrap();
            let out = PathBuf::from(&args[out_pos + 1]);
            for wrapper in &self.wrappers {
                let dir = out.join(wrapper).join("templates");
                fs::create_dir_all(&dir).unwrap();
                for (name, content) in &self.files {
                    fs::write(dir.join(name), content).unwrap();
                    #[cfg(unix)]
                    if let Some(mode) = self.file_mode {
                        use std::os::unix::fs::PermissionsExt;
                        fs::set_permissions(dir.join(name), fs::Permissions::from_mode(mode))
                            .unwrap();
                    }
                }
            }
            Ok(CommandOutput::default())
        }
    }

    #[derive(Default)]
    struct FakeKustomize {
        calls: Mutex<Vec<Option<PathBuf>>>,
    }

    impl Kustomizer for FakeKustomize {
        fn build(&self, _dir: &Path, output: Option<&Path>) -> std::result::Result<CommandOutput, ExecError> {
            self.calls.lock().unwrap().push(output.map(Path::to_path_buf));
            match output {
                Some(out) => {
                    fs::write(out.join("apps_v1_deployment_web.yaml"), "kind: Deployment").unwrap();
                    fs::write(out.join("v1_service_web.yaml"), "kind: Service").unwrap();
                    Ok(CommandOutput::default())
                }
                None => Ok(CommandOutput {
                    stdout: b"kind: Deployment\n---\nkind: Service".to_vec(),
                    stderr: Vec::new(),
                }),
            }
        }
    }

    struct Workspace {
        _tmp: tempfile::TempDir,
        defaults: DefaultConfig,
    }

    impl Workspace {
        fn new() -> Self {
            let tmp = tempfile::TempDir::new().unwrap();
            let defaults = DefaultConfig {
                source_path: Some(tmp.path().join("src").display().to_string()),
                release_path: Some(tmp.path().join("releases").display().to_string()),
                cluster_name: Some("dev".to_string()),
                ..Default::default()
            };
            Self { _tmp: tmp, defaults }
        }

        fn chart_dir(&self, release: &str) -> PathBuf {
            let dir = paths::chart_path(&self.defaults, release).unwrap();
            fs::create_dir_all(&dir).unwrap();
            dir
        }

        fn helm_chart(&self, release: &str) -> PathBuf {
            let dir = self.chart_dir(release);
            fs::write(dir.join("Chart.yaml"), "name: mychart\n").unwrap();
            dir
        }

        fn output(&self, release: &ReleaseSpec) -> PathBuf {
            paths::release_output_path(&self.defaults, release).unwrap()
        }
    }

    fn release(name: &str, mode: RenderMode) -> ReleaseSpec {
        ReleaseSpec {
            render_mode: Some(mode),
            ..ReleaseSpec::new(name)
        }
    }

    #[test]
    fn test_single_mode_concatenates() {
        let ws = Workspace::new();
        ws.helm_chart("app");
        let helm = FakeHelm::with_files(&[("a.yaml", "A"), ("b.yaml", "B")]);
        let kustomize = FakeKustomize::default();
        let renderer = Renderer::new(&helm, &kustomize);

        let release = release("app", RenderMode::Single);
        let outcome = renderer
            .render(&RenderRequest::new(&ws.defaults, release.clone()))
            .unwrap();

        assert!(outcome.is_rendered());
        let out = ws.output(&release);
        assert_eq!(fs::read_to_string(out.join("app.yaml")).unwrap(), "A\nB\n");
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
    }

    #[test]
    fn test_multi_mode_preserves_tree() {
        let ws = Workspace::new();
        ws.helm_chart("app");
        let helm = FakeHelm {
            file_mode: Some(0o640),
            ..FakeHelm::with_files(&[("a.yaml", "A"), ("b.yaml", "B")])
        };
        let kustomize = FakeKustomize::default();
        let renderer = Renderer::new(&helm, &kustomize);

        let release = release("app", RenderMode::Multi);
        renderer
            .render(&RenderRequest::new(&ws.defaults, release.clone()))
            .unwrap();

        let out = ws.output(&release);
        assert_eq!(fs::read_to_string(out.join("templates").join("a.yaml")).unwrap(), "A");
        assert_eq!(fs::read_to_string(out.join("templates").join("b.yaml")).unwrap(), "B");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            for file in ["a.yaml", "b.yaml"] {
                let meta = fs::metadata(out.join("templates").join(file)).unwrap();
                assert_eq!(meta.permissions().mode() & 0o777, 0o640);
            }
        }
    }

    #[test]
    fn test_current_dir_release_cannot_wipe_siblings() {
        let ws = Workspace::new();
        ws.helm_chart("good");
        let helm = FakeHelm::with_files(&[("a.yaml", "A")]);
        let kustomize = FakeKustomize::default();
        let renderer = Renderer::new(&helm, &kustomize);

        let good = release("good", RenderMode::Single);
        renderer
            .render(&RenderRequest::new(&ws.defaults, good.clone()))
            .unwrap();
        let rendered = ws.output(&good).join("good.yaml");
        assert!(rendered.exists());

        let err = renderer
            .render(&RenderRequest::new(&ws.defaults, release(".", RenderMode::Single)))
            .unwrap_err();
        assert!(err.is_fatal_for_run());
        assert!(rendered.exists());
    }

    #[test]
    fn test_recreate_dir_refuses_unnamed_dirs() {
        for dir in [".", "/", ".."] {
            let err = recreate_dir("app", Path::new(dir)).unwrap_err();
            assert!(matches!(err, RenderError::InternalConsistency { .. }));
        }
    }

    #[test]
    fn test_output_is_replaced() {
        let ws = Workspace::new();
        ws.helm_chart("app");
        let release = release("app", RenderMode::Multi);
        let out = ws.output(&release);
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("stale.yaml"), "old").unwrap();

        let helm = FakeHelm::with_files(&[("a.yaml", "A")]);
        let kustomize = FakeKustomize::default();
        Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release))
            .unwrap();

        assert!(!out.join("stale.yaml").exists());
        assert!(out.join("templates").join("a.yaml").exists());
    }

    #[test]
    fn test_failed_template_keeps_previous_output() {
        let ws = Workspace::new();
        ws.helm_chart("app");
        let release = release("app", RenderMode::Single);
        let out = ws.output(&release);
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("app.yaml"), "previous").unwrap();

        let helm = FakeHelm {
            fail_for: Some("app"),
            ..FakeHelm::with_files(&[("a.yaml", "A")])
        };
        let kustomize = FakeKustomize::default();
        let err = Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release))
            .unwrap_err();

        assert!(matches!(err, RenderError::ExternalTool { ref release, .. } if release == "app"));
        assert!(!err.is_fatal_for_run());
        assert_eq!(fs::read_to_string(out.join("app.yaml")).unwrap(), "previous");
        assert!(!helm.last_output_dir().exists());
    }

    #[test]
    fn test_scratch_removed_after_success() {
        let ws = Workspace::new();
        ws.helm_chart("app");
        let helm = FakeHelm::with_files(&[("a.yaml", "A")]);
        let kustomize = FakeKustomize::default();
        Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release("app", RenderMode::Single)))
            .unwrap();
        assert!(!helm.last_output_dir().exists());
    }

    #[test]
    fn test_unexpected_wrapper_count() {
        let ws = Workspace::new();
        ws.helm_chart("app");
        let kustomize = FakeKustomize::default();

        for wrappers in [vec![], vec!["one", "two"]] {
            let helm = FakeHelm {
                wrappers,
                ..FakeHelm::with_files(&[("a.yaml", "A")])
            };
            let err = Renderer::new(&helm, &kustomize)
                .render(&RenderRequest::new(&ws.defaults, release("app", RenderMode::Single)))
                .unwrap_err();
            assert!(matches!(err, RenderError::InternalConsistency { .. }));
        }
    }

    #[test]
    fn test_empty_chart_is_skipped() {
        let ws = Workspace::new();
        ws.chart_dir("app");
        let helm = FakeHelm::default();
        let kustomize = FakeKustomize::default();

        let outcome = Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release("app", RenderMode::Single)))
            .unwrap();

        assert!(matches!(outcome, ReleaseOutcome::Skipped { .. }));
        assert!(helm.calls.lock().unwrap().is_empty());
        assert!(!ws.output(&ReleaseSpec::new("app")).exists());
    }

    #[test]
    fn test_custom_mode_not_implemented() {
        let ws = Workspace::new();
        ws.helm_chart("app");
        let helm = FakeHelm::with_files(&[("a.yaml", "A")]);
        let kustomize = FakeKustomize::default();

        let err = Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release("app", RenderMode::Custom)))
            .unwrap_err();
        assert!(matches!(err, RenderError::NotImplemented { .. }));
        assert!(helm.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_template_args() {
        let ws = Workspace::new();
        let values_dir = paths::values_path(&ws.defaults, "app").unwrap();
        fs::create_dir_all(values_dir.join("nested")).unwrap();
        fs::write(values_dir.join("base.yaml"), "replicas: 1").unwrap();

        let release = ReleaseSpec {
            namespace: "monitoring".to_string(),
            kube_version: Some("1.20.0".to_string()),
            values: vec![
                "base.yaml".to_string(),
                "nested".to_string(),
                "missing.yaml".to_string(),
            ],
            ..ReleaseSpec::new("app")
        };
        let request = RenderRequest::new(&ws.defaults, release);
        let args = template_args(&request, Path::new("/tmp/scratch")).unwrap();

        assert_eq!(
            args,
            vec![
                "--output-dir".to_string(),
                "/tmp/scratch".to_string(),
                "--name".to_string(),
                "app".to_string(),
                "--kube-version".to_string(),
                "1.20.0".to_string(),
                "--namespace".to_string(),
                "monitoring".to_string(),
                "--values".to_string(),
                values_dir.join("base.yaml").display().to_string(),
            ]
        );
    }

    #[test]
    fn test_template_args_default_kube_version() {
        let ws = Workspace::new();
        let request = RenderRequest::new(&ws.defaults, ReleaseSpec::new("app"));
        let args = template_args(&request, Path::new("/tmp/scratch")).unwrap();
        assert!(args.contains(&"1.14.1-0".to_string()));
        assert!(!args.contains(&"--namespace".to_string()));
    }

    #[test]
    fn test_values_escape_is_rejected() {
        let ws = Workspace::new();
        let release = ReleaseSpec {
            values: vec!["../../secrets.yaml".to_string()],
            ..ReleaseSpec::new("app")
        };
        let err = template_args(
            &RenderRequest::new(&ws.defaults, release),
            Path::new("/tmp/scratch"),
        )
        .unwrap_err();
        assert!(err.is_fatal_for_run());
    }

    #[test]
    fn test_kustomize_single() {
        let ws = Workspace::new();
        let dir = ws.chart_dir("web");
        fs::write(dir.join("kustomization.yaml"), "resources: []").unwrap();
        let helm = FakeHelm::default();
        let kustomize = FakeKustomize::default();

        let release = release("web", RenderMode::Single);
        let outcome = Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release.clone()))
            .unwrap();

        assert!(matches!(outcome, ReleaseOutcome::Rendered { content: ContentType::Kustomize, .. }));
        assert_eq!(
            fs::read_to_string(ws.output(&release).join("web.yaml")).unwrap(),
            "kind: Deployment\n---\nkind: Service\n"
        );
        assert_eq!(*kustomize.calls.lock().unwrap(), vec![None]);
    }

    #[test]
    fn test_kustomize_multi() {
        let ws = Workspace::new();
        let dir = ws.chart_dir("web");
        fs::write(dir.join("kustomization.yaml"), "resources: []").unwrap();
        let helm = FakeHelm::default();
        let kustomize = FakeKustomize::default();

        let release = release("web", RenderMode::Multi);
        Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release.clone()))
            .unwrap();

        let out = ws.output(&release);
        assert!(out.join("apps_v1_deployment_web.yaml").is_file());
        assert!(out.join("v1_service_web.yaml").is_file());
    }

    #[test]
    fn test_raw_yaml_copied() {
        let ws = Workspace::new();
        let dir = ws.chart_dir("plain");
        fs::write(dir.join("namespace.yaml"), "kind: Namespace").unwrap();
        fs::write(dir.join("NOTES.txt"), "notes").unwrap();
        let helm = FakeHelm::default();
        let kustomize = FakeKustomize::default();

        let release = release("plain", RenderMode::Multi);
        Renderer::new(&helm, &kustomize)
            .render(&RenderRequest::new(&ws.defaults, release.clone()))
            .unwrap();

        let out = ws.output(&release);
        assert_eq!(fs::read_to_string(out.join("namespace.yaml")).unwrap(), "kind: Namespace");
        assert!(!out.join("NOTES.txt").exists());
        assert!(dir.join("NOTES.txt").exists());
    }

    #[test]
    fn test_render_all_isolates_failures() {
        let ws = Workspace::new();
        ws.helm_chart("broken");
        ws.helm_chart("good");
        ws.chart_dir("empty");
        let helm = FakeHelm {
            fail_for: Some("broken"),
            ..FakeHelm::with_files(&[("a.yaml", "A")])
        };
        let kustomize = FakeKustomize::default();

        let releases = vec![
            ReleaseSpec::new("broken"),
            ReleaseSpec::new("good"),
            ReleaseSpec::new("empty"),
        ];
        let report = Renderer::new(&helm, &kustomize)
            .render_all(&ws.defaults, &releases)
            .unwrap();

        assert_eq!(report.summary(), "1 rendered, 1 skipped, 1 failed");
        assert_eq!(report.releases[0].name, "broken");
        assert!(report.releases[0].render.is_failed());
        assert!(ws.output(&ReleaseSpec::new("good")).join("good.yaml").is_file());
    }

    #[test]
    fn test_render_all_stops_on_escape() {
        let ws = Workspace::new();
        ws.helm_chart("good");
        let helm = FakeHelm::with_files(&[("a.yaml", "A")]);
        let kustomize = FakeKustomize::default();

        let releases = vec![ReleaseSpec::new("../outside"), ReleaseSpec::new("good")];
        let err = Renderer::new(&helm, &kustomize)
            .render_all(&ws.defaults, &releases)
            .unwrap_err();

        assert!(err.is_fatal_for_run());
        assert!(helm.calls.lock().unwrap().is_empty());
    }
}
