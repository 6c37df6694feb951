//! Behaviour-driven tests for the ingestion pipeline.
//!
//! Each scenario builds a package on disk, runs it through
//! `install_package` with the production unzipper and handlers, and checks
//! the outcome. Uses the rstest-bdd v0.5.0 mutable world pattern.

use appkg::application::{AssembleError, HandlerRegistry};
use appkg::manifest::ManifestError;
use appkg::package::PackageError;
use appkg::pipeline::{InstallError, InstallRequest, Installation, install_package};
use appkg::test_support::{WgtBuilder, XpkBuilder, complete_widget_attrs, widget_xml};
use appkg::unzip::ZipUnzipper;
use appkg::AppId;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// World types
// ---------------------------------------------------------------------------

struct PipelineWorld {
    temp_dir: TempDir,
    package: Option<PathBuf>,
    explicit_id: Option<AppId>,
    cancel: bool,
    outcome: Option<Result<Installation, InstallError>>,
}

#[fixture]
fn world() -> PipelineWorld {
    let temp_dir = TempDir::new().expect("temp dir");
    fs::create_dir(temp_dir.path().join("scratch")).expect("create scratch dir");
    PipelineWorld {
        temp_dir,
        package: None,
        explicit_id: None,
        cancel: false,
        outcome: None,
    }
}

impl PipelineWorld {
    fn scratch(&self) -> PathBuf {
        self.temp_dir.path().join("scratch")
    }

    fn write_xpk(&mut self, manifest: &serde_json::Value) {
        let path = self.temp_dir.path().join("app.xpk");
        XpkBuilder::new()
            .with_manifest_json(&manifest.to_string())
            .with_entry("index.html", b"<html></html>")
            .write_to(&path)
            .expect("write xpk");
        self.package = Some(path);
    }

    fn write_wgt(&mut self, attrs: &[(&str, &str)]) {
        let path = self.temp_dir.path().join("app.wgt");
        WgtBuilder::new()
            .with_config_xml(&widget_xml(attrs))
            .with_entry("index.html", b"<html></html>")
            .write_to(&path)
            .expect("write wgt");
        self.package = Some(path);
    }

    fn installation(&self) -> &Installation {
        match self.outcome.as_ref().expect("package installed") {
            Ok(installation) => installation,
            Err(err) => panic!("installation failed: {err}"),
        }
    }

    fn error(&self) -> &InstallError {
        match self.outcome.as_ref().expect("package installed") {
            Ok(_) => panic!("installation unexpectedly succeeded"),
            Err(err) => err,
        }
    }
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("an xpk package named \"{name}\" at version \"{version}\"")]
fn given_xpk_with_version(world: &mut PipelineWorld, name: String, version: String) {
    world.write_xpk(&serde_json::json!({"name": name, "version": version}));
}

#[given("an xpk package named \"{name}\" without a version")]
fn given_xpk_without_version(world: &mut PipelineWorld, name: String) {
    world.write_xpk(&serde_json::json!({"name": name}));
}

#[given("an xpk package without a name")]
fn given_xpk_without_name(world: &mut PipelineWorld) {
    world.write_xpk(&serde_json::json!({"version": "1.0"}));
}

#[given("a wgt package with a complete widget")]
fn given_complete_wgt(world: &mut PipelineWorld) {
    world.write_wgt(&complete_widget_attrs());
}

#[given("a wgt package whose widget lacks \"{attribute}\"")]
fn given_incomplete_wgt(world: &mut PipelineWorld, attribute: String) {
    let attrs: Vec<_> = complete_widget_attrs()
        .into_iter()
        .filter(|(key, _)| *key != attribute)
        .collect();
    world.write_wgt(&attrs);
}

#[given("a plain text file")]
fn given_plain_text(world: &mut PipelineWorld) {
    let path = world.temp_dir.path().join("notes.wgt");
    fs::write(&path, "hello, world").expect("write text");
    world.package = Some(path);
}

#[given("the explicit id \"{id}\"")]
fn given_explicit_id(world: &mut PipelineWorld, id: String) {
    world.explicit_id = Some(AppId::try_from(id).expect("valid id"));
}

#[given("the cancellation flag is raised")]
fn given_cancelled(world: &mut PipelineWorld) {
    world.cancel = true;
}

#[when("the package is installed")]
fn when_installed(world: &mut PipelineWorld) {
    let package = world.package.clone().expect("package written");
    let cancel = AtomicBool::new(world.cancel);
    let request = InstallRequest {
        explicit_id: world.explicit_id.clone(),
        temp_root: Some(world.scratch()),
        cancel: Some(&cancel),
        ..InstallRequest::default()
    };
    let registry = HandlerRegistry::with_builtin_handlers();
    world.outcome = Some(install_package(&package, &request, &ZipUnzipper, &registry));
}

#[then("installation succeeds")]
fn then_succeeds(world: &mut PipelineWorld) {
    let installation = world.installation();
    assert!(installation.root().path().is_dir());
}

#[then("the application name is \"{name}\"")]
fn then_name_is(world: &mut PipelineWorld, name: String) {
    assert_eq!(world.installation().descriptor().name(), Some(name.as_str()));
}

#[then("the application id is \"{id}\"")]
fn then_id_is(world: &mut PipelineWorld, id: String) {
    assert_eq!(world.installation().descriptor().id().as_str(), id);
}

#[then("the application id has {count:usize} characters")]
fn then_id_length(world: &mut PipelineWorld, count: usize) {
    let id = world.installation().descriptor().id().as_str();
    assert_eq!(id.len(), count);
    assert!(id.bytes().all(|b| (b'a'..=b'p').contains(&b)), "id: {id}");
}

#[then("the manifest field \"{field}\" is \"{value}\"")]
fn then_manifest_field(world: &mut PipelineWorld, field: String, value: String) {
    let manifest = world.installation().descriptor().manifest();
    assert_eq!(manifest.get_str(&field), Some(value.as_str()));
}

#[then("{count:usize} warnings are recorded")]
fn then_warning_count(world: &mut PipelineWorld, count: usize) {
    let warnings = world.installation().descriptor().warnings();
    assert_eq!(warnings.len(), count, "warnings: {warnings:?}");
}

#[then("installation fails with a manifest parse error")]
fn then_parse_error(world: &mut PipelineWorld) {
    let err = world.error();
    assert!(
        matches!(err, InstallError::Manifest(ManifestError::ParseError(_))),
        "got {err:?}"
    );
}

#[then("installation fails with a rejected manifest")]
fn then_rejected(world: &mut PipelineWorld) {
    let err = world.error();
    assert!(
        matches!(err, InstallError::Assemble(AssembleError::ManifestInvalid(_))),
        "got {err:?}"
    );
}

#[then("installation fails with an unrecognised format")]
fn then_unrecognised(world: &mut PipelineWorld) {
    let err = world.error();
    assert!(
        matches!(err, InstallError::Package(PackageError::UnrecognizedFormat { .. })),
        "got {err:?}"
    );
}

#[then("installation is cancelled")]
fn then_cancelled(world: &mut PipelineWorld) {
    assert!(matches!(world.error(), InstallError::Cancelled));
}

#[then("no extraction directory remains")]
fn then_no_extraction_dir(world: &mut PipelineWorld) {
    let remaining = fs::read_dir(world.scratch()).expect("read scratch").count();
    assert_eq!(remaining, 0);
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Signed package is ingested with a key-derived id"
)]
fn scenario_xpk_ingested(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Widget package takes its id from config.xml"
)]
fn scenario_wgt_ingested(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Widget without an identity attribute is rejected"
)]
fn scenario_wgt_missing_identity(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Explicit id overrides the key-derived id"
)]
fn scenario_explicit_id(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Missing version is reported as a warning"
)]
fn scenario_missing_version(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Nameless manifest is rejected by the handlers"
)]
fn scenario_nameless(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Plain text file is not a package"
)]
fn scenario_plain_text(world: PipelineWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/pipeline.feature",
    name = "Raised cancellation flag stops before extraction"
)]
fn scenario_cancelled(world: PipelineWorld) {
    let _ = world;
}
