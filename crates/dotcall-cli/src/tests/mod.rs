//! Runtime tests: argument handling, exit codes, and stderr reporting.

pub(crate) mod support;

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use dotcall_config::{Config, ConfigError};
use rstest::rstest;

use self::support::{ModuleTree, StaticConfigLoader, StubLoader};
use super::*;

struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, AppError> {
        Err(AppError::LoadConfiguration(ConfigError::NonUtf8Root {
            path: PathBuf::from("/odd"),
        }))
    }
}

struct Run {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn args(tokens: &[&str]) -> Vec<OsString> {
    std::iter::once("dotcall")
        .chain(tokens.iter().copied())
        .map(OsString::from)
        .collect()
}

fn run_in(tree: &ModuleTree, loader: &StubLoader, tokens: &[&str]) -> Run {
    let config_loader = StaticConfigLoader {
        config: Config::default().with_search_root(tree.root()),
    };
    run_with_loaders(&config_loader, loader, tokens)
}

fn run_with_loaders(config_loader: &impl ConfigLoader, loader: &StubLoader, tokens: &[&str]) -> Run {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run_with(args(tokens), &mut stdout, &mut stderr, config_loader, loader);
    Run {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout is UTF-8"),
        stderr: String::from_utf8(stderr).expect("stderr is UTF-8"),
    }
}

#[test]
fn successful_invocation_exits_zero() {
    let tree = ModuleTree::new();
    tree.place("bin/SampleLib");
    let loader = StubLoader::default();

    let run = run_in(
        &tree,
        &loader,
        &["-a", "SampleLib", "-c", "Sample.Greeter", "-m", "Greet", "-d", r#"{"Name":"Ada"}"#],
    );

    assert_eq!(run.exit, ExitCode::SUCCESS, "stderr: {}", run.stderr);
    assert!(run.stderr.is_empty());
    assert_eq!(loader.log.calls(), ["Greet:Ada"]);
}

#[test]
fn long_option_names_are_accepted() {
    let tree = ModuleTree::new();
    tree.place("lib/SampleLib");
    let loader = StubLoader::default();

    let run = run_in(
        &tree,
        &loader,
        &[
            "--assembly",
            "SampleLib",
            "--class",
            "Sample.Greeter",
            "--method",
            "Ping",
        ],
    );

    assert_eq!(run.exit, ExitCode::SUCCESS, "stderr: {}", run.stderr);
    assert_eq!(loader.log.calls(), ["Ping"]);
}

#[rstest]
#[case::all(&[], "--assembly, --class, --method")]
#[case::class_and_method(&["-a", "SampleLib"], "--class, --method")]
#[case::method(&["-a", "SampleLib", "-c", "Sample.Greeter"], "--method")]
fn missing_options_exit_one(#[case] tokens: &[&str], #[case] missing: &str) {
    let tree = ModuleTree::new();
    let loader = StubLoader::default();

    let run = run_in(&tree, &loader, tokens);

    assert_eq!(run.exit, ExitCode::from(1));
    assert_eq!(
        run.stderr.trim_end(),
        format!("Required input was not supplied: {missing}")
    );
    assert!(loader.log.calls().is_empty());
}

#[rstest]
#[case::short("-h")]
#[case::question("-?")]
#[case::long("--help")]
fn help_exits_zero_without_invoking(#[case] flag: &str) {
    let tree = ModuleTree::new();
    tree.place("bin/SampleLib");
    let loader = StubLoader::default();

    let run = run_in(
        &tree,
        &loader,
        &[flag, "-a", "SampleLib", "-c", "Sample.Greeter", "-m", "Greet"],
    );

    assert_eq!(run.exit, ExitCode::SUCCESS);
    assert!(run.stdout.contains("--assembly"), "stdout: {}", run.stdout);
    assert!(loader.log.calls().is_empty());
}

#[test]
fn version_flag_prints_version() {
    let tree = ModuleTree::new();
    let run = run_in(&tree, &StubLoader::default(), &["--version"]);

    assert_eq!(run.exit, ExitCode::SUCCESS);
    assert!(
        run.stdout.contains(env!("CARGO_PKG_VERSION")),
        "stdout: {}",
        run.stdout
    );
}

#[test]
fn unknown_argument_exits_one() {
    let tree = ModuleTree::new();
    let run = run_in(&tree, &StubLoader::default(), &["--frobnicate"]);

    assert_eq!(run.exit, ExitCode::from(1));
    assert!(run.stderr.contains("--frobnicate"), "stderr: {}", run.stderr);
}

#[rstest]
#[case::method(&["-c", "Sample.Greeter", "-m", "DoesNotExist"], "method 'DoesNotExist' was not found")]
#[case::type_name(&["-c", "Sample.Nope", "-m", "Greet"], "type 'Sample.Nope' is not defined")]
#[case::payload(&["-c", "Sample.Greeter", "-m", "Greet", "-d", "{oops"], "malformed payload")]
fn pipeline_failures_exit_two(#[case] tokens: &[&str], #[case] message: &str) {
    let tree = ModuleTree::new();
    tree.place("bin/SampleLib");
    let loader = StubLoader::default();
    let mut full = vec!["-a", "SampleLib"];
    full.extend_from_slice(tokens);

    let run = run_in(&tree, &loader, &full);

    assert_eq!(run.exit, ExitCode::from(2));
    assert!(run.stderr.contains(message), "stderr: {}", run.stderr);
    assert!(loader.log.calls().is_empty());
}

#[test]
fn missing_module_exits_two() {
    let tree = ModuleTree::new();
    let run = run_in(
        &tree,
        &StubLoader::default(),
        &["-a", "Nowhere", "-c", "Sample.Greeter", "-m", "Greet"],
    );

    assert_eq!(run.exit, ExitCode::from(2));
    assert!(
        run.stderr.contains("could not find module 'Nowhere'"),
        "stderr: {}",
        run.stderr
    );
}

#[test]
fn configuration_failure_exits_one() {
    let loader = StubLoader::default();
    let run = run_with_loaders(
        &FailingConfigLoader,
        &loader,
        &["-a", "SampleLib", "-c", "Sample.Greeter", "-m", "Greet"],
    );

    assert_eq!(run.exit, ExitCode::from(1));
    assert!(
        run.stderr.contains("failed to load configuration"),
        "stderr: {}",
        run.stderr
    );
}
