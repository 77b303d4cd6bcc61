use libtest_mimic::{Arguments, Failed, Trial};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::{env, fs, io};
use walkdir::WalkDir;

fn main() {
    let args = Arguments::from_args();

    std::env::set_current_dir("..").unwrap();

    let tests = std::iter::empty()
        .chain(find_source_files("tests/modules").map(|path| make_test(path, TestMode::ElabModule)))
        .chain(find_source_files("tests/terms").map(|path| make_test(path, TestMode::ElabTerm)))
        .collect();

    libtest_mimic::run(&args, tests).exit();
}

#[derive(Copy, Clone)]
enum TestMode {
    ElabModule,
    ElabTerm,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
struct Config {
    #[serde(default = "DEFAULT_IGNORE")]
    ignore: bool,
    #[serde(default = "DEFAULT_EXIT_CODE")]
    exit_code: i32,
    #[serde(skip)]
    update_snapshots: bool,
    #[serde(default = "DEFAULT_TEST_NORMALISATION")]
    test_normalisation: bool,
}

const DEFAULT_IGNORE: fn() -> bool = || false;
const DEFAULT_EXIT_CODE: fn() -> i32 = || 0;
const DEFAULT_TEST_NORMALISATION: fn() -> bool = || false;

struct TestFailure {
    name: &'static str,
    details: Vec<(&'static str, String)>,
}

/// The recorded output of a command. Standard error is only compared when
/// the snapshot records it.
#[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
#[serde(rename_all = "kebab-case")]
struct SnapshotData {
    stdout: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stderr: Option<String>,
}

#[derive(Debug)]
struct Snapshot {
    path: PathBuf,
    expected: Option<SnapshotData>,
    actual: SnapshotData,
}

#[derive(Eq, PartialEq, Debug)]
enum SnapshotOutcome {
    Equal,
    Different,
    Missing,
}

#[derive(Copy, Clone)]
enum Command {
    ElabModule,
    ElabTerm,
    Normalise,
}

impl Command {
    fn snap_name(&self) -> &'static str {
        match self {
            Command::Normalise => "norm",
            Command::ElabModule | Command::ElabTerm => "",
        }
    }
}

struct TestCommand<'a> {
    command: Command,
    config: &'a Config,
    input_file: &'a Path,
}

/// Recursively walk over test files under a file path.
fn find_source_files(root: impl AsRef<Path>) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches!(entry.path().extension(), Some(ext) if ext == "pie"))
        .map(|entry| entry.into_path())
}

fn make_test(input_file: PathBuf, mode: TestMode) -> Trial {
    let name = input_file.display().to_string();
    match read_config(&input_file) {
        Ok(config) => {
            let ignore = config.ignore;
            Trial::test(name, move || run_test(&input_file, mode, &config)).with_ignored_flag(ignore)
        }
        Err(failure) => Trial::test(name, move || failures_to_outcome(&[failure])),
    }
}

fn read_config(input_file: &Path) -> Result<Config, TestFailure> {
    use itertools::Itertools;

    const CONFIG_COMMENT_START: &str = ";~";

    let input_source = fs::read_to_string(input_file).map_err(|error| TestFailure {
        name: "unreadable test file",
        details: vec![("std::io::Error", error.to_string())],
    })?;
    // Collect the lines with CONFIG_COMMENT_START prefix, stripping the prefix in the process
    let config_source = input_source
        .lines()
        .filter_map(|line| line.split(CONFIG_COMMENT_START).nth(1))
        .join("\n");

    match toml::from_str::<Config>(&config_source) {
        Ok(mut config) => {
            config.update_snapshots = env::var_os("PIE_UPDATE_SNAP").is_some();
            Ok(config)
        }
        Err(error) => Err(TestFailure {
            name: "config parse error",
            details: vec![("toml::de::Error", error.to_string())],
        }),
    }
}

fn run_test(input_file: &Path, mode: TestMode, config: &Config) -> Result<(), Failed> {
    let mut failures = Vec::new();

    let mut commands = vec![match mode {
        TestMode::ElabModule => Command::ElabModule,
        TestMode::ElabTerm => Command::ElabTerm,
    }];
    if config.test_normalisation {
        commands.push(Command::Normalise);
    }

    for command in commands {
        let test_command = TestCommand::new(command, config, input_file);
        match test_command.run() {
            Ok(mut test_failures) => failures.append(&mut test_failures),
            Err(error) => {
                failures.push(TestFailure {
                    name: "unexpected test command error",
                    details: vec![("std::io::Error", error.to_string())],
                });
            }
        }
    }

    failures_to_outcome(&failures)
}

fn failures_to_outcome(failures: &[TestFailure]) -> Result<(), Failed> {
    if failures.is_empty() {
        return Ok(());
    }

    let mut msg = String::new();

    writeln!(msg).unwrap();
    for failure in failures {
        writeln!(msg, "    {}:", failure.name).unwrap();
        for (name, data) in &failure.details {
            writeln!(msg, "        ---- {name} ----").unwrap();
            for line in data.lines() {
                writeln!(msg, "        {line}").unwrap();
            }
        }
        writeln!(msg).unwrap();
    }
    writeln!(msg).unwrap();
    writeln!(msg, "    failures:").unwrap();
    for failure in failures {
        writeln!(msg, "        {}", failure.name).unwrap();
    }

    Err(msg.into())
}

impl<'a> TestCommand<'a> {
    fn new(command: Command, config: &'a Config, input_file: &'a Path) -> Self {
        TestCommand {
            command,
            config,
            input_file,
        }
    }

    fn run(&self) -> Result<Vec<TestFailure>, io::Error> {
        let mut failures = Vec::new();
        let mut exe = process::Command::from(self.command);
        exe.arg(self.input_file);

        let output = match exe.output() {
            Ok(output) => output,
            Err(error) => {
                failures.push(TestFailure {
                    name: "unexpected command error",
                    details: vec![("std::io::Error", error.to_string())],
                });
                return Ok(failures);
            }
        };

        let mut snapshot = Snapshot::new(self.command, self.input_file, &output)?;

        // Update if requested
        if self.config.update_snapshots && snapshot.outcome() != SnapshotOutcome::Equal {
            snapshot.update()?;
        }

        match snapshot.outcome() {
            SnapshotOutcome::Equal => {}
            SnapshotOutcome::Different => {
                let mut details = vec![("path", snapshot.path.to_string_lossy().into_owned())];
                if let Some(diff) = snapshot.stdout_diff() {
                    details.push(("stdout diff", diff));
                }
                if let Some(diff) = snapshot.stderr_diff() {
                    details.push(("stderr diff", diff));
                }

                failures.push(TestFailure {
                    name: "snapshot mismatch",
                    details,
                });
            }
            SnapshotOutcome::Missing => {
                let mut details = vec![("path", snapshot.path.to_string_lossy().into_owned())];
                if !snapshot.stdout().is_empty() {
                    details.push(("stdout", snapshot.stdout().to_owned()));
                }
                if !snapshot.stderr().is_empty() {
                    details.push(("stderr", snapshot.stderr().to_owned()));
                }

                failures.push(TestFailure {
                    name: "snapshot missing",
                    details,
                });
            }
        }

        if output.status.code() != Some(self.config.exit_code) {
            let mut details = vec![
                ("command", format!("{exe:?}")),
                ("status", output.status.to_string()),
            ];
            if !snapshot.stdout().is_empty() {
                details.push(("stdout", snapshot.stdout().to_owned()));
            }
            if !snapshot.stderr().is_empty() {
                details.push(("stderr", snapshot.stderr().to_owned()));
            }
            failures.push(TestFailure {
                name: "unexpected command output",
                details,
            });
        }

        Ok(failures)
    }
}

impl From<Command> for process::Command {
    fn from(command: Command) -> Self {
        let mut exe = process::Command::new(env!("CARGO_BIN_EXE_pie"));
        match command {
            Command::ElabModule => exe.args(["elab", "--module"]),
            Command::ElabTerm => exe.args(["elab", "--term"]),
            Command::Normalise => exe.args(["norm", "--term"]),
        };
        exe
    }
}

impl Snapshot {
    fn new(
        command: Command,
        test_path: &Path,
        output: &process::Output,
    ) -> Result<Snapshot, io::Error> {
        let mut file_name = test_path.file_stem().unwrap().to_os_string();
        let snap_suffix = command.snap_name();
        if !snap_suffix.is_empty() {
            file_name.push(".");
            file_name.push(snap_suffix);
        }
        file_name.push(".snap");

        let path = test_path.with_file_name(file_name);
        let actual = SnapshotData {
            stdout: String::from_utf8_lossy(&output.stdout).into(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into()),
        };
        let expected = match fs::read_to_string(&path) {
            Ok(snap) => toml::from_str(&snap)
                .map(Some)
                .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?,
            // Snapshot is missing and needs to be generated
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => return Err(err),
        };
        Ok(Snapshot {
            path,
            expected,
            actual,
        })
    }

    fn stdout(&self) -> &str {
        &self.actual.stdout
    }

    fn stderr(&self) -> &str {
        self.actual.stderr.as_deref().unwrap_or("")
    }

    fn update(&mut self) -> Result<(), io::Error> {
        let mut actual = self.actual.clone();
        if self.stderr().is_empty() {
            actual.stderr = None;
        }
        let serialised = toml::to_string_pretty(&actual)
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
        fs::write(&self.path, serialised)?;
        self.expected = Some(actual);
        Ok(())
    }

    fn outcome(&self) -> SnapshotOutcome {
        match &self.expected {
            None => SnapshotOutcome::Missing,
            Some(expected) => {
                let stderr_matches = match &expected.stderr {
                    Some(stderr) => stderr == self.stderr(),
                    None => true,
                };
                match expected.stdout == self.actual.stdout && stderr_matches {
                    true => SnapshotOutcome::Equal,
                    false => SnapshotOutcome::Different,
                }
            }
        }
    }

    fn stdout_diff(&self) -> Option<String> {
        let expected = self.expected.as_ref()?;
        make_diff(&self.actual.stdout, &expected.stdout)
    }

    fn stderr_diff(&self) -> Option<String> {
        let expected = self.expected.as_ref()?.stderr.as_ref()?;
        make_diff(self.stderr(), expected)
    }
}

fn make_diff(actual: &str, expected: &str) -> Option<String> {
    let mut diff = String::new();
    let mut left_line_number = 0;
    let mut right_line_number = 0;
    let line_width = (actual.lines().count().max(expected.lines().count()) as f32)
        .log10()
        .ceil() as usize;
    for result in diff::lines(expected, actual) {
        match result {
            diff::Result::Left(l) => {
                left_line_number += 1;
                diff.push_str(&diff_line('-', left_line_number, line_width, l));
            }
            diff::Result::Both(_, _) => {
                left_line_number += 1;
                right_line_number += 1;
            }
            diff::Result::Right(r) => {
                right_line_number += 1;
                diff.push_str(&diff_line('+', right_line_number, line_width, r));
            }
        }
    }
    match diff.is_empty() {
        true => None,
        false => Some(diff),
    }
}

fn diff_line(sign: char, line_number: usize, line_width: usize, line: &str) -> String {
    format!("{line_number:>line_width$}| {sign} {line}\n")
}
