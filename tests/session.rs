//! End-to-end runs against real child processes.

use dsh::{Command, Environment, Executor, Interpreter, LineSource, ReadOutcome};
use std::collections::{HashMap, VecDeque};
use std::ffi::OsString;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn env_with_path(path: &str, current_dir: &Path) -> Environment {
    let mut vars = HashMap::new();
    vars.insert("PATH".to_string(), OsString::from(path));
    Environment {
        vars,
        user: None,
        home_dir: None,
        current_dir: current_dir.to_path_buf(),
    }
}

fn execute(executor: &mut Executor, line: &str) -> Command {
    let mut command = Command::parse(line);
    executor.execute_with(&mut command, &mut Vec::new(), &mut Vec::new());
    command
}

#[test]
fn exit_status_passes_through() {
    let temp = tempfile::tempdir().unwrap();
    script(temp.path(), "three", "exit 3");
    let mut executor = Executor::new(env_with_path(
        &temp.path().display().to_string(),
        temp.path(),
    ));

    assert_eq!(execute(&mut executor, "three").result_code(), 3);
}

#[test]
fn killed_child_is_generic_failure() {
    let temp = tempfile::tempdir().unwrap();
    script(temp.path(), "suicide", "kill -9 $$");
    let mut executor = Executor::new(env_with_path(
        &temp.path().display().to_string(),
        temp.path(),
    ));

    let command = execute(&mut executor, "suicide");
    assert_eq!(command.result_code(), dsh::GENERIC_FAILURE);
}

#[test]
fn unloadable_program_is_not_success() {
    let temp = tempfile::tempdir().unwrap();
    // executable bit set, no shebang, not a valid binary either
    let path = temp.path().join("garbage");
    fs::write(&path, [0x7f, b'E', b'L', b'F', 1, 2, 3, 4]).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    let mut executor = Executor::new(env_with_path(
        &temp.path().display().to_string(),
        temp.path(),
    ));
    let mut command = Command::parse("garbage");
    let mut err = Vec::new();

    let code = executor.execute_with(&mut command, &mut Vec::new(), &mut err);

    assert_ne!(code, 0);
    assert_eq!(code, dsh::error::EXEC_FAILED);
    assert_eq!(command.result_code(), code);
    let err = String::from_utf8(err).unwrap();
    assert!(err.starts_with("dsh: garbage: cannot execute: "), "{err}");
}

#[test]
fn argv_zero_is_name_as_typed() {
    let temp = tempfile::tempdir().unwrap();
    let out = temp.path().join("out");
    script(
        temp.path(),
        "record",
        &format!("echo \"$0 $*\" > {}", out.display()),
    );
    let mut executor = Executor::new(env_with_path(
        &temp.path().display().to_string(),
        temp.path(),
    ));

    let command = execute(&mut executor, "record  a b");
    assert_eq!(command.result_code(), 0);
    let recorded = fs::read_to_string(&out).unwrap();
    // sh reports the script path as $0, the remaining arguments arrive untouched
    assert!(recorded.trim_end().ends_with(" a b"), "{recorded}");
}

#[test]
fn shadowing_prefers_first_search_entry() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    script(first.path(), "tool", "exit 10");
    script(second.path(), "tool", "exit 20");
    let search = format!("{}:{}", first.path().display(), second.path().display());
    let mut executor = Executor::new(env_with_path(&search, first.path()));

    assert_eq!(execute(&mut executor, "tool").result_code(), 10);
}

#[test]
fn children_run_in_tracked_directory() {
    let temp = tempfile::tempdir().unwrap();
    let work = fs::canonicalize(temp.path()).unwrap();
    let out = work.join("where");
    script(&work, "whereami", &format!("pwd > {}", out.display()));
    let mut executor = Executor::new(env_with_path(&work.display().to_string(), &work));

    execute(&mut executor, "whereami");
    assert_eq!(fs::read_to_string(&out).unwrap().trim_end(), work.display().to_string());
}

struct Lines(VecDeque<String>);

impl LineSource for Lines {
    fn read_line(&mut self, _prompt: &str) -> anyhow::Result<ReadOutcome> {
        Ok(self.0.pop_front().map_or(ReadOutcome::Eof, ReadOutcome::Line))
    }

    fn add_history(&mut self, _line: &str) {}
}

#[test]
fn session_runs_until_exit() {
    let temp = tempfile::tempdir().unwrap();
    let marker = temp.path().join("marker");
    script(temp.path(), "mark", &format!("touch {}", marker.display()));
    let env = env_with_path(&temp.path().display().to_string(), temp.path());
    let mut sh = Interpreter::with_executor(Executor::new(env));
    let mut lines = Lines(
        ["mark", "nosuchcommand", "exit 5", "never"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    let mut err = Vec::new();

    let code = sh.repl_with(&mut lines, &mut Vec::new(), &mut err);

    assert_eq!(code, 5);
    assert!(marker.exists());
    assert_eq!(
        String::from_utf8(err).unwrap(),
        "dsh: nosuchcommand: command not found\n"
    );
    assert_eq!(lines.0, ["never"]);
}
