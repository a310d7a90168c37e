//! Blocking subprocess invocation.
//!
//! Every call waits for the child to exit and captures the complete stdout
//! and stderr streams; there is no buffer limit and no timeout.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Command;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{CoverageError, CoverageResult};

/// Captured streams of a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Run `program` with `args` to completion.
///
/// Succeeds only on exit status 0. Any other status is an
/// [`CoverageError::ExternalProcess`] carrying the exit code and stderr.
pub fn run<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> CoverageResult<ProcessOutput> {
    let command = render_command(program, args);
    debug!(%command, "running");

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|err| CoverageError::spawn(program.display(), err))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        debug!(%command, code = ?output.status.code(), "command failed");
        return Err(CoverageError::external(command, output.status.code(), stderr));
    }

    Ok(ProcessOutput { stdout, stderr })
}

/// Run `program` with `args` plus a trailing `--json` and parse stdout.
pub fn run_json<T, S>(program: &Path, args: &[S]) -> CoverageResult<T>
where
    T: DeserializeOwned,
    S: AsRef<OsStr>,
{
    let mut args: Vec<&OsStr> = args.iter().map(|arg| arg.as_ref()).collect();
    args.push(OsStr::new("--json"));

    let output = run(program, args.as_slice())?;
    serde_json::from_str(&output.stdout)
        .map_err(|err| CoverageError::malformed(render_command(program, args.as_slice()), err))
}

fn render_command<S: AsRef<OsStr>>(program: &Path, args: &[S]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

#[cfg(all(test, unix))]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use serde::Deserialize;

    fn sh() -> &'static Path {
        Path::new("/bin/sh")
    }

    #[test]
    fn run__zero_exit__then_captures_both_streams() {
        let output = run(sh(), &["-c", "printf out; printf err >&2"]).unwrap();
        assert_eq!(output.stdout, "out");
        assert_eq!(output.stderr, "err");
    }

    #[test]
    fn run__nonzero_exit__then_external_error_with_code_and_stderr() {
        let err = run(sh(), &["-c", "echo nope >&2; exit 11"]).unwrap_err();
        match err {
            CoverageError::ExternalProcess { command, code, stderr } => {
                assert_eq!(command, "/bin/sh -c echo nope >&2; exit 11");
                assert_eq!(code, Some(11));
                assert_eq!(stderr, "nope\n");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn run__missing_program__then_spawn_error() {
        let err = run(Path::new("/definitely/not/a/binary"), &["x"]).unwrap_err();
        assert!(matches!(err, CoverageError::Spawn { .. }));
    }

    #[test]
    fn run__large_output__then_not_truncated() {
        let output = run(sh(), &["-c", "yes x | head -n 200000"]).unwrap();
        assert_eq!(output.stdout.lines().count(), 200_000);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Echoed {
        args: Vec<String>,
    }

    #[test]
    fn run_json__appends_json_flag__then_parses_stdout() {
        // The script echoes its positional arguments back as a JSON array.
        let script = r#"printf '{"args":['; sep=''; for a in "$@"; do printf '%s"%s"' "$sep" "$a"; sep=','; done; printf ']}'"#;
        let parsed: Echoed = run_json(sh(), &["-c", script, "sh", "ls"]).unwrap();
        assert_eq!(parsed.args, vec!["ls".to_string(), "--json".to_string()]);
    }

    #[test]
    fn run_json__unparseable_stdout__then_malformed_output() {
        let err = run_json::<Echoed, _>(sh(), &["-c", "echo not-json"]).unwrap_err();
        match err {
            CoverageError::MalformedOutput { command, .. } => {
                assert_eq!(command, "/bin/sh -c echo not-json --json");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
