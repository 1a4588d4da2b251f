//! External tool invocation.
//!
//! Every collaborator binary (ffmpeg, ffprobe, espeak-ng, pdftotext) is run
//! through [`run_tool`]: stdin closed, stdout/stderr captured, and the child
//! marked `kill_on_drop` so that dropping the future (e.g. when a stage
//! deadline fires) kills the process instead of leaking it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

/// The tool could not be run at all.
#[derive(Debug, Error)]
#[error("failed to run {program}: {source}")]
pub struct ToolError {
    pub program: String,
    #[source]
    pub source: std::io::Error,
}

/// Captured result of a finished tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Everything the tool printed: stderr first, then stdout, lossily
    /// decoded and otherwise untouched.
    pub fn diagnostics(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stderr).into_owned();
        text.push_str(&String::from_utf8_lossy(&self.stdout));
        text
    }
}

/// Run `program` with `args` to completion and capture its output.
///
/// A non-zero exit is *not* an error here; callers inspect
/// [`ToolOutput::success`] and decide how to report it.
pub async fn run_tool(program: &Path, args: &[OsString]) -> Result<ToolOutput, ToolError> {
    log::debug!(
        "media: running {} {}",
        program.display(),
        args.iter()
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    );

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ToolError {
            program: program.display().to_string(),
            source,
        })?;

    Ok(ToolOutput {
        code: output.status.code(),
        success: output.status.success(),
        stdout: output.stdout,
        stderr: output.stderr,
    })
}

/// Resolve a tool binary: explicit config path, then `PATH` lookup, then the
/// bare name (so the spawn error names the missing program).
pub fn locate_tool(configured: Option<&Path>, name: &str) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    which::which(name).unwrap_or_else(|_| PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_puts_stderr_first() {
        let out = ToolOutput {
            code: Some(1),
            success: false,
            stdout: b"out\n".to_vec(),
            stderr: b"err\n".to_vec(),
        };
        assert_eq!(out.diagnostics(), "err\nout\n");
    }

    #[test]
    fn configured_tool_path_wins() {
        let p = locate_tool(Some(Path::new("/opt/bin/ffmpeg")), "ffmpeg");
        assert_eq!(p, PathBuf::from("/opt/bin/ffmpeg"));
    }

    #[test]
    fn unknown_tool_falls_back_to_name() {
        let p = locate_tool(None, "definitely-not-a-real-tool-4711");
        assert_eq!(p, PathBuf::from("definitely-not-a-real-tool-4711"));
    }

    #[tokio::test]
    async fn missing_binary_is_tool_error() {
        let err = run_tool(Path::new("/nonexistent/bin/tool"), &[])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bin/tool"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captures_exit_code_and_streams() {
        let args: Vec<OsString> = vec!["-c".into(), "echo hi; echo oops >&2; exit 3".into()];
        let out = run_tool(Path::new("/bin/sh"), &args).await.unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.diagnostics(), "oops\nhi\n");
    }
}
