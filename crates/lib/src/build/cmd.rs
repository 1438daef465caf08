//! Build command execution.
//!
//! The command runs through a shell with a cleared environment: only the
//! variables the builder sets plus an explicit passthrough allowlist are
//! visible, so host state cannot leak into the artifact unnoticed.

use std::collections::BTreeMap;
use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

/// Lines of stderr kept for diagnostics.
const DIAGNOSTIC_TAIL_LINES: usize = 20;

#[derive(Debug)]
pub struct CmdOutput {
  pub code: Option<i32>,
  pub stdout: String,
  pub stderr: String,
}

impl CmdOutput {
  pub fn success(&self) -> bool {
    self.code == Some(0)
  }

  /// Exit status and the last lines of stderr, for error reports.
  pub fn diagnostic(&self) -> String {
    let lines: Vec<&str> = self.stderr.lines().collect();
    let tail = lines[lines.len().saturating_sub(DIAGNOSTIC_TAIL_LINES)..].join("\n");
    let status = match self.code {
      Some(code) => format!("exit code {}", code),
      None => "terminated by signal".to_string(),
    };
    if tail.trim().is_empty() {
      status
    } else {
      format!("{}\n{}", status, tail)
    }
  }
}

/// Runs `cmd` in `cwd` with exactly `env` (plus the listed host variables).
pub async fn run_isolated(
  cmd: &str,
  env: &BTreeMap<String, String>,
  pass_env: &[String],
  cwd: &Path,
  shell: Option<&str>,
) -> std::io::Result<CmdOutput> {
  info!(cmd = %cmd, cwd = ?cwd, "running build command");

  let (shell_cmd, shell_args) = get_shell(shell);

  let mut command = Command::new(&shell_cmd);
  command.args(&shell_args).arg(cmd).current_dir(cwd).env_clear();

  for key in pass_env {
    if let Some(value) = std::env::var_os(key) {
      command.env(key, value);
    }
  }
  command.envs(env);

  debug!(shell = %shell_cmd, "spawning process");
  let output = command.output().await?;

  let result = CmdOutput {
    code: output.status.code(),
    stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
  };

  if !result.stdout.is_empty() {
    debug!(stdout = %result.stdout, "command stdout");
  }
  if !result.stderr.is_empty() {
    debug!(stderr = %result.stderr, "command stderr");
  }

  Ok(result)
}

/// Shell binary and the flag that precedes the command string.
///
/// Defaults to `/bin/sh` rather than `$SHELL`: interactive shells source
/// profile files that would modify the isolated environment.
fn get_shell(override_shell: Option<&str>) -> (String, Vec<String>) {
  if let Some(shell) = override_shell {
    let args = if shell.contains("powershell") || shell.contains("pwsh") {
      vec!["-NoProfile".to_string(), "-Command".to_string()]
    } else if shell.contains("cmd") {
      vec!["/C".to_string()]
    } else {
      vec!["-c".to_string()]
    };
    return (shell.to_string(), args);
  }

  #[cfg(unix)]
  {
    ("/bin/sh".to_string(), vec!["-c".to_string()])
  }

  #[cfg(windows)]
  {
    ("cmd.exe".to_string(), vec!["/C".to_string()])
  }
}
