//! Wrapper script rendering.

use std::path::Path;

/// Quotes `arg` for a POSIX shell: wrapped in single quotes, with embedded
/// single quotes written as `'\''`.
pub fn shell_quote(arg: &str) -> String {
  format!("'{}'", arg.replace('\'', r"'\''"))
}

/// A `/bin/sh` script that replaces itself with `executable`, passing `args`
/// first and the caller's arguments after.
pub fn render_posix(executable: &Path, args: &[String]) -> String {
  let mut line = format!("exec {}", shell_quote(&executable.to_string_lossy()));
  for arg in args {
    line.push(' ');
    line.push_str(&shell_quote(arg));
  }
  line.push_str(" \"$@\"");
  format!("#!/bin/sh\n{}\n", line)
}

fn cmd_quote(arg: &str) -> String {
  format!("\"{}\"", arg.replace('%', "%%").replace('"', "\"\""))
}

/// Batch file equivalent of [`render_posix`]. `exit /b` forwards the exit code.
pub fn render_cmd(executable: &Path, args: &[String]) -> String {
  let mut line = format!("@echo off\r\n{}", cmd_quote(&executable.to_string_lossy()));
  for arg in args {
    line.push(' ');
    line.push_str(&cmd_quote(arg));
  }
  line.push_str(" %*\r\nexit /b %ERRORLEVEL%\r\n");
  line
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quotes_embedded_single_quotes() {
    assert_eq!(shell_quote("it's"), r"'it'\''s'");
    assert_eq!(shell_quote(""), "''");
    assert_eq!(shell_quote("$HOME `x`"), "'$HOME `x`'");
  }

  #[test]
  fn posix_script_execs_artifact_with_bundles_then_caller_args() {
    let script = render_posix(
      Path::new("/store/build/abc/bin/node"),
      &["happ-store".to_string(), "dna two".to_string()],
    );
    assert_eq!(
      script,
      "#!/bin/sh\nexec '/store/build/abc/bin/node' 'happ-store' 'dna two' \"$@\"\n"
    );
  }

  #[test]
  fn posix_script_without_bundles_only_forwards() {
    let script = render_posix(Path::new("/n"), &[]);
    assert_eq!(script, "#!/bin/sh\nexec '/n' \"$@\"\n");
  }

  #[test]
  fn cmd_script_escapes_percent_and_quotes() {
    let script = render_cmd(Path::new(r"C:\store\node.exe"), &["50%".to_string(), "a\"b".to_string()]);
    assert!(script.contains(r#""C:\store\node.exe" "50%%" "a""b" %*"#));
    assert!(script.ends_with("exit /b %ERRORLEVEL%\r\n"));
  }
}
