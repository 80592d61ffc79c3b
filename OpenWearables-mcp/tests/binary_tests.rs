//! Launches the server binary the way an MCP client does

use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Empty env file so no `.env` from the surrounding checkout is picked up
struct EnvFile(PathBuf);

impl EnvFile {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("open_wearables_{}.env", uuid::Uuid::new_v4()));
        std::fs::write(&path, "").unwrap();
        Self(path)
    }
}

impl Drop for EnvFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

fn server(env_file: &EnvFile) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_open_wearables_mcp"));
    command
        .arg("--env-file")
        .arg(&env_file.0)
        .env("MCP_TRANSPORT", "stdio")
        .env("DB_TYPE", "sqlite")
        .env("DB_SQLITE_PATH", ":memory:")
        .env("RUST_LOG", "info");
    command
}

#[test]
fn test_stdout_stays_empty_without_requests() {
    let env_file = EnvFile::new();
    let output = server(&env_file)
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Starting Open Wearables MCP server"));
}

#[test]
fn test_startup_failure_exits_non_zero() {
    let env_file = EnvFile::new();
    let output = server(&env_file)
        .env("DB_TYPE", "postgres")
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unsupported database type"));
}

#[test]
fn test_missing_env_file_exits_non_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_open_wearables_mcp"))
        .arg("--env-file")
        .arg(std::env::temp_dir().join(format!("missing_{}.env", uuid::Uuid::new_v4())))
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[cfg(unix)]
#[test]
fn test_sigterm_ends_process_while_stdin_is_open() {
    let env_file = EnvFile::new();
    let mut child = server(&env_file)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());

    writeln!(stdin, r#"{{"jsonrpc":"2.0","id":1,"method":"ping"}}"#).unwrap();
    stdin.flush().unwrap();
    let mut line = String::new();
    stdout.read_line(&mut line).unwrap();
    assert!(line.contains(r#""id":1"#), "unexpected response: {}", line);

    // Let the protocol loop park on the next read before signalling
    std::thread::sleep(Duration::from_millis(300));
    let killed = Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let deadline = Instant::now() + Duration::from_secs(5);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            child.kill().unwrap();
            panic!("server still running 5s after SIGTERM");
        }
        std::thread::sleep(Duration::from_millis(50));
    };

    assert!(status.success(), "exit status: {}", status);
    drop(stdin);
}
