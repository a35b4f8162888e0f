//! exiftool-backed metadata gateway
//!
//! Starting exiftool costs far more than a single read, so one process is
//! kept alive in `-stay_open` mode for the whole session. Commands are sent
//! as one argument per line on stdin, terminated by `-execute`; exiftool
//! answers on stdout and prints `{ready}` when the command is done.

use serde::Deserialize;
use serde_json::Value;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use super::{GatewayError, MetadataGateway, KEYWORD_TAG};

/// Line exiftool prints after each executed command
const READY_MARKER: &str = "{ready}";

/// Handle to a running `exiftool -stay_open` process.
///
/// Acquire it once with `spawn` and release it with `close`. Dropping the
/// handle closes the process too, so every exit path shuts exiftool down.
#[derive(Debug)]
pub struct ExifTool {
    process: Mutex<Option<Process>>,
}

#[derive(Debug)]
struct Process {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    stderr_drain: Option<JoinHandle<()>>,
}

impl ExifTool {
    /// Start `program` in stay-open mode
    pub fn spawn(program: impl AsRef<OsStr>) -> Result<Self, GatewayError> {
        let mut command = Command::new(program);
        command.args(["-stay_open", "True", "-@", "-"]);
        Self::start(command)
    }

    fn start(mut command: Command) -> Result<Self, GatewayError> {
        let program = command.get_program().to_os_string();
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| GatewayError::Tool("stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GatewayError::Tool("stdout not captured".to_string()))?;

        // exiftool reports per-file problems on stderr; nothing else reads it
        let stderr_drain = match child.stderr.take() {
            Some(stderr) => Some(
                thread::Builder::new()
                    .name("exiftool-stderr".to_string())
                    .spawn(move || {
                        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                            if !line.trim().is_empty() {
                                tracing::warn!(target: "exiftool", "{}", line.trim());
                            }
                        }
                    })?,
            ),
            None => None,
        };

        tracing::info!(
            "🔧 Started {} (pid {})",
            program.to_string_lossy(),
            child.id()
        );

        Ok(Self {
            process: Mutex::new(Some(Process {
                child,
                stdin,
                stdout: BufReader::new(stdout),
                stderr_drain,
            })),
        })
    }

    /// Stop the exiftool process and wait for it to exit.
    ///
    /// Later gateway calls fail with `GatewayError::Closed`. Closing twice is
    /// a no-op.
    pub fn close(&self) -> Result<(), GatewayError> {
        let process = self
            .process
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match process {
            Some(process) => process.shutdown(),
            None => Ok(()),
        }
    }

    fn execute(&self, args: &[&str]) -> Result<String, GatewayError> {
        let mut guard = self.process.lock().unwrap_or_else(PoisonError::into_inner);
        let process = guard.as_mut().ok_or(GatewayError::Closed)?;
        process.execute(args)
    }
}

impl Drop for ExifTool {
    fn drop(&mut self) {
        let process = self
            .process
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(process) = process {
            if let Err(err) = process.shutdown() {
                tracing::warn!("exiftool did not shut down cleanly: {err}");
            }
        }
    }
}

impl Process {
    fn execute(&mut self, args: &[&str]) -> Result<String, GatewayError> {
        // One argument per line, so a newline would split it in two. Checked
        // before writing so a rejected command leaves nothing half-sent
        if let Some(arg) = args.iter().find(|arg| arg.contains('\n')) {
            return Err(GatewayError::Tool(format!(
                "argument contains a line break: {arg:?}"
            )));
        }
        for arg in args {
            writeln!(self.stdin, "{arg}")?;
        }
        writeln!(self.stdin, "-execute")?;
        self.stdin.flush()?;

        let mut output = String::new();
        let mut line = String::new();
        loop {
            line.clear();
            if self.stdout.read_line(&mut line)? == 0 {
                return Err(GatewayError::Tool("process exited unexpectedly".to_string()));
            }
            if line.trim_end() == READY_MARKER {
                return Ok(output);
            }
            output.push_str(&line);
        }
    }

    fn shutdown(self) -> Result<(), GatewayError> {
        let Process {
            mut child,
            mut stdin,
            stdout,
            stderr_drain,
        } = self;

        writeln!(stdin, "-stay_open")?;
        writeln!(stdin, "False")?;
        stdin.flush()?;
        // EOF on the argument file also ends the process
        drop(stdin);
        drop(stdout);

        let status = child.wait()?;
        if let Some(drain) = stderr_drain {
            let _ = drain.join();
        }

        if !status.success() {
            return Err(GatewayError::Tool(format!("exited with {status}")));
        }

        tracing::info!("🔧 exiftool closed");
        Ok(())
    }
}

impl MetadataGateway for ExifTool {
    fn read_keywords(&self, path: &Path) -> Result<String, GatewayError> {
        // exiftool would recurse into a directory and report every file in it
        if path.is_dir() {
            return Err(GatewayError::NotFound);
        }
        let path = path_arg(path)?;
        let tag_arg = format!("-{KEYWORD_TAG}");
        let output = self.execute(&["-j", &tag_arg, path])?;
        parse_keywords(&output, path)
    }

    fn write_keywords(&self, path: &Path, raw: &str) -> Result<(), GatewayError> {
        if path.is_dir() {
            return Err(GatewayError::Tool(format!(
                "{} is a directory, not an image file",
                path.display()
            )));
        }
        let path = path_arg(path)?;
        // An empty value deletes the field
        let assignment = format!("-{KEYWORD_TAG}={raw}");
        let output = self.execute(&["-overwrite_original", &assignment, path])?;

        match updated_count(&output) {
            Some(count) if count > 0 => {
                tracing::debug!("💾 Wrote {KEYWORD_TAG}={raw:?} to {path}");
                Ok(())
            }
            _ => Err(GatewayError::Tool(format!(
                "{path} was not updated: {}",
                output.trim()
            ))),
        }
    }
}

fn path_arg(path: &Path) -> Result<&str, GatewayError> {
    path.to_str()
        .ok_or_else(|| GatewayError::Tool(format!("path is not UTF-8: {}", path.display())))
}

/// One entry of `exiftool -j` output
#[derive(Debug, Deserialize)]
struct KeywordRecord {
    #[serde(rename = "XPKeywords")]
    keywords: Option<Value>,
}

/// Pull the keyword string out of `exiftool -j -XPKeywords` output
fn parse_keywords(output: &str, path: &str) -> Result<String, GatewayError> {
    if output.trim().is_empty() {
        return Err(GatewayError::Tool(format!("no metadata returned for {path}")));
    }

    let records: Vec<KeywordRecord> = serde_json::from_str(output)?;
    let value = records
        .into_iter()
        .next()
        .and_then(|record| record.keywords)
        .ok_or(GatewayError::NotFound)?;

    match value {
        Value::String(raw) => Ok(raw),
        // exiftool prints numeric-looking values as bare JSON numbers. With
        // arbitrary_precision the number keeps the exact digits it was read from
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Err(GatewayError::NotFound),
        other => Err(GatewayError::Tool(format!(
            "unexpected {KEYWORD_TAG} value for {path}: {other}"
        ))),
    }
}

/// Parse the "N image files updated" summary line of a write
fn updated_count(output: &str) -> Option<u32> {
    output
        .lines()
        .find(|line| line.contains("image files updated"))
        .and_then(|line| line.split_whitespace().next())
        .and_then(|count| count.parse().ok())
}
