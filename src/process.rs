//! Production backend adapter: a child evaluator process speaking
//! newline-delimited JSON over stdin/stdout.
//!
//! Requests are `{"op":"submit","source":...}`, `{"op":"drop","handle":...}`
//! and `{"op":"close"}`; a submit answers with one [`EvalResult`] JSON line,
//! a drop with one acknowledgement line. The evaluator command comes from
//! configuration. The child's stderr passes through to jot's stderr.

use std::io::{BufRead as _, BufReader, Write as _};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::backend::{Backend, BackendProvider, DeclHandle, EvalResult};
use crate::error::Error;

/// One request line sent to the evaluator.
#[derive(Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum Request<'a> {
    Close,
    Drop { handle: &'a str },
    Submit { source: &'a str },
}

/// Acknowledgement line answered to a drop request.
#[derive(Deserialize)]
struct DropAck {
    /// Whether the evaluator acted on the handle; informational only,
    /// dropping unknown handles is tolerated.
    #[serde(default)]
    #[allow(dead_code)]
    ok: bool,
}

/// A running evaluator process bound to one notebook file.
#[derive(Debug)]
pub struct ProcessBackend {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessBackend {
    /// Spawn the evaluator command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` if the command is empty or cannot be
    /// spawned with piped stdio.
    pub fn spawn(command: &[String]) -> Result<Self, Error> {
        let Some((program, args)) = command.split_first() else {
            return Err(Error::Backend { reason: "empty backend command".to_string() });
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| {
                return Error::Backend { reason: format!("cannot spawn `{program}`: {e}") };
            })?;
        let stdin = child.stdin.take().ok_or_else(|| {
            return Error::Backend { reason: "backend stdin unavailable".to_string() };
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            return Error::Backend { reason: "backend stdout unavailable".to_string() };
        })?;
        return Ok(Self { child, stdin, stdout: BufReader::new(stdout) });
    }

    /// Send one request line.
    fn send(&mut self, request: &Request<'_>) -> Result<(), Error> {
        let line = serde_json::to_string(request).map_err(|e| {
            return Error::Backend { reason: format!("encode request: {e}") };
        })?;
        self.stdin
            .write_all(line.as_bytes())
            .and_then(|()| return self.stdin.write_all(b"\n"))
            .and_then(|()| return self.stdin.flush())
            .map_err(|e| {
                return Error::Backend { reason: format!("write to backend: {e}") };
            })?;
        return Ok(());
    }

    /// Read one response line.
    fn receive(&mut self) -> Result<String, Error> {
        let mut line = String::new();
        let read = self.stdout.read_line(&mut line).map_err(|e| {
            return Error::Backend { reason: format!("read from backend: {e}") };
        })?;
        if read == 0 {
            return Err(Error::Backend { reason: "backend closed its stdout".to_string() });
        }
        return Ok(line);
    }
}

impl Backend for ProcessBackend {
    fn close(&mut self) {
        // best effort: the child may already be gone
        let _ = self.send(&Request::Close);
        let _ = self.child.wait();
    }

    fn drop_declaration(&mut self, handle: &DeclHandle) -> Result<(), Error> {
        self.send(&Request::Drop { handle: &handle.0 })?;
        let line = self.receive()?;
        let _: DropAck = serde_json::from_str(&line).map_err(|e| {
            return Error::Backend { reason: format!("malformed drop response: {e}") };
        })?;
        return Ok(());
    }

    fn submit(&mut self, source: &str) -> Result<EvalResult, Error> {
        self.send(&Request::Submit { source })?;
        let line = self.receive()?;
        return serde_json::from_str(&line).map_err(|e| {
            return Error::Backend { reason: format!("malformed eval response: {e}") };
        });
    }
}

/// Spawns one evaluator process per watched file.
pub struct ProcessBackendProvider {
    /// The evaluator command: program followed by its arguments.
    pub command: Vec<String>,
}

impl BackendProvider for ProcessBackendProvider {
    type Backend = ProcessBackend;

    fn open(&mut self, path: &Path) -> Result<Self::Backend, Error> {
        tracing::info!(
            "spawning evaluator `{}` for {}",
            self.command.join(" "),
            path.display()
        );
        return ProcessBackend::spawn(&self.command);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{ProcessBackend, Request};

    #[test]
    fn empty_command_is_rejected() {
        let err = ProcessBackend::spawn(&[]).unwrap_err();
        assert!(err.to_string().contains("empty backend command"));
    }

    #[test]
    fn requests_serialize_with_an_op_tag() {
        let line = serde_json::to_string(&Request::Submit { source: "int z = 5;" }).unwrap();
        assert_eq!(line, r#"{"op":"submit","source":"int z = 5;"}"#);
        let line = serde_json::to_string(&Request::Close).unwrap();
        assert_eq!(line, r#"{"op":"close"}"#);
    }
}
