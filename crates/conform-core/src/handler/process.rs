use super::protocol::{HandlerInput, HandlerResponse};
use crate::{Error, Result};
use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};
use std::task::{Context, Poll, ready};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, ReadBuf};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, warn};

/// Spawn a handler and send it one request line, closing stdin afterwards.
async fn spawn_with_input(
    adapter_id: &str,
    handler_path: &Path,
    working_dir: &Path,
    input: &HandlerInput,
) -> Result<Child> {
    let mut child = Command::new(handler_path)
        .current_dir(working_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            Error::Process(format!("Failed to spawn {}: {}", handler_path.display(), e))
        })?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::Process("Failed to get stdin handle".to_string()))?;

    let json = serde_json::to_string(input)? + "\n";
    debug!("[{}] Sending: {}", adapter_id, json.trim());
    let written = match stdin.write_all(json.as_bytes()).await {
        Ok(()) => stdin.flush().await,
        Err(e) => Err(e),
    };
    match written {
        Ok(()) => {}
        // Handler may exit without reading its request
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            debug!("[{adapter_id}] Handler closed stdin before reading the request");
        }
        Err(e) => {
            return Err(Error::Process(format!(
                "Failed to write to handler stdin: {e}"
            )));
        }
    }
    drop(stdin);

    Ok(child)
}

/// Run a handler for a single request and parse its response line.
///
/// # Errors
///
/// Returns an error if the handler cannot be spawned, exits unsuccessfully,
/// or does not print a valid response.
pub async fn invoke(
    adapter_id: &str,
    handler_path: &Path,
    working_dir: &Path,
    input: &HandlerInput,
) -> Result<HandlerResponse> {
    let child = spawn_with_input(adapter_id, handler_path, working_dir, input).await?;

    let output = child
        .wait_with_output()
        .await
        .map_err(|e| Error::Process(format!("Failed to wait for handler: {e}")))?;

    for line in String::from_utf8_lossy(&output.stderr).lines() {
        warn!("[{}] stderr: {}", adapter_id, line);
    }

    if !output.status.success() {
        return Err(Error::Process(format!(
            "Handler exited with {}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| Error::Process("Handler produced no response".to_string()))?;

    debug!("[{}] Received: {}", adapter_id, line);
    serde_json::from_str(line).map_err(|e| {
        warn!("[{adapter_id}] invalid JSON - Raw: {line}");
        Error::Process(format!("Adapter '{adapter_id}' returned invalid JSON: {e}"))
    })
}

/// Run a handler whose stdout is the raw body of a download.
///
/// # Errors
///
/// Returns an error if the handler cannot be spawned or fed its request.
pub async fn open_stream(
    adapter_id: &str,
    handler_path: &Path,
    working_dir: &Path,
    input: &HandlerInput,
) -> Result<HandlerStream> {
    let mut child = spawn_with_input(adapter_id, handler_path, working_dir, input).await?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::Process("Failed to get stdout handle".to_string()))?;

    if let Some(stderr) = child.stderr.take() {
        let adapter_id = adapter_id.to_string();
        tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();

            while let Ok(Some(line)) = lines.next_line().await {
                warn!("[{}] stderr: {}", adapter_id, line);
            }
        });
    }

    Ok(HandlerStream {
        stdout,
        exit: Some(Box::pin(async move { child.wait().await })),
    })
}

type ExitFuture = Pin<Box<dyn Future<Output = io::Result<ExitStatus>> + Send>>;

/// Byte stream read from a running handler's stdout.
///
/// End of stream is only reported once the handler has exited successfully;
/// a non-zero exit surfaces as a read error. Dropping the stream kills the
/// handler if it is still running.
pub struct HandlerStream {
    stdout: ChildStdout,
    /// Owns the child; `None` once its exit status has been checked
    exit: Option<ExitFuture>,
}

impl AsyncRead for HandlerStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let before = buf.filled().len();
        ready!(Pin::new(&mut self.stdout).poll_read(cx, buf))?;
        if buf.filled().len() > before || buf.remaining() == 0 {
            return Poll::Ready(Ok(()));
        }

        let Some(exit) = self.exit.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        let status = ready!(exit.as_mut().poll(cx));
        self.exit = None;

        match status {
            Ok(status) if status.success() => Poll::Ready(Ok(())),
            Ok(status) => Poll::Ready(Err(io::Error::other(format!(
                "handler exited with {status}"
            )))),
            Err(e) => Poll::Ready(Err(e)),
        }
    }
}
