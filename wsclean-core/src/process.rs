// wsclean-core/src/process.rs
//! Launches uninstall commands. Captured runs stream stdout/stderr
//! line-by-line into the log via two concurrent readers, so a chatty
//! child can never fill a pipe buffer and deadlock. Elevated runs go
//! through the platform's elevation broker, which cannot redirect the
//! child's streams; in that mode only the exit code is reported.

use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};
use wsclean_common::error::{Result, WscleanError};
use wsclean_common::CancelToken;

use crate::command::split_command;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Launch through the platform's elevation mechanism. Stream capture is
    /// unavailable in this mode.
    pub elevate: bool,
    /// Stream stdout/stderr lines into the log as they arrive.
    pub capture_output: bool,
    /// Launch via the platform shell and await completion instead of
    /// capturing (for interactive-only uninstallers).
    pub via_shell: bool,
    /// Force-kill ceiling for the attempt. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Seam between the orchestrator and the operating system. The engine only
/// needs "run this command line, give me the exit code"; tests substitute a
/// scripted implementation.
pub trait CommandRunner: Send + Sync {
    fn run(
        &self,
        cmdline: &str,
        opts: RunOptions,
        cancel: CancelToken,
    ) -> impl Future<Output = Result<i32>> + Send;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(
        &self,
        cmdline: &str,
        opts: RunOptions,
        cancel: CancelToken,
    ) -> impl Future<Output = Result<i32>> + Send {
        run_command_line(cmdline.to_string(), opts, cancel)
    }
}

pub async fn run_command_line(cmdline: String, opts: RunOptions, cancel: CancelToken) -> Result<i32> {
    let (exe, args) = split_command(&cmdline);
    if exe.trim().is_empty() {
        return Err(WscleanError::Validation("empty command line".to_string()));
    }
    // Precondition check before any side effect. Bare names (msiexec, sc)
    // resolve through PATH and are left to the spawn itself.
    if (exe.contains('\\') || exe.contains('/')) && !Path::new(&exe).exists() {
        return Err(WscleanError::ExecutableNotFound(exe));
    }

    if opts.elevate {
        if opts.capture_output {
            debug!("Output capture is unavailable for elevated runs; reporting exit code only");
        }
        return run_elevated(&exe, &args, &opts, &cancel).await;
    }

    debug!("Running: {exe} {args}");
    let mut cmd = build_command(&exe, &args, opts.via_shell);
    cmd.stdin(Stdio::null()).kill_on_drop(true);
    if opts.capture_output && !opts.via_shell {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let mut child = cmd
        .spawn()
        .map_err(|e| WscleanError::CommandExec(format!("failed to spawn {exe}: {e}")))?;

    if opts.capture_output && !opts.via_shell {
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(stream_lines(stdout, false));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(stream_lines(stderr, true));
        }
    }

    wait_with_cancel(child, &exe, opts.timeout, &cancel).await
}

fn build_command(exe: &str, args: &str, via_shell: bool) -> Command {
    #[cfg(target_os = "windows")]
    {
        if via_shell {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C");
            cmd.raw_arg(format!("start \"\" /WAIT \"{exe}\" {args}"));
            return cmd;
        }
        let mut cmd = Command::new(exe);
        if !args.is_empty() {
            cmd.raw_arg(args);
        }
        cmd
    }
    #[cfg(not(target_os = "windows"))]
    {
        let _ = via_shell;
        let mut cmd = Command::new(exe);
        if !args.is_empty() {
            cmd.args(args.split_whitespace());
        }
        cmd
    }
}

async fn stream_lines<R>(reader: R, is_stderr: bool)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if is_stderr {
            error!(target: "wsclean::child", "{line}");
        } else {
            info!(target: "wsclean::child", "{line}");
        }
    }
}

async fn wait_with_cancel(
    mut child: Child,
    exe: &str,
    timeout: Option<Duration>,
    cancel: &CancelToken,
) -> Result<i32> {
    let ceiling = async {
        match timeout {
            Some(d) => tokio::time::sleep(d).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        status = child.wait() => {
            let status = status
                .map_err(|e| WscleanError::CommandExec(format!("failed waiting on {exe}: {e}")))?;
            let code = status.code().unwrap_or(-1);
            debug!("{exe} exited with code {code}");
            Ok(code)
        }
        _ = cancel.cancelled() => {
            warn!("Cancellation requested; killing {exe}");
            let _ = child.start_kill();
            let _ = child.wait().await;
            Err(WscleanError::Cancelled(exe.to_string()))
        }
        _ = ceiling => {
            warn!("{exe} exceeded the per-attempt ceiling; killing");
            let _ = child.start_kill();
            let _ = child.wait().await;
            Err(WscleanError::Timeout(exe.to_string()))
        }
    }
}

#[cfg(target_os = "windows")]
async fn run_elevated(exe: &str, args: &str, opts: &RunOptions, cancel: &CancelToken) -> Result<i32> {
    fn ps_quote(s: &str) -> String {
        s.replace('\'', "''")
    }
    let script = if args.trim().is_empty() {
        format!(
            "$p = Start-Process -FilePath '{}' -Verb RunAs -PassThru -Wait; exit $p.ExitCode",
            ps_quote(exe)
        )
    } else {
        format!(
            "$p = Start-Process -FilePath '{}' -ArgumentList '{}' -Verb RunAs -PassThru -Wait; exit $p.ExitCode",
            ps_quote(exe),
            ps_quote(args)
        )
    };
    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-Command", &script])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    let child = cmd
        .spawn()
        .map_err(|e| WscleanError::CommandExec(format!("failed to spawn elevated {exe}: {e}")))?;
    wait_with_cancel(child, exe, opts.timeout, cancel).await
}

#[cfg(not(target_os = "windows"))]
async fn run_elevated(exe: &str, args: &str, opts: &RunOptions, cancel: &CancelToken) -> Result<i32> {
    warn!("No elevation broker on this platform; running {exe} directly");
    let mut cmd = build_command(exe, args, false);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    let child = cmd
        .spawn()
        .map_err(|e| WscleanError::CommandExec(format!("failed to spawn {exe}: {e}")))?;
    wait_with_cancel(child, exe, opts.timeout, cancel).await
}
