//! Background tracker process management.
//!
//! This module handles the lifecycle of the tracker process: spawning it
//! detached, stopping it, and relaying commands to it. A PID file marks
//! the running tracker; a control file carries one-shot commands (pause,
//! resume, stop) that the tracker picks up on its next tick.

use crate::db::clients::Client;
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::libs::monitor::Tracker;
use crate::{msg_bail_anyhow, msg_error, msg_error_anyhow, msg_info};
use anyhow::Result;
use std::time::Duration;

const PID_FILE: &str = "billable-tracker.pid";
const CONTROL_FILE: &str = "billable-tracker.ctl";

/// A one-shot command relayed to the running tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    Stop,
}

impl ControlCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlCommand::Pause => "pause",
            ControlCommand::Resume => "resume",
            ControlCommand::Stop => "stop",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "pause" => Some(ControlCommand::Pause),
            "resume" => Some(ControlCommand::Resume),
            "stop" => Some(ControlCommand::Stop),
            _ => None,
        }
    }
}

/// Runs the tracker with signal handling for graceful shutdown.
///
/// SIGTERM, SIGINT and Ctrl+C all finalize the session before the process
/// exits, so a normal shutdown never leaves a snapshot behind.
pub async fn run_with_signal_handling(client: &Client) -> Result<()> {
    // Set up a channel to relay shutdown signals into the tracker loop
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    #[cfg(unix)]
    {
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate()).expect(&Message::FailedToCreateSigtermHandler.to_string());
            let mut sigint = signal(SignalKind::interrupt()).expect(&Message::FailedToCreateSigintHandler.to_string());

            tokio::select! {
                _ = sigterm.recv() => {
                    msg_info!(Message::TrackerReceivedSigterm);
                }
                _ = sigint.recv() => {
                    msg_info!(Message::TrackerReceivedSigint);
                }
            }

            let _ = shutdown_tx.send(());
        });
    }

    #[cfg(windows)]
    {
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    msg_info!(Message::TrackerReceivedCtrlC);
                }
                Err(e) => {
                    msg_error!(Message::TrackerCtrlCListenFailed(e.to_string()));
                }
            }

            let _ = shutdown_tx.send(());
        });
    }

    let mut tracker = Tracker::new()?;
    let result = tracker.run(client, shutdown_rx).await;

    match &result {
        Ok(()) => msg_info!(Message::TrackerExitedNormally),
        Err(e) => msg_error!(Message::TrackerError(e.to_string())),
    }

    // Clean up PID and control files on exit
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if pid_path.exists() {
        let _ = std::fs::remove_file(&pid_path);
    }
    let control_path = DataStorage::new().get_path(CONTROL_FILE)?;
    if control_path.exists() {
        let _ = std::fs::remove_file(&control_path);
    }

    result
}

/// Spawns the tracker as a detached background process.
///
/// Refuses to spawn while another tracker is alive; a stale PID file left
/// by a crashed tracker is cleaned up silently.
pub fn spawn(client_name: &str) -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;

    if let Some(pid) = read_pid()? {
        if process_alive(pid) {
            msg_bail_anyhow!(Message::TrackerAlreadyRunning(pid));
        }
        let _ = std::fs::remove_file(&pid_path);
    }

    let current_exe = std::env::current_exe().expect(&Message::FailedToGetCurrentExecutable.to_string());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        let mut command = std::process::Command::new(current_exe);
        command.args(["start", client_name, "--daemon-run"]);
        // Detach from the current session to become a daemon.
        unsafe {
            command.pre_exec(|| {
                nix::unistd::setsid()?;
                Ok(())
            });
        }
        let child = command.spawn()?;
        let pid = child.id();
        std::fs::write(pid_path, pid.to_string())?;
        msg_info!(Message::TrackerStarted(pid));
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        let child = std::process::Command::new(current_exe)
            .args(["start", client_name, "--daemon-run"])
            .creation_flags(CREATE_NO_WINDOW)
            .spawn()?;
        let pid = child.id();
        std::fs::write(pid_path, pid.to_string())?;
        msg_info!(Message::TrackerStarted(pid));
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = client_name;
        msg_bail_anyhow!(Message::DaemonModeNotSupported);
    }

    Ok(())
}

/// Writes the PID file for a tracker running in the foreground.
pub fn write_own_pid() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    std::fs::write(pid_path, std::process::id().to_string())?;
    Ok(())
}

/// Reads the tracker PID, or `None` when no PID file exists.
pub fn read_pid() -> Result<Option<u32>> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    if !pid_path.exists() {
        return Ok(None);
    }
    let pid_str = std::fs::read_to_string(&pid_path)?;
    let pid = pid_str.trim().parse().map_err(|_| msg_error_anyhow!(Message::InvalidPidFileContent))?;
    Ok(Some(pid))
}

/// Whether a tracker process is currently alive.
pub fn is_running() -> bool {
    matches!(read_pid(), Ok(Some(pid)) if process_alive(pid))
}

/// Leaves a one-shot command for the tracker to pick up on its next tick.
pub fn send_control(command: ControlCommand) -> Result<()> {
    let control_path = DataStorage::new().get_path(CONTROL_FILE)?;
    std::fs::write(control_path, command.as_str())?;
    Ok(())
}

/// Takes the pending control command, if any. The file is consumed either
/// way; unrecognized content is reported by the caller.
pub fn take_control() -> Result<Option<String>> {
    let control_path = DataStorage::new().get_path(CONTROL_FILE)?;
    if !control_path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&control_path)?;
    std::fs::remove_file(&control_path)?;
    Ok(Some(raw))
}

/// Waits for the tracker process to exit, polling its PID.
///
/// Returns true once the process is gone, false on timeout.
pub fn wait_for_exit(timeout: Duration) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if !is_running() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(250));
    }
    !is_running()
}

/// Finds and kills the running tracker process.
///
/// This is the forceful path; the session snapshot survives the kill and
/// is finalized by recovery on the next start. Prefer sending
/// [`ControlCommand::Stop`] first.
pub fn stop_tracker() -> Result<()> {
    match stop_internal() {
        Ok(()) => Ok(()),
        Err(e) => {
            // If the tracker wasn't running, that's okay
            if e.to_string().contains("not running") {
                msg_info!(Message::TrackerNotRunning);
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}

fn stop_internal() -> Result<()> {
    let pid_path = DataStorage::new().get_path(PID_FILE)?;
    let pid = match read_pid()? {
        Some(pid) => pid,
        None => msg_bail_anyhow!(Message::TrackerNotRunningPidNotFound),
    };

    let killed = kill_process(pid)?;

    // Clean up the PID file regardless of whether the process was found.
    std::fs::remove_file(pid_path)?;

    if killed {
        msg_info!(Message::TrackerStopped(pid));
        Ok(())
    } else {
        msg_bail_anyhow!(Message::TrackerFailedToStop(pid));
    }
}

/// Cross-platform process liveness check
#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Signal 0 probes for existence without delivering anything
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::OpenProcess;
    use winapi::um::winnt::PROCESS_QUERY_LIMITED_INFORMATION;

    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, 0, pid);
        if handle.is_null() {
            return false;
        }
        CloseHandle(handle);
        true
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    false
}

/// Cross-platform process termination
#[cfg(windows)]
fn kill_process(pid: u32) -> Result<bool> {
    use winapi::um::errhandlingapi::GetLastError;
    use winapi::um::handleapi::CloseHandle;
    use winapi::um::processthreadsapi::{OpenProcess, TerminateProcess};
    use winapi::um::winnt::PROCESS_TERMINATE;

    unsafe {
        let handle = OpenProcess(PROCESS_TERMINATE, 0, pid);
        if handle.is_null() {
            let error = GetLastError();
            if error == 87 {
                // ERROR_INVALID_PARAMETER - process doesn't exist
                return Ok(false);
            }
            msg_bail_anyhow!(Message::FailedToOpenProcess(error));
        }

        let result = TerminateProcess(handle, 0);
        CloseHandle(handle);

        if result == 0 {
            let error = GetLastError();
            msg_bail_anyhow!(Message::FailedToTerminateProcess(error));
        } else {
            // Give the process time to actually terminate
            std::thread::sleep(Duration::from_millis(100));
            Ok(true)
        }
    }
}

#[cfg(unix)]
fn kill_process(pid: u32) -> Result<bool> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    if !process_alive(pid) {
        return Ok(false);
    }

    let target = Pid::from_raw(pid as i32);

    // Send SIGTERM so the tracker can finalize the session on its way out
    kill(target, Signal::SIGTERM)?;

    // Give the process time to terminate gracefully
    for _ in 0..10 {
        std::thread::sleep(Duration::from_millis(100));

        if !process_alive(pid) {
            return Ok(true);
        }
    }

    // Process didn't terminate gracefully, force kill
    kill(target, Signal::SIGKILL)?;

    std::thread::sleep(Duration::from_millis(100));
    Ok(true)
}

#[cfg(not(any(unix, windows)))]
fn kill_process(_pid: u32) -> Result<bool> {
    msg_bail_anyhow!(Message::ProcessTerminationNotSupported);
}
