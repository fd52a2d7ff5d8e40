//! Pauses the active session without ending it.

use crate::{
    libs::{
        daemon::{self, ControlCommand},
        messages::Message,
    },
    msg_error, msg_info,
};
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    if !daemon::is_running() {
        msg_error!(Message::NoActiveSession);
        return Ok(());
    }
    daemon::send_control(ControlCommand::Pause)?;
    msg_info!(Message::PauseRequestSent);
    Ok(())
}
