use std::ffi::OsStr;

use crate::config::Invocation;
use crate::serial::{self, CommandSender, SerialTransport};

pub const NOTHING_TO_DO: &str = "Nothing to do";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Port or command missing; nothing was opened
    NothingToDo,
    Sent { port: String, bytes_written: usize },
}

pub fn confirmation_message(port: &str, command: &OsStr) -> String {
    format!(
        "Sending command: {} to port: {}",
        command.to_string_lossy(),
        port
    )
}

/// Send the post-flash command if both inputs are present
pub fn post_flash<T: SerialTransport>(
    invocation: &Invocation,
    sender: &CommandSender<T>,
) -> serial::Result<Outcome> {
    let Some((port, command)) = invocation.ready() else {
        log::info!(
            "Skipping post-flash command (port set: {}, command set: {})",
            invocation.port.is_some(),
            invocation.command.is_some()
        );
        println!("{}", NOTHING_TO_DO);
        return Ok(Outcome::NothingToDo);
    };

    println!("{}", confirmation_message(port, command));

    let bytes_written = sender.send(port, command.as_encoded_bytes())?;

    Ok(Outcome::Sent {
        port: port.to_string(),
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::scripted::ScriptedTransport;

    #[test]
    fn confirmation_names_command_and_port() {
        let message = confirmation_message("/dev/ttyUSB0", OsStr::new("RESET"));
        assert_eq!(message, "Sending command: RESET to port: /dev/ttyUSB0");
    }

    #[test]
    fn missing_command_is_a_noop() {
        let sender = CommandSender::new(ScriptedTransport::new());
        let invocation = Invocation::new(Some("/dev/ttyUSB0".into()), None);

        let outcome = post_flash(&invocation, &sender).expect("no-op");
        assert_eq!(outcome, Outcome::NothingToDo);
        assert!(sender.transport().events().is_empty());
    }
}
