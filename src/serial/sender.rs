use super::{LineSettings, Result, SerialInterface, SerialTransport, WriteStage};

pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Sends a single newline-terminated command over a freshly opened port
pub struct CommandSender<T: SerialTransport> {
    transport: T,
    settings: LineSettings,
}

impl<T: SerialTransport> CommandSender<T> {
    pub fn new(transport: T) -> Self {
        Self::with_settings(transport, LineSettings::default())
    }

    pub fn with_settings(transport: T, settings: LineSettings) -> Self {
        Self { transport, settings }
    }

    pub fn settings(&self) -> &LineSettings {
        &self.settings
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Open `port_name`, write `command` then `\n` as two writes, and close.
    ///
    /// Returns the number of bytes written (`command.len() + 1`). The port is
    /// closed on every path once it has been opened; if the open itself fails
    /// nothing is written.
    pub fn send(&self, port_name: &str, command: &[u8]) -> Result<usize> {
        let mut interface = SerialInterface::connect(&self.transport, port_name, &self.settings)?;

        let mut written = interface.send_data(command, WriteStage::Payload)?;
        written += interface.send_data(LINE_TERMINATOR, WriteStage::Terminator)?;
        interface.flush()?;

        interface.disconnect();
        Ok(written)
    }
}
