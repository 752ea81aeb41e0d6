pub mod interface;
pub mod scripted;
pub mod sender;

pub use interface::{NativeTransport, SerialInterface, SerialPortIO, SerialTransport};
pub use sender::CommandSender;

use std::fmt;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};

pub const BAUD_RATE: u32 = 115200;

/// serialport needs a finite bound; this only bites on a stalled device.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Line configuration used when opening the port (115200-8-N-1, no flow control)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    pub timeout: Duration,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: WRITE_TIMEOUT,
        }
    }
}

impl fmt::Display for LineSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        };
        let data_bits = match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        let stop_bits = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        write!(f, "{}-{}-{}-{}", self.baud_rate, data_bits, parity, stop_bits)
    }
}

/// Which write of the transmission failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Payload,
    Terminator,
    Flush,
}

impl fmt::Display for WriteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStage::Payload => f.write_str("command payload"),
            WriteStage::Terminator => f.write_str("line terminator"),
            WriteStage::Flush => f.write_str("buffered output"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("failed to open serial port {port}")]
    PortOpen {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("failed to write {stage} to serial port {port}")]
    Write {
        port: String,
        stage: WriteStage,
        #[source]
        source: std::io::Error,
    },
}

impl SerialError {
    /// Process exit status for this failure (sysexits.h)
    pub fn exit_code(&self) -> u8 {
        match self {
            SerialError::PortOpen { .. } => 69, // EX_UNAVAILABLE
            SerialError::Write { .. } => 74,    // EX_IOERR
        }
    }
}

pub type Result<T> = std::result::Result<T, SerialError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_line_settings_are_115200_8n1() {
        let settings = LineSettings::default();
        assert_eq!(settings.baud_rate, 115200);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.flow_control, FlowControl::None);
        assert_eq!(settings.to_string(), "115200-8-N-1");
    }

    #[test]
    fn exit_codes_distinguish_open_from_write() {
        let open = SerialError::PortOpen {
            port: "/dev/ttyUSB0".into(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "gone"),
        };
        let write = SerialError::Write {
            port: "/dev/ttyUSB0".into(),
            stage: WriteStage::Terminator,
            source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "unplugged"),
        };
        assert_eq!(open.exit_code(), 69);
        assert_eq!(write.exit_code(), 74);
        assert_eq!(open.to_string(), "failed to open serial port /dev/ttyUSB0");
        assert_eq!(
            write.to_string(),
            "failed to write line terminator to serial port /dev/ttyUSB0"
        );
    }
}
