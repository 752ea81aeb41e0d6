use std::io::Write;

use serialport::SerialPort;

use super::{LineSettings, Result, SerialError, WriteStage};

/// Write side of an open serial connection.
///
/// Dropping the value releases the underlying device handle.
pub trait SerialPortIO: Send {
    fn write_bytes(&mut self, data: &[u8]) -> std::io::Result<()>;
    fn flush(&mut self) -> std::io::Result<()>;
}

impl SerialPortIO for Box<dyn SerialPort> {
    fn write_bytes(&mut self, data: &[u8]) -> std::io::Result<()> {
        self.write_all(data)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Write::flush(self)
    }
}

/// Something that can open a serial device with a given line configuration
pub trait SerialTransport {
    fn open(
        &self,
        port_name: &str,
        settings: &LineSettings,
    ) -> std::result::Result<Box<dyn SerialPortIO>, serialport::Error>;
}

/// Host serial ports via the `serialport` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTransport;

impl SerialTransport for NativeTransport {
    fn open(
        &self,
        port_name: &str,
        settings: &LineSettings,
    ) -> std::result::Result<Box<dyn SerialPortIO>, serialport::Error> {
        let port = serialport::new(port_name, settings.baud_rate)
            .data_bits(settings.data_bits)
            .parity(settings.parity)
            .stop_bits(settings.stop_bits)
            .flow_control(settings.flow_control)
            .timeout(settings.timeout)
            .open()?;

        Ok(Box::new(port))
    }
}

/// An exclusively owned serial connection, closed on disconnect or drop
pub struct SerialInterface {
    port_name: String,
    port: Option<Box<dyn SerialPortIO>>,
}

impl SerialInterface {
    /// Open `port_name` through `transport`
    pub fn connect<T: SerialTransport + ?Sized>(
        transport: &T,
        port_name: &str,
        settings: &LineSettings,
    ) -> Result<Self> {
        log::debug!("Opening {} with {}", port_name, settings);

        let port = transport
            .open(port_name, settings)
            .map_err(|source| SerialError::PortOpen {
                port: port_name.to_string(),
                source,
            })?;

        log::info!("Opened serial port {}", port_name);
        Ok(Self::from_io(port_name, port))
    }

    /// Wrap an already open connection
    pub fn from_io(port_name: &str, io: Box<dyn SerialPortIO>) -> Self {
        Self {
            port_name: port_name.to_string(),
            port: Some(io),
        }
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_connected(&self) -> bool {
        self.port.is_some()
    }

    /// Write all of `data` as a single write; `stage` labels the failure
    pub fn send_data(&mut self, data: &[u8], stage: WriteStage) -> Result<usize> {
        let port = self.port.as_mut().ok_or_else(|| SerialError::Write {
            port: self.port_name.clone(),
            stage,
            source: std::io::Error::from(std::io::ErrorKind::NotConnected),
        })?;

        port.write_bytes(data).map_err(|source| SerialError::Write {
            port: self.port_name.clone(),
            stage,
            source,
        })?;

        log::debug!("Wrote {} bytes ({}) to {}", data.len(), stage, self.port_name);
        Ok(data.len())
    }

    pub fn flush(&mut self) -> Result<()> {
        let port = self.port.as_mut().ok_or_else(|| SerialError::Write {
            port: self.port_name.clone(),
            stage: WriteStage::Flush,
            source: std::io::Error::from(std::io::ErrorKind::NotConnected),
        })?;

        port.flush().map_err(|source| SerialError::Write {
            port: self.port_name.clone(),
            stage: WriteStage::Flush,
            source,
        })
    }

    /// Close the connection. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if self.port.take().is_some() {
            log::info!("Closed serial port {}", self.port_name);
        }
    }
}

impl Drop for SerialInterface {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::scripted::{ScriptedTransport, WireEvent};

    #[test]
    fn drop_closes_connection() {
        let transport = ScriptedTransport::new();
        {
            let interface =
                SerialInterface::connect(&transport, "/dev/ttyACM0", &LineSettings::default())
                    .expect("connect");
            assert!(interface.is_connected());
            assert_eq!(interface.port_name(), "/dev/ttyACM0");
        }
        assert_eq!(transport.events().last(), Some(&WireEvent::Close));
    }

    #[test]
    fn disconnect_twice_closes_once() {
        let transport = ScriptedTransport::new();
        let mut interface =
            SerialInterface::connect(&transport, "COM3", &LineSettings::default()).expect("connect");
        interface.disconnect();
        interface.disconnect();
        drop(interface);

        let closes = transport
            .events()
            .iter()
            .filter(|e| **e == WireEvent::Close)
            .count();
        assert_eq!(closes, 1);
    }

    #[test]
    fn send_after_disconnect_is_write_error() {
        let transport = ScriptedTransport::new();
        let mut interface =
            SerialInterface::connect(&transport, "COM3", &LineSettings::default()).expect("connect");
        interface.disconnect();

        match interface.send_data(b"X", WriteStage::Payload) {
            Err(SerialError::Write { stage, source, .. }) => {
                assert_eq!(stage, WriteStage::Payload);
                assert_eq!(source.kind(), std::io::ErrorKind::NotConnected);
            }
            other => panic!("expected write error, got {:?}", other),
        }
    }

    #[test]
    fn open_failure_maps_to_port_open() {
        let transport = ScriptedTransport::failing_open(serialport::ErrorKind::NoDevice);
        let err = SerialInterface::connect(&transport, "/dev/ttyUSB9", &LineSettings::default())
            .err()
            .expect("open should fail");
        assert!(matches!(err, SerialError::PortOpen { ref port, .. } if port == "/dev/ttyUSB9"));
        assert!(transport.events().is_empty());
    }
}
