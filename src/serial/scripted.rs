//! In-memory transport that records every open, write, flush and close.
//! Failures can be injected at open, at the n-th write, or at flush.
use std::sync::{Arc, Mutex};

use super::interface::{SerialPortIO, SerialTransport};
use super::LineSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireEvent {
    Open { port: String, settings: LineSettings },
    Write(Vec<u8>),
    Flush,
    Close,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    log: Arc<Mutex<Vec<WireEvent>>>,
    fail_open: Option<serialport::ErrorKind>,
    fail_write_at: Option<usize>,
    fail_flush: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_open(kind: serialport::ErrorKind) -> Self {
        Self { fail_open: Some(kind), ..Self::default() }
    }

    /// Fail the write with zero-based index `index` on each connection
    pub fn failing_write(index: usize) -> Self {
        Self { fail_write_at: Some(index), ..Self::default() }
    }

    pub fn failing_flush() -> Self {
        Self { fail_flush: true, ..Self::default() }
    }

    pub fn events(&self) -> Vec<WireEvent> {
        lock(&self.log).clone()
    }

    /// Concatenation of every successful write, i.e. what reached the wire
    pub fn written(&self) -> Vec<u8> {
        lock(&self.log)
            .iter()
            .filter_map(|e| match e {
                WireEvent::Write(bytes) => Some(bytes.as_slice()),
                _ => None,
            })
            .flatten()
            .copied()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.log).clear();
    }
}

impl SerialTransport for ScriptedTransport {
    fn open(
        &self,
        port_name: &str,
        settings: &LineSettings,
    ) -> Result<Box<dyn SerialPortIO>, serialport::Error> {
        if let Some(kind) = self.fail_open {
            return Err(serialport::Error::new(
                kind,
                format!("scripted open failure on {}", port_name),
            ));
        }

        lock(&self.log).push(WireEvent::Open {
            port: port_name.to_string(),
            settings: *settings,
        });

        Ok(Box::new(ScriptedPort {
            log: Arc::clone(&self.log),
            writes: 0,
            fail_write_at: self.fail_write_at,
            fail_flush: self.fail_flush,
        }))
    }
}

struct ScriptedPort {
    log: Arc<Mutex<Vec<WireEvent>>>,
    writes: usize,
    fail_write_at: Option<usize>,
    fail_flush: bool,
}

impl SerialPortIO for ScriptedPort {
    fn write_bytes(&mut self, data: &[u8]) -> std::io::Result<()> {
        let index = self.writes;
        self.writes += 1;
        if self.fail_write_at == Some(index) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted write failure",
            ));
        }
        lock(&self.log).push(WireEvent::Write(data.to_vec()));
        Ok(())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if self.fail_flush {
            return Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "scripted flush failure",
            ));
        }
        lock(&self.log).push(WireEvent::Flush);
        Ok(())
    }
}

impl Drop for ScriptedPort {
    fn drop(&mut self) {
        lock(&self.log).push(WireEvent::Close);
    }
}

fn lock(log: &Mutex<Vec<WireEvent>>) -> std::sync::MutexGuard<'_, Vec<WireEvent>> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
