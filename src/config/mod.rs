use std::ffi::{OsStr, OsString};

use clap::Parser;

/// Environment variable holding the command text
pub const COMMAND_ENV: &str = "POST_FLASH_CMD";

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "Serial port (as path to /dev/tty* or COM port)")]
    pub port: Option<String>,

    #[arg(short, long, help = "Enable debug logging")]
    pub verbose: bool,
}

/// The two inputs of a run. Either may be missing, which makes the run a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub port: Option<String>,
    pub command: Option<OsString>,
}

impl Invocation {
    pub fn new(port: Option<String>, command: Option<OsString>) -> Self {
        Self { port, command }
    }

    /// Port from the CLI, command from `POST_FLASH_CMD`
    pub fn from_env(cli: &Cli) -> Self {
        Self::new(cli.port.clone(), std::env::var_os(COMMAND_ENV))
    }

    /// Both inputs, if both are present. An empty command still counts.
    pub fn ready(&self) -> Option<(&str, &OsStr)> {
        match (&self.port, &self.command) {
            (Some(port), Some(command)) => Some((port.as_str(), command.as_os_str())),
            _ => None,
        }
    }
}
