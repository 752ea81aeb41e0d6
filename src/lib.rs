pub mod commands;
pub mod config;
pub mod logging;
pub mod serial;

use std::process::ExitCode;

use clap::Parser;
use config::{Cli, Invocation};
use serial::{CommandSender, NativeTransport};

pub fn run() -> ExitCode {
  let cli = Cli::parse();
  logging::init(cli.verbose);

  let invocation = Invocation::from_env(&cli);
  let sender = CommandSender::new(NativeTransport);

  match commands::post_flash(&invocation, &sender) {
    Ok(outcome) => {
      log::debug!("Post-flash finished: {:?}", outcome);
      ExitCode::SUCCESS
    }
    Err(e) => {
      let code = e.exit_code();
      eprintln!("Error: {:#}", anyhow::Error::new(e));
      ExitCode::from(code)
    }
  }
}
