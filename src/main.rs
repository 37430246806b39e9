use std::io;
use std::process::ExitCode;

use clap::Parser;
use env_logger::Env;
use log::debug;

use ldapcheck::cli::Cli;
use ldapcheck::result::report_failure;
use ldapcheck::{run, LdapDirectory};

fn main() -> ExitCode {
    // clap prints usage, or help/version, and exits.
    let cli = Cli::parse();
    let level = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let (params, options) = cli.into_parts();
    let stdout = io::stdout();
    match run(&params, &options, &LdapDirectory, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Not through the logger: RUST_LOG=off must not hide it.
            let _ = report_failure(&mut io::stderr(), &e);
            debug!("{:?}", e);
            ExitCode::FAILURE
        }
    }
}
