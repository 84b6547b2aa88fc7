//! Bang! launcher entry point
//!
//! Parses the command line, runs one update-and-launch cycle and prints the
//! result. The exit status is always 0; problems are reported on stderr.

use bang_launcher::cli::{self, report_outcome};
use bang_launcher::core::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout, usage errors to stderr
            let _ = e.print();
            std::process::exit(0);
        }
    };

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let config = cli.build_config();
    cli.init_logging(&config);
    let quiet = config.quiet;

    let code = match cli.execute(config).await {
        Ok(outcome) => report_outcome(outcome, quiet),
        Err(e) => {
            user_friendly_error(e).display();
            0
        }
    };

    std::process::exit(code);
}
