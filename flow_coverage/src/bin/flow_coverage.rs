use std::process::ExitCode;

use clap::Parser;
use flow_coverage::app::{self, AppConfig, Args};

fn main() -> ExitCode {
    let args = Args::parse();
    app::init_tracing();
    let config = AppConfig::from(args);
    app::main_with_exit(config)
}
