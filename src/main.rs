mod aa;
mod args;

use clap::Parser;
use log::debug;

fn main() {
    let args = args::Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    if let Err(e) = aa::run_analysis(&args) {
        eprintln!("An error occurred: {}", e);
        std::process::exit(1);
    }
}
