use clap::Parser;
use log::{debug, error};

mod args;
mod dashboard;

fn main() {
    let args = args::Args::parse();
    let mut builder = env_logger::Builder::from_default_env();
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
    debug!("args: {:?}", args);

    if let Err(e) = dashboard::run_dashboard(&args) {
        error!("{:?}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
