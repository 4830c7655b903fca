mod commands;
mod handlers;
mod output;

use clap::Parser;
use commands::Cli;
use log::LevelFilter;

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = handlers::handle_command(cli.command) {
        output::print_error(&err.to_string());
        std::process::exit(1);
    }
}
