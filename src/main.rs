use clap::Parser;
use restack::cli::commands::Cli;
use restack::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let config = match handlers::load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    restack::logging::init(&config.log.level);

    if let Err(e) = handlers::dispatch(cli, &config) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
