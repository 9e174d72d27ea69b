use clap::Parser;
use planner::cli::commands::Cli;
use planner::cli::handlers::{self, Context};
use planner::io::{config_io, logging};
use planner::io::store::Store;

fn main() {
    let cli = Cli::parse();
    if cli.command.is_some() {
        logging::init_stderr();
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(config_io::default_config_path);
    let config = config_io::read_config(&config_path);
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref(), &config);
    let store = Store::new(&data_dir);

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI
            logging::init_file(&data_dir);
            planner::tui::run(store, config)
        }
        Some(command) => {
            let ctx = Context {
                store,
                config,
                json: cli.json,
            };
            handlers::dispatch(command, &ctx)
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
