//! Main application entry point.

use clap::Parser;
use pinboard_app::cli::Cli;
use pinboard_app::{App, AppConfig};

fn main() {
    env_logger::init();
    log::info!("Starting Pinboard");

    let cli = Cli::parse();
    let result = AppConfig::load(cli.config.as_deref(), cli.data_dir.clone())
        .and_then(App::with_config)
        .and_then(|mut app| app.execute(cli.command));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output.trim_end());
            }
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
