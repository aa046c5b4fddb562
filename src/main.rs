//! audiorec CLI entry point

use std::process::ExitCode;

use clap::Parser;

use audiorec::cli::{
    app::{load_merged_config, EXIT_ERROR},
    args::{Cli, Commands, HostArgs},
    config_cmd::handle_config_command,
    host_app::run_host,
    host_cmd::{handle_open_destination, handle_preferences_command, handle_quit},
    ipc::SocketPath,
    logging::init_logging,
    presenter::Presenter,
    record_app::{run_devices, run_record},
};
use audiorec::domain::config::AppConfig;
use audiorec::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let presenter = Presenter::new();
    let socket = SocketPath::resolve(cli.socket);

    match cli.command {
        Commands::Config { action } => {
            let result = match XdgConfigStore::new() {
                Ok(store) => handle_config_command(action, &store, &presenter).await,
                Err(e) => Err(e),
            };
            report(result, &presenter)
        }
        Commands::Host(args) => {
            let cli_config = host_config(&args);
            let config = load_merged_config(cli_config, &presenter).await;
            run_host(args, socket, &config).await
        }
        Commands::Record(args) => {
            let config = load_merged_config(args.to_config(), &presenter).await;
            run_record(socket, &config).await
        }
        Commands::Devices => {
            let config = load_merged_config(AppConfig::empty(), &presenter).await;
            run_devices(&config, &presenter)
        }
        Commands::Preferences { file, action } => report(
            handle_preferences_command(action, file, socket, &presenter).await,
            &presenter,
        ),
        Commands::OpenDestination => {
            report(handle_open_destination(socket, &presenter).await, &presenter)
        }
        Commands::Quit => report(handle_quit(socket, &presenter).await, &presenter),
    }
}

fn host_config(args: &HostArgs) -> AppConfig {
    AppConfig {
        picker: args.picker.clone(),
        ..Default::default()
    }
}

fn report<E: std::fmt::Display>(result: Result<(), E>, presenter: &Presenter) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
