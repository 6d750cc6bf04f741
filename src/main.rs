mod browser;
mod cli;
mod editor;
mod error;
mod extract;
mod fmt;
mod history;
mod issues;
mod models;
mod pipeline;
mod session;
mod store;
mod summary;
mod tui;

use clap::Parser;

use cli::{Cli, Commands, IssuesCommands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Review { file, store } => cli::review::run(&file, &cli::store_path(&store)),
        Commands::Issues {
            file,
            store,
            command,
        } => {
            let store = cli::store_path(&store);
            match command {
                None | Some(IssuesCommands::List) => cli::issues::list(&file, &store),
                Some(IssuesCommands::Rename { kind, key, value }) => cli::parse_issue_kind(&kind)
                    .and_then(|kind| cli::issues::rename(&file, &store, kind, &key, &value)),
                Some(IssuesCommands::Ignore { kind, key }) => cli::parse_issue_kind(&kind)
                    .and_then(|kind| cli::issues::ignore(&file, &store, kind, &key)),
                Some(IssuesCommands::IgnoreAll) => cli::issues::ignore_all(&file, &store),
            }
        }
        Commands::Summary { file, store } => cli::summary::run(&file, &cli::store_path(&store)),
        Commands::Export {
            file,
            output,
            force,
            store,
        } => cli::export::run(&file, &output, force, &cli::store_path(&store)),
        Commands::Demo { output, count } => cli::demo::run(&output, count),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
