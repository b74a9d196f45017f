mod cli;
mod commands;

use clap::Parser;
use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        cli::Commands::Resolve {
            path,
            build,
            query,
            get,
            output,
        } => {
            let query_patterns: Vec<&str> = query.iter().map(String::as_str).collect();
            commands::resolve(&path, &build, &query_patterns, get, output)
        }
        cli::Commands::List {
            path,
            build,
            prefix,
        } => commands::list(&path, &build, &prefix),
    }
}
