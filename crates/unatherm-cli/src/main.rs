//! unatherm: enrich grouped sequence tables with melting thermodynamics.

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod args;
mod commands;

use args::{parse_args, Command, USAGE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&argv) {
        Ok(command) => command,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    match command {
        Command::Help => {
            println!("{}", USAGE);
        }
        Command::Enrich {
            input,
            config,
            resume,
            save_raw,
            delimiter,
        } => {
            let config =
                commands::resolve_config(&input, config.as_deref(), resume, save_raw, delimiter)?;
            info!("Enriching {}", config.input.display());
            let report = commands::enrich(config).await?;
            commands::print_report(&report);
        }
        Command::Names { input, delimiter } => {
            let rows = commands::names(&input, delimiter.unwrap_or(','))?;
            commands::print_plan(&rows);
        }
        Command::Lookup {
            query,
            inputs,
            fetch_structure,
            delimiter,
        } => {
            let Some(summary) =
                commands::lookup_tables(&inputs, &query, delimiter.unwrap_or(','))?
            else {
                println!("No matching record for '{}'", query.trim());
                std::process::exit(1);
            };
            commands::print_summary(&summary);

            if let Some(dir) = fetch_structure {
                match summary.id.as_deref() {
                    Some(id) => {
                        let path = commands::fetch_structure(id, &dir).await?;
                        println!("Structure: {}", path.display());
                    }
                    None => {
                        error!("Matched row has no Entry ID; nothing to fetch");
                        std::process::exit(1);
                    }
                }
            }
        }
    }

    Ok(())
}
