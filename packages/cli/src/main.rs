#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the wildfire and deforestation pipeline.
//!
//! Every analysis is available as a subcommand. With no subcommand the
//! tool falls back to an interactive menu. Charts are written as SVG files
//! to the output directory and a short summary is printed to stdout.

mod commands;
mod config;
mod interactive;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use queimadas_dataset_models::WeatherVariable;

use crate::commands::App;
use crate::config::Config;

#[derive(Parser)]
#[command(
    name = "queimadas",
    about = "Wildfire and deforestation analysis for Brazil"
)]
struct Cli {
    /// Config file (defaults to `queimadas.toml` in the working directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the input datasets and model artifact
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Directory charts are written to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fire focuses by state, by month and over time
    Fires {
        /// State to keep (`todos` for every state)
        #[arg(long)]
        state: Option<String>,
    },
    /// Fire focuses against a weather variable
    Weather {
        /// One of `max`, `mean` or `precipitation`
        #[arg(long, default_value = "max", value_parser = parse_variable)]
        variable: WeatherVariable,
    },
    /// Year-against-year monthly comparison
    Compare {
        /// First year included
        #[arg(long)]
        from_year: Option<i32>,
        /// Length of the early-year window, in months
        #[arg(long)]
        months: Option<u32>,
    },
    /// Deforested area by state and government
    Deforestation {
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        year: Option<String>,
        /// Government label (FHC, Lula, Dilma, Temer, Bolsonaro)
        #[arg(long)]
        government: Option<String>,
    },
    /// Project fire focuses with the trained model
    Predict {
        /// Year to project instead of each row's own year
        #[arg(long)]
        year: Option<i32>,
    },
    /// List the states in the fire dataset
    States,
}

fn parse_variable(s: &str) -> Result<WeatherVariable, String> {
    s.parse()
        .map_err(|_| format!("unknown variable '{s}' (expected max, mean or precipitation)"))
}

fn resolve_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = Config::load(cli.config.as_deref())?.with_env(|key| std::env::var(key).ok());
    if let Some(dir) = &cli.data_dir {
        config.data_dir.clone_from(dir);
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir.clone_from(dir);
    }
    log::debug!("Resolved config: {config:?}");
    Ok(config)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let app = App::new(resolve_config(&cli)?);

    let Some(command) = cli.command else {
        return interactive::run(&app);
    };

    match command {
        Commands::Fires { state } => commands::fires(&app, state.as_deref()),
        Commands::Weather { variable } => commands::weather(&app, variable),
        Commands::Compare { from_year, months } => commands::compare(&app, from_year, months),
        Commands::Deforestation {
            state,
            year,
            government,
        } => commands::deforestation(
            &app,
            state.as_deref(),
            year.as_deref(),
            government.as_deref(),
        ),
        Commands::Predict { year } => commands::predict(&app, year),
        Commands::States => commands::states(&app),
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands_and_global_flags() {
        let cli = Cli::try_parse_from([
            "queimadas",
            "deforestation",
            "--state",
            "PA",
            "--government",
            "lula",
            "--data-dir",
            "/srv/data",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/data")));
        assert!(matches!(
            cli.command,
            Some(Commands::Deforestation {
                state: Some(ref s),
                year: None,
                government: Some(ref g),
            }) if s == "PA" && g == "lula"
        ));
    }

    #[test]
    fn weather_variable_is_validated() {
        let cli =
            Cli::try_parse_from(["queimadas", "weather", "--variable", "Precipitation"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Weather {
                variable: WeatherVariable::Precipitation
            })
        ));
        assert!(Cli::try_parse_from(["queimadas", "weather", "--variable", "humidity"]).is_err());
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["queimadas"]).unwrap();
        assert!(cli.command.is_none());
    }
}
