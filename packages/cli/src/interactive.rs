//! Menu-driven mode, used when no subcommand is given.

use dialoguer::{Confirm, Input, Select};
use queimadas_dataset_models::WeatherVariable;
use queimadas_government::Government;

use crate::commands::{self, App};

/// Top-level menu entries.
enum Action {
    Fires,
    Weather,
    Compare,
    Deforestation,
    Predict,
    States,
    Quit,
}

impl Action {
    const ALL: &[Self] = &[
        Self::Fires,
        Self::Weather,
        Self::Compare,
        Self::Deforestation,
        Self::Predict,
        Self::States,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Fires => "Queimadas por estado",
            Self::Weather => "Queimadas x variáveis climáticas",
            Self::Compare => "Comparativo entre anos",
            Self::Deforestation => "Desmatamento por governo",
            Self::Predict => "Modelo preditivo",
            Self::States => "Listar estados",
            Self::Quit => "Sair",
        }
    }
}

/// Runs the menu loop until the user quits. A failing action is reported
/// and the menu is shown again.
///
/// # Errors
///
/// Returns an error only if the terminal prompt itself fails.
pub fn run(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    println!("Queimadas e Desmatamento no Brasil");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    loop {
        let idx = Select::new()
            .with_prompt("O que você gostaria de ver?")
            .items(&labels)
            .default(0)
            .interact()?;

        let result = match Action::ALL[idx] {
            Action::Fires => fires(app),
            Action::Weather => weather(app),
            Action::Compare => compare(app),
            Action::Deforestation => deforestation(app),
            Action::Predict => predict(app),
            Action::States => commands::states(app),
            Action::Quit => return Ok(()),
        };

        if let Err(e) = result {
            log::error!("{e}");
        }
        println!();
    }
}

/// Offers "Todos" plus every option; returns the raw value picked, or
/// `None` for "Todos".
fn select_optional(
    prompt: &str,
    options: &[(String, String)],
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let labels: Vec<&str> = std::iter::once("Todos")
        .chain(options.iter().map(|(_, display)| display.as_str()))
        .collect();

    let idx = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;

    Ok(idx
        .checked_sub(1)
        .and_then(|i| options.get(i))
        .map(|(raw, _)| raw.clone()))
}

fn fires(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let states = commands::state_options(app)?;
    let state = select_optional("Selecione um estado", &states)?;
    commands::fires(app, state.as_deref())
}

fn weather(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let labels: Vec<&str> = WeatherVariable::ALL.iter().map(|v| v.label()).collect();
    let idx = Select::new()
        .with_prompt("Selecione a variável")
        .items(&labels)
        .default(0)
        .interact()?;
    commands::weather(app, WeatherVariable::ALL[idx])
}

fn compare(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let settings = &app.config.comparison;
    let from_year: i32 = Input::new()
        .with_prompt("A partir do ano")
        .default(settings.from_year)
        .interact_text()?;
    let months: u32 = Input::new()
        .with_prompt("Meses no início do ano")
        .default(settings.months)
        .interact_text()?;
    commands::compare(app, Some(from_year), Some(months))
}

fn deforestation(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let states = commands::deforestation_state_options(app)?;
    let state = select_optional("Selecione um estado", &states)?;

    let governments: Vec<(String, String)> = Government::known()
        .into_iter()
        .map(|g| (g.to_string(), g.to_string()))
        .collect();
    let government = select_optional("Selecione um governo", &governments)?;

    commands::deforestation(app, state.as_deref(), None, government.as_deref())
}

fn predict(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    let go = Confirm::new()
        .with_prompt("Projetar queimadas com o modelo treinado?")
        .default(true)
        .interact()?;

    if !go {
        println!("Projeção cancelada.");
        return Ok(());
    }
    commands::predict(app, None)
}
