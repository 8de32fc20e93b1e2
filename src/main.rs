//! scriba - CLI entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scriba::commit::{format_message, generate_commit_message};
use scriba::config::{Config, DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use scriba::git::{collect_staged, commit_staged, open_repository};
use scriba::spinner::Spinner;
use scriba::OpenRouterClient;

/// Generate commit messages from staged changes using AI.
#[derive(Parser, Debug)]
#[command(name = "scriba")]
#[command(about = "Generate commit messages from staged changes using AI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze staged changes and propose a commit message
    Commit {
        /// AI model used for generation (overrides config)
        #[arg(long)]
        model: Option<String>,

        /// Generation temperature (overrides config)
        #[arg(long)]
        temperature: Option<f64>,
    },

    /// Manage configuration settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Set a configuration parameter (model, api_token, temperature)
    Set { parameter: String, value: String },

    /// Display a configuration parameter
    Get { parameter: String },
}

/// What the user chose to do with the proposed message.
enum Action {
    Commit,
    Cancel,
    Edit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("scriba=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Commit { model, temperature } => run_commit(model, temperature).await,
        Command::Config { action } => run_config(action),
    }
}

async fn run_commit(
    model_override: Option<String>,
    temperature_override: Option<f64>,
) -> Result<()> {
    // Step 1: Configuration and credentials
    let mut config = Config::load().context("Failed to load configuration")?;
    let api_token = ensure_api_token(&mut config)?;
    let model = model_override.unwrap_or_else(|| config.model().to_string());
    let temperature = temperature_override.unwrap_or_else(|| config.temperature());

    // Step 2: Collect staged changes
    let repo = open_repository()?;
    let changes = collect_staged(&repo)?;

    if changes.is_empty() {
        eprintln!("Nothing to commit. Stage your changes first (git add).");
        std::process::exit(1);
    }

    // Step 3: Generate the message (spinner runs while the call blocks)
    let client = OpenRouterClient::new(&api_token);
    let spinner = Spinner::start("Generating commit message");
    let result = generate_commit_message(&client, &model, Some(temperature), &changes).await;
    spinner.stop();

    let mut message = format_message(&result.context("Failed to generate commit message")?);
    print_message(&message);

    // Step 4: Confirmation loop
    loop {
        match prompt_for_action()? {
            Action::Commit => {
                let oid = commit_staged(&repo, &message).context("Failed to commit")?;
                println!("Commit successful! [{}]", &oid.to_string()[..7]);
                break;
            }
            Action::Cancel => {
                println!("Commit cancelled");
                break;
            }
            Action::Edit => {
                let edited = dialoguer::Editor::new()
                    .edit(&message)
                    .context("Failed to open editor")?;
                if let Some(edited) = edited {
                    message = format_message(edited.trim());
                    print_message(&message);
                }
            }
        }
    }

    Ok(())
}

fn run_config(action: ConfigAction) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;

    match action {
        ConfigAction::Set { parameter, value } => {
            config.set_parameter(&parameter, &value)?;
            println!("{parameter} configuration saved.");
        }
        ConfigAction::Get { parameter } => match config.get_parameter(&parameter)? {
            Some(value) => println!("{value}"),
            None => match parameter.as_str() {
                "model" => println!("{DEFAULT_MODEL}"),
                "temperature" => println!("{DEFAULT_TEMPERATURE}"),
                _ => println!("API token not set."),
            },
        },
    }

    Ok(())
}

/// Return the configured API token, prompting for it on first run.
fn ensure_api_token(config: &mut Config) -> Result<String> {
    if let Some(token) = config.api_token() {
        return Ok(token.to_string());
    }

    println!("API token not yet configured. Please enter it now.");
    let token: String = dialoguer::Password::new()
        .with_prompt("OpenRouter API token")
        .interact()
        .context("Failed to read API token")?;

    config
        .set_parameter("api_token", &token)
        .context("Failed to save API token to configuration file")?;

    Ok(token)
}

/// Print the proposed commit message, indented for readability.
fn print_message(message: &str) {
    println!("\nCommit message:\n");
    for line in message.lines() {
        println!("  {line}");
    }
    println!();
}

/// Ask what to do with the proposed message until the answer is recognizable.
fn prompt_for_action() -> Result<Action> {
    loop {
        let input: String = dialoguer::Input::new()
            .with_prompt("Commit with this message? ([y]es/[n]o/[e]dit)")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read input")?;

        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(Action::Commit),
            "n" | "no" => return Ok(Action::Cancel),
            "e" | "edit" => return Ok(Action::Edit),
            "" => println!("Please specify one of: [y]es, [n]o, [e]dit."),
            other => println!("Invalid option: {other}"),
        }
    }
}
