//! `conversational-forms` command line tool.
//!
//! Inspects form templates without talking to an LLM:
//!
//! ```text
//! conversational-forms validate <template.yaml>
//! conversational-forms prompt <template.yaml>
//! conversational-forms builtin [<key>]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use conversational_forms::adapters::forms::{load_form_file, parse_form_yaml_with_limits};
use conversational_forms::config::{AppConfig, ConfigError, ValidationError};
use conversational_forms::domain::conversation::{
    build_system_prompt, ConfigurationError, ConversationalFormConfig, TemplateCatalog,
};
use conversational_forms::ports::FormConfigError;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect conversational form templates", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Check a template and list its warnings
    Validate {
        /// YAML or JSON form template
        path: PathBuf,
    },
    /// Print the rendered system prompt for a template
    Prompt {
        /// YAML or JSON form template
        path: PathBuf,
    },
    /// List built-in templates, or print one as YAML
    Builtin {
        /// Template key, e.g. `it-helpdesk`
        key: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("configuration error: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Form(#[from] FormConfigError),

    #[error("invalid form: {0}")]
    InvalidForm(#[from] ConfigurationError),

    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("failed to render YAML: {0}")]
    Render(#[from] serde_yaml::Error),
}

fn init_tracing(config: &AppConfig) -> Result<(), ValidationError> {
    let filter = config.logging.env_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn load_template(path: &Path, config: &AppConfig) -> Result<ConversationalFormConfig, CliError> {
    let yaml = load_form_file(path).await?;
    Ok(parse_form_yaml_with_limits(&yaml, &config.engine.default_limits())?)
}

async fn run(command: Command, config: &AppConfig) -> Result<(), CliError> {
    match command {
        Command::Validate { path } => {
            let form = load_template(&path, config).await?;
            form.validate()?;
            let warnings = form.warnings();
            for warning in &warnings {
                println!("warning: {}", warning);
            }
            println!(
                "{}: ok ({} topics, {} fields, {} warnings)",
                path.display(),
                form.topics.len(),
                form.extraction_schema.len(),
                warnings.len()
            );
        }
        Command::Prompt { path } => {
            let form = load_template(&path, config).await?;
            form.validate()?;
            println!("{}", build_system_prompt(&form));
        }
        Command::Builtin { key: None } => {
            for key in TemplateCatalog::builtin().keys() {
                println!("{}", key);
            }
        }
        Command::Builtin { key: Some(key) } => {
            let catalog = TemplateCatalog::builtin();
            let form = catalog
                .get(&key)
                .ok_or_else(|| CliError::UnknownTemplate(key.clone()))?;
            print!("{}", serde_yaml::to_string(form)?);
        }
    }
    Ok(())
}

async fn try_main(cli: Cli) -> Result<(), CliError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config)?;
    run(cli.command, &config).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match try_main(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
