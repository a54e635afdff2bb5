use clap::{Parser, Subcommand, ValueEnum};
use keiro::prelude::*;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Output format for evaluated workflow states.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Report,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile the configuration and report any error
    Check,
    /// Evaluate the data and print the workflow state
    State {
        #[arg(short, long, value_enum, default_value = "report")]
        format: OutputFormat,
    },
    /// Print the section that follows `section`
    Next { section: String },
    /// Print the section that precedes `section`
    Previous { section: String },
    /// Print whether `section` is reachable
    Reachable { section: String },
}

/// Evaluate form workflow configurations against user data
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow configuration (JSON or YAML)
    config_path: String,
    /// Path to the user data (JSON or YAML); defaults to an empty object
    #[arg(short, long)]
    data: Option<String>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let raw_config = load_document(&cli.config_path);
    let engine = Engine::from_definition(&raw_config)
        .unwrap_or_else(|e| exit_with_error(&format!("Invalid configuration: {}", e)));
    let data = cli
        .data
        .as_deref()
        .map(load_document)
        .unwrap_or_else(|| serde_json::json!({}));

    match cli.command {
        Command::Check => {
            println!(
                "Configuration OK: {} sections, {} decisions, {} edges",
                engine.config().section_ids().len(),
                engine.config().decisions().len(),
                engine.config().edges().len()
            );
        }
        Command::State { format } => {
            let state = engine.workflow_state(&data);
            match format {
                OutputFormat::Json => print_json(&state),
                OutputFormat::Report => print!("{}", StateReport::render(engine.config(), &state)),
            }
        }
        Command::Next { section } => print_navigation(engine.next_section(&section, &data)),
        Command::Previous { section } => {
            print_navigation(engine.previous_section(&section, &data))
        }
        Command::Reachable { section } => {
            println!("{}", engine.is_section_reachable(&section, &data));
        }
    }
}

/// Reads a JSON or YAML document, chosen by file extension.
fn load_document(path: &str) -> serde_json::Value {
    let contents = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to read '{}': {}", path, e)));
    let is_yaml = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml_ng::from_str(&contents)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse YAML '{}': {}", path, e)))
    } else {
        serde_json::from_str(&contents)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse JSON '{}': {}", path, e)))
    }
}

fn print_navigation(navigation: Option<Navigation>) {
    match navigation {
        Some(navigation) => print_json(&navigation),
        None => println!("null"),
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    let rendered = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize output: {}", e)));
    println!("{}", rendered);
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
