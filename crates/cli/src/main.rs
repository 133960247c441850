use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vera_agents::CompanionAgent;
use vera_core::TRIGGER_TABLE;
use vera_llm::{
    provider_from_env, CompletionSettings, DEFAULT_FREQUENCY_PENALTY, DEFAULT_MAX_TOKENS,
    DEFAULT_MODEL, DEFAULT_PRESENCE_PENALTY, DEFAULT_TEMPERATURE,
};
use vera_observability::{init_cli_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "vera")]
#[command(about = "VERA companion CLI")]
struct Cli {
    #[arg(long, env = "VERA_OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "VERA_MAX_TOKENS", default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    #[arg(long, env = "VERA_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    #[arg(long, env = "VERA_PRESENCE_PENALTY", default_value_t = DEFAULT_PRESENCE_PENALTY)]
    presence_penalty: f32,

    #[arg(long, env = "VERA_FREQUENCY_PENALTY", default_value_t = DEFAULT_FREQUENCY_PENALTY)]
    frequency_penalty: f32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat, one turn per line.
    Chat,
    /// Run a single turn and print the report as JSON.
    Turn { message: String },
    /// Show how a message would be classified without calling the model.
    Classify { message: String },
    /// List the adaptive codes in priority order.
    Codes,
}

impl Cli {
    fn settings(&self) -> CompletionSettings {
        CompletionSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_cli_tracing("vera_cli");
    let cli = Cli::parse();

    match &cli.command {
        Command::Codes => {
            for (idx, entry) in TRIGGER_TABLE.iter().enumerate() {
                println!("{:>2}. {:<20} {}", idx + 1, entry.code, entry.triggers.join(", "));
            }
        }
        Command::Classify { message } => {
            let plan = build_agent(&cli)?.classify(message)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Turn { message } => {
            let agent = build_agent(&cli)?;
            let report = agent.process_turn(message).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Chat => run_chat(build_agent(&cli)?).await?,
    }

    Ok(())
}

async fn run_chat(agent: CompanionAgent) -> Result<()> {
    println!("VERA chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let report = agent.process_turn(message).await?;
        println!("\n{}\n", report.reply());
    }

    Ok(())
}

fn build_agent(cli: &Cli) -> Result<CompanionAgent> {
    let provider = provider_from_env().context("failed to set up completion provider")?;
    Ok(CompanionAgent::new(
        provider,
        cli.settings(),
        AppMetrics::shared(),
    ))
}
