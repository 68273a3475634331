use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use krishi_advisor::AdvisoryEngine;
use krishi_core::{IntentClassifier, QueryEntities, QueryInput, ResponseComposer};
use krishi_knowledge::KnowledgeBase;
use krishi_observability::{init_tracing, AppMetrics};
use serde_json::{json, Map, Value};

#[derive(Debug, Parser)]
#[command(name = "krishi")]
#[command(about = "KrishiMitra agricultural advisory CLI")]
struct Cli {
    /// Directory of JSON knowledge fragments merged over the builtin base.
    #[arg(long)]
    kb_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Ask {
        text: String,
        #[arg(long)]
        lang: Option<String>,
        #[arg(long)]
        temperature: Option<f64>,
        #[arg(long)]
        humidity: Option<f64>,
        #[arg(long)]
        price: Option<f64>,
        #[arg(long)]
        change: Option<String>,
    },
    Classify {
        text: String,
    },
    Chat,
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },
}

#[derive(Debug, Subcommand)]
enum KbCommand {
    Crop {
        name: String,
    },
    Context {
        intent: String,
        #[arg(long)]
        crop: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing("krishi_cli");
    let cli = Cli::parse();

    let metrics = AppMetrics::shared();
    let engine = build_engine(cli.kb_dir.as_deref(), metrics.clone())?;

    match cli.command {
        Command::Ask {
            text,
            lang,
            temperature,
            humidity,
            price,
            change,
        } => {
            let reply = engine.advise(QueryInput {
                text,
                language: lang,
                conditions: conditions_from_flags(temperature, humidity, price, change),
            });
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
        Command::Classify { text } => {
            let result = engine.classify(&text);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Command::Chat => run_chat(&engine)?,
        Command::Kb { command } => match command {
            KbCommand::Crop { name } => {
                let record = engine
                    .knowledge()
                    .crop(&name)
                    .with_context(|| format!("no knowledge entry for crop: {name}"))?;
                println!("{}", serde_json::to_string_pretty(record)?);
            }
            KbCommand::Context { intent, crop } => {
                let entities = QueryEntities {
                    crop,
                    ..Default::default()
                };
                let context = engine.knowledge().retrieve_context(&intent, &entities);
                println!("{}", serde_json::to_string_pretty(&context)?);
            }
        },
    }

    Ok(())
}

fn run_chat(engine: &AdvisoryEngine) -> Result<()> {
    println!("KrishiMitra chat mode. type 'exit' to quit.");

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

        let reply = engine.advise(QueryInput {
            text: message.to_string(),
            language: None,
            conditions: Map::new(),
        });

        println!("\n[{} / {}]", reply.intent, reply.language.as_code());
        println!("{}\n", reply.advice);

        if !reply.action_items.is_empty() {
            println!("Action items:");
            for item in reply.action_items {
                println!("- {item}");
            }
            println!();
        }
    }

    Ok(())
}

fn build_engine(kb_dir: Option<&std::path::Path>, metrics: Arc<AppMetrics>) -> Result<AdvisoryEngine> {
    let knowledge = match kb_dir {
        Some(dir) => KnowledgeBase::from_dir(dir)
            .with_context(|| format!("failed loading knowledge base from {}", dir.display()))?,
        None => KnowledgeBase::builtin(),
    };

    Ok(AdvisoryEngine::new(
        IntentClassifier::with_default_rules(),
        ResponseComposer::with_default_facts(),
        Arc::new(knowledge),
        metrics,
    ))
}

fn conditions_from_flags(
    temperature: Option<f64>,
    humidity: Option<f64>,
    price: Option<f64>,
    change: Option<String>,
) -> Map<String, Value> {
    let mut conditions = Map::new();

    if let Some(temperature) = temperature {
        conditions.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(humidity) = humidity {
        conditions.insert("humidity".to_string(), json!(humidity));
    }
    if let Some(price) = price {
        conditions.insert("price".to_string(), json!(price));
    }
    if let Some(change) = change {
        conditions.insert("change".to_string(), json!(change));
    }

    conditions
}
