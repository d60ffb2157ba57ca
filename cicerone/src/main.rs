use std::io::{BufRead, Write};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cicerone::config::Config;
use cicerone::entities::SlotRegistry;
use cicerone::flow::ChatFlow;
use cicerone::models::{Entity, LocationFix};
use cicerone::personas::PERSONAS;
use cicerone::store::FsTokenStore;
use cicerone::telemetry::TracingSink;

#[derive(Parser)]
#[command(name = "cicerone")]
#[command(about = "Persona-driven local-guide chat")]
struct Args {
    /// Guide persona to chat with (unknown ids fall back to the first)
    #[arg(long, default_value = "ava")]
    persona: String,

    /// One-shot query; omit for an interactive session
    #[arg(long)]
    query: Option<String>,

    #[arg(long)]
    latitude: Option<f64>,

    #[arg(long)]
    longitude: Option<f64>,

    /// Place name to ground the context string, e.g. a neighborhood
    #[arg(long)]
    city: Option<String>,

    /// Limit recommendations to this many miles
    #[arg(long)]
    radius: Option<f64>,

    /// Clear the persisted session and transcript before starting
    #[arg(long)]
    reset: bool,

    /// List available personas and exit
    #[arg(long)]
    list_personas: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cicerone=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if args.list_personas {
        for persona in &PERSONAS {
            println!("{:<12} {} - {}", persona.id, persona.name, persona.tone);
        }
        return Ok(());
    }

    let config = Config::from_env();

    if config.recs.api_key.is_none() {
        tracing::warn!("RECS_API_KEY is not set - chat turns will fail until it is provided");
    }
    if config.rewrite.api_key.is_none() {
        tracing::info!(
            "REWRITE_API_KEY is not set - replies will use the persona template fallback"
        );
    }

    let store = Arc::new(FsTokenStore::new(config.state_dir.clone()));
    let mut flow = ChatFlow::new(
        &args.persona,
        &config,
        SlotRegistry::new(),
        store,
        Arc::new(TracingSink),
    )
    .await;

    if args.reset {
        flow.reset().await;
        tracing::info!(persona = flow.persona().id, "session reset");
    }

    let location = LocationFix {
        coords: match (args.latitude, args.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        },
        city: args.city.clone(),
        radius_miles: args.radius,
    };

    println!(
        "Chatting with {} ({}). Empty line or 'exit' to quit.",
        flow.persona().name,
        flow.persona().tone
    );

    if let Some(query) = args.query {
        run_turn(&mut flow, &query, &location).await;
        return Ok(());
    }

    let stdin = std::io::stdin();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let query = line.trim();
        if query.is_empty() || query == "exit" {
            break;
        }
        run_turn(&mut flow, query, &location).await;
    }

    Ok(())
}

async fn run_turn(flow: &mut ChatFlow, query: &str, location: &LocationFix) {
    let persona_name = flow.persona().name;
    match flow.send_turn(query, location).await {
        Ok(()) => {
            if let Some(message) = flow.messages().last() {
                println!("\n{persona_name}: {}\n", message.text);
                for entity in &message.entities {
                    print_entity(entity);
                }
            }
        }
        Err(_) => {
            let error = flow.error().unwrap_or("unknown error");
            eprintln!("error: {error}");
        }
    }
}

fn print_entity(entity: &Entity) {
    let name = entity.name.as_deref().unwrap_or("(unnamed)");
    let mut line = format!("  • {name}");
    if let Some(rating) = entity.rating {
        line.push_str(&format!(" - {rating}★"));
    }
    if let Some(price) = entity.price.as_deref() {
        line.push_str(&format!(" · {price}"));
    }
    println!("{line}");
    if let Some(summary) = entity.summary.as_deref() {
        println!("      {summary}");
    }
    if let Some(slots) = entity.mock_slots.as_deref() {
        println!("      reservable: {}", slots.join(", "));
    }
}
