// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TRAVEL ITINERARY CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// CLI para gerar roteiros localmente.
//
// Uso:
//   travel-itinerary-cli "Vou para Londres em agosto, monte um roteiro"
//   travel-itinerary-cli --event evento.json   (evento serverless completo)
//   travel-itinerary-cli --event -             (evento lido do stdin)
//   travel-itinerary-cli --server --port=3000  (requer feature "server")
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use travel_itinerary::prelude::*;

/// Tenta carregar o arquivo .env de múltiplos locais possíveis
fn load_dotenv() {
    let possible_paths = [
        PathBuf::from(".env"),
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(".env"),
    ];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    eprintln!(
                        "✓ Carregado .env de: {:?}",
                        path.canonicalize().unwrap_or(path.clone())
                    );
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Erro ao carregar {:?}: {}", path, e);
                }
            }
        }
    }

    if dotenvy::dotenv().is_err() {
        eprintln!("⚠ Nenhum arquivo .env encontrado. Certifique-se de que OPENAI_API_KEY está definida.");
    }
}

fn print_usage(program: &str) {
    eprintln!("Travel Itinerary CLI v{}", travel_itinerary::VERSION);
    eprintln!();
    eprintln!("Uso: {} <pergunta>", program);
    eprintln!();
    eprintln!("Opções:");
    eprintln!("  --event <arquivo|->   Processa um evento serverless (JSON) e imprime a resposta");
    eprintln!("  --server [--port=N]   Sobe o servidor HTTP (feature \"server\", porta padrão 3000)");
    eprintln!();
    eprintln!("Exemplos:");
    eprintln!("  {} \"Vou para Londres em agosto, monte um roteiro\"", program);
    eprintln!("  echo '{{\"body\": \"{{\\\"question\\\": \\\"Paris\\\"}}\"}}' | {} --event -", program);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        std::process::exit(1);
    }

    if args[1] == "--server" {
        return run_server_mode(&args[2..]).await;
    }

    if args[1] == "--event" {
        let Some(source) = args.get(2) else {
            print_usage(&args[0]);
            std::process::exit(1);
        };
        return run_event_mode(source).await;
    }

    run_question_mode(&args[1..].join(" ")).await
}

fn build_pipeline() -> anyhow::Result<TravelPipeline> {
    let config = load_config().context("configuração inválida")?;
    log::info!("📋 {:?}", config.llm);
    Ok(TravelPipeline::from_config(&config))
}

/// Gera o roteiro para a pergunta e imprime no stdout
async fn run_question_mode(question: &str) -> anyhow::Result<()> {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(" TRAVEL ITINERARY v{}", travel_itinerary::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();
    println!("Pergunta: {}", question);
    println!();

    let pipeline = build_pipeline()?;
    let itinerary = pipeline.run(&Query::new(question)).await?;

    println!("{}", itinerary.as_str());
    Ok(())
}

/// Processa um evento completo pelo handler e imprime a resposta JSON
async fn run_event_mode(source: &str) -> anyhow::Result<()> {
    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("falha ao ler {}", source))?
    };
    let event: serde_json::Value =
        serde_json::from_str(&raw).context("evento não é um JSON válido")?;

    let handler = ItineraryHandler::new(build_pipeline()?);
    let response = handler.handle(event).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[cfg(feature = "server")]
async fn run_server_mode(args: &[String]) -> anyhow::Result<()> {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use travel_itinerary::server::{start_server, AppState};

    let port: u16 = args
        .iter()
        .find_map(|a| a.strip_prefix("--port="))
        .map(|p| p.parse::<u16>())
        .transpose()
        .context("porta inválida")?
        .unwrap_or(3000);

    let state = Arc::new(AppState {
        handler: ItineraryHandler::new(build_pipeline()?),
    });
    start_server(SocketAddr::from(([0, 0, 0, 0], port)), state).await
}

#[cfg(not(feature = "server"))]
async fn run_server_mode(_args: &[String]) -> anyhow::Result<()> {
    anyhow::bail!("servidor indisponível: compile com --features server")
}
