use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use chatrelay::chat::{ModelCatalog, SessionController, SessionRegistry};
use chatrelay::cli::{commands::{Cli, Commands}, run_cli};
use chatrelay::config::AppConfig;
use clap::Parser;
use std::time::Duration;
use tracing::{error, info};

async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

async fn index() -> impl Responder {
    let html = include_str!("../static/index.html");
    HttpResponse::Ok().content_type("text/html").body(html)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Serve) {
        if let Err(e) = run_cli(cli.command, cli.config).await {
            error!("{}", e);
            std::process::exit(1);
        }
        return Ok(());
    }

    info!("Starting ChatRelay server...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let controller = match SessionController::from_config(&config) {
        Ok(c) => web::Data::new(c),
        Err(e) => {
            error!("Failed to initialize chat services: {}", e);
            std::process::exit(1);
        }
    };

    let catalog = web::Data::new(ModelCatalog::new(config.llm.models.clone()));
    let registry = web::Data::new(SessionRegistry::with_idle_timeout(Duration::from_secs(
        config.server.session_idle_minutes.saturating_mul(60),
    )));

    let host = config.server.host.clone();
    let port = config.server.port;

    info!("Server listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(controller.clone())
            .app_data(catalog.clone())
            .app_data(registry.clone())
            .route("/", web::get().to(index))
            .route("/health", web::get().to(health))
            .configure(chatrelay::api::routes::configure)
    })
    .bind((host, port))?
    .run()
    .await
}
