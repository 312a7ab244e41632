use std::net::SocketAddr;

use consulting_portal::config::Config;
use consulting_portal::db::models::Role;
use consulting_portal::feed::ChangeFeed;
use consulting_portal::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize tracing; LOG_FORMAT=json for structured output
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "consulting_portal=debug,tower_http=debug".into());
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {e}"))?;

    let db = consulting_portal::db::pool::connect(&config.database_url).await?;
    tracing::info!("Connected to database");

    consulting_portal::db::migration::run(&db).await?;
    tracing::info!("Migrations applied");

    // Seed subcommand: cargo run -- seed <email> <password> [role]
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "seed" {
        let email = args
            .get(2)
            .map(|s| s.as_str())
            .unwrap_or("admin@example.com");
        let password = args.get(3).map(|s| s.as_str());
        let role: Role = match args.get(4) {
            Some(role) => role.parse()?,
            None => Role::Father,
        };

        println!("=== Portal Bootstrap ===\n");

        let result = consulting_portal::seed::bootstrap(&db, email, password, role).await?;

        match result.user_action.as_str() {
            "created" => println!("Created {role} account: {email}"),
            "promoted" => println!("Promoted {email} to {role}."),
            "already_admin" => println!("{email} is already {role}."),
            _ => {}
        }
        println!("  User ID: {}", result.user_id);

        println!("\n=== Bootstrap complete ===");
        return Ok(());
    }

    let jwt = consulting_portal::auth::jwt::JwtManager::new(&config)?;
    let feed = ChangeFeed::new(config.feed_capacity);

    let state = AppState {
        db,
        jwt,
        config: config.clone(),
        feed,
    };

    let app = consulting_portal::routes::create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;

    tracing::info!("Starting server on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
