use jirai_server::{build, config::Config};
use tracing::{error, info};

#[rocket::main]
async fn main() {
    tracing_subscriber::fmt::init();
    info!("🚀 Starting jirai minesweeper server");

    let rocket = match Config::load().and_then(|config| build(&config)) {
        Ok(rocket) => rocket,
        Err(e) => {
            error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    info!("📡 Endpoints: GET /minefields, POST /sessions, PUT /sessions/<id>/touch");

    if let Err(e) = rocket.launch().await {
        error!("Server stopped with error: {}", e);
        std::process::exit(1);
    }
}
