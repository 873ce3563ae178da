use clap::Parser;
use finboard::cli::{Args, build_config, init_logging, load_jwt_secret, open_database};
use finboard::{create_app, serve};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format, args.environment);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let config = build_config(&args, db.clone(), jwt_secret);
    let app = create_app(&config).unwrap_or_else(|e| {
        error!(error = %e, "Invalid session configuration");
        std::process::exit(1);
    });

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    match listener.local_addr() {
        Ok(local_addr) => info!(
            address = %local_addr,
            environment = ?args.environment,
            "Listening"
        ),
        Err(e) => error!(error = %e, "Failed to read local address"),
    }

    if let Err(e) = serve(app, listener, db).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
