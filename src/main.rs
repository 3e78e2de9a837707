//! Gatekeeper server binary

use clap::Parser;
use gatekeeper::server::ServerBuilder;
use gatekeeper::init_logging;

/// Role-based access control API server
#[derive(Parser)]
#[command(name = "gatekeeper")]
#[command(about = "Role-based access control service with JWT authentication")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    std::env::set_var(
        "RUST_LOG",
        format!("gatekeeper={},tower_http=info", args.log_level),
    );
    init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut builder = ServerBuilder::new()
        .host(args.host)
        .port(args.port)
        .dev_mode(args.dev);
    if let Some(database_url) = args.database_url {
        builder = builder.database_url(database_url);
    }

    // Process exits if the database is unreachable; there is nothing to
    // serve without it.
    let server = match builder.build().await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["gatekeeper"]);
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8080);
        assert!(!args.dev);

        let args = Args::parse_from(["gatekeeper", "--host", "0.0.0.0", "--port", "3000", "--dev"]);
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 3000);
        assert!(args.dev);
    }
}
