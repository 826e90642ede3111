use clap::Parser;
use log::info;
use scoreboard_server::network::Server;
use scoreboard_shared::{RuleConfig, DEFAULT_PORT};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Maximum number of simultaneous viewers
    #[arg(short, long, default_value = "64")]
    max_clients: usize,
    /// Require START_MATCH before points are accepted
    #[arg(long)]
    explicit_start: bool,
    /// Restore match point from the snapshot on undo instead of recomputing it
    #[arg(long)]
    keep_match_point_on_undo: bool,
    /// Reject points while a time-out is active
    #[arg(long)]
    timeout_blocks_scoring: bool,
}

impl Args {
    fn rules(&self) -> RuleConfig {
        RuleConfig {
            explicit_start: self.explicit_start,
            keep_match_point_on_undo: self.keep_match_point_on_undo,
            timeout_blocks_scoring: self.timeout_blocks_scoring,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let rules = args.rules();
    info!("Rules: {:?}", rules);

    let address = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(&address, args.max_clients, rules).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
