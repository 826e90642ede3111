use clap::Parser;
use log::info;
use scoreboard_client::input::Action;
use scoreboard_client::network::Client;
use scoreboard_client::rendering::Renderer;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scoreboard server URL
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8787")]
    server: String,

    /// Milliseconds to wait for the server to confirm a command
    #[arg(short = 'w', long, default_value = "2000")]
    wait_ms: u64,

    /// Width of the name column
    #[arg(long, default_value = "24")]
    name_width: usize,

    #[command(subcommand)]
    action: Action,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let mut client = Client::connect(&args.server).await?;

    let Some(command) = args.action.to_command(&mut rand::thread_rng()) else {
        info!("Watching {}", args.server);
        let renderer = Renderer::new(args.name_width, true);
        return client.watch(&renderer).await;
    };

    let renderer = Renderer::new(args.name_width, false);
    match client
        .execute(&command, Duration::from_millis(args.wait_ms))
        .await?
    {
        Some(state) => print!("{}", renderer.render(&state)),
        None => eprintln!("No change: the server did not apply {:?}", args.action),
    }

    client.close().await?;
    Ok(())
}
