use clap::{Parser, Subcommand};
use client::controller::{run_controller, ControllerSession};
use client::host::{run_host, HostSession};
use client::network::RelayLink;
use client::random_id;
use log::{info, warn};
use shared::{RoomCode, DEFAULT_TICK_RATE};
use std::io::{self, Write};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand, Debug)]
enum Role {
    /// Create a room and run the game for it
    Host {
        /// Relay address to connect to
        #[arg(short = 's', long, default_value = "127.0.0.1:3000")]
        server: String,

        /// Simulation steps per second
        #[arg(short = 't', long, default_value_t = DEFAULT_TICK_RATE)]
        tick_rate: u32,

        /// Start as soon as this many players are seated
        #[arg(short = 'a', long)]
        auto_start: Option<usize>,
    },
    /// Join a room as a controller
    Join {
        /// Relay address to connect to
        #[arg(short = 's', long, default_value = "127.0.0.1:3000")]
        server: String,

        /// Four digit room code
        #[arg(short = 'c', long)]
        code: Option<String>,

        /// Join link carrying the code as `?join=NNNN`
        #[arg(short = 'l', long)]
        link: Option<String>,

        /// Reuse a player id to get the same seat back after a reconnect
        #[arg(short = 'p', long)]
        player_id: Option<String>,
    },
}

fn code_from_args(code: Option<String>, link: Option<String>) -> Option<RoomCode> {
    if let Some(raw) = code {
        match raw.parse() {
            Ok(code) => return Some(code),
            Err(e) => warn!("{}", e),
        }
    }
    let link = link?;
    let code = RoomCode::from_join_link(&link);
    if code.is_none() {
        warn!("No valid room code in link {}", link);
    }
    code
}

async fn prompt_for_code() -> Result<RoomCode, Box<dyn std::error::Error>> {
    loop {
        let (read, line) = tokio::task::spawn_blocking(|| {
            print!("Room code: ");
            io::stdout().flush()?;
            let mut line = String::new();
            let read = io::stdin().read_line(&mut line)?;
            Ok::<_, io::Error>((read, line))
        })
        .await??;

        if read == 0 {
            return Err("stdin closed before a room code was entered".into());
        }
        match line.trim().parse() {
            Ok(code) => return Ok(code),
            Err(e) => eprintln!("{}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut rng = rand::thread_rng();

    match args.role {
        Role::Host {
            server,
            tick_rate,
            auto_start,
        } => {
            info!("Connecting to relay at {}", server);
            let link = RelayLink::connect(&server).await?;
            let session = HostSession::new(random_id("host", &mut rng), auto_start);
            info!("Type start to begin once players have joined, quit to close the room");
            run_host(link, session, tick_rate).await?;
        }
        Role::Join {
            server,
            code,
            link,
            player_id,
        } => {
            let code = match code_from_args(code, link) {
                Some(code) => code,
                None => prompt_for_code().await?,
            };
            let player_id = player_id.unwrap_or_else(|| random_id("player", &mut rng));

            info!("Connecting to relay at {}", server);
            let link = RelayLink::connect(&server).await?;
            info!("Commands: w/a or - to move back, s/d or + to move forward, stop, quit");
            match run_controller(link, ControllerSession::new(player_id, code)).await {
                Err(e) if e.is_terminal() => info!("{}", e),
                result => result?,
            }
        }
    }

    Ok(())
}
