//! Headless driver for the sensor chessboard.
//!
//! Polls the board at a fixed interval, announces inferred candidate moves,
//! and lets the operator confirm them from the terminal. Terminal input is
//! read on its own thread and handed over a channel so polling never blocks.

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};
use shakmaty::Move;
use shakmaty::san::San;

use reedboard::SessionError;
use reedboard::models::{BoardLink, BoardTracker, Session};

#[derive(Parser)]
#[command(
    name = "reedboard",
    about = "Driver for a magnetic-piece-tracking digital chessboard",
    version
)]
struct Args {
    /// Serial port the board is connected to
    #[arg(short, long)]
    port: String,

    /// Polling interval in milliseconds
    #[arg(long, default_value_t = 50)]
    interval: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "info" }),
    )
    .init();

    let link = BoardLink::open_serial(&args.port)?;
    let mut session = Session::new(BoardTracker::new(link));
    session.new_game()?;
    info!("game on - enter confirms a candidate move, 'r' resigns, 'q' quits");

    let commands = spawn_stdin_reader();
    let mut announced: Option<Move> = None;

    loop {
        session.update()?;

        if let Some(outcome) = session.outcome() {
            info!("{outcome}");
            return Ok(());
        }

        match session.candidate() {
            Some(m) if announced.as_ref() != Some(m) => {
                if let Some(position) = session.position() {
                    let san = San::from_move(&position, m.clone());
                    info!("candidate move: {san} - press enter to confirm");
                }
                announced = Some(m.clone());
            }
            Some(_) => {}
            None => announced = None,
        }

        while let Ok(line) = commands.try_recv() {
            match line.trim() {
                "" => match session.confirm_move(None) {
                    Ok(_) => info!("move confirmed"),
                    Err(SessionError::NoCandidate) => warn!("no candidate move to confirm"),
                    Err(e) => return Err(e.into()),
                },
                "r" => session.resign()?,
                "q" => {
                    info!("quitting");
                    return Ok(());
                }
                other => warn!("unknown command {other:?}"),
            }
        }

        thread::sleep(Duration::from_millis(args.interval));
    }
}

/// Forward stdin lines over a channel; the sender half is dropped on EOF.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
