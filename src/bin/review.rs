//! vocab-review: Rate due vocabulary cards in the terminal
//!
//! Usage:
//!   vocab-review                          # Review against the configured server
//!   vocab-review --server http://host:3000
//!   vocab-review --offline                # Rate from the cached deck, queue everything
//!
//! Keys: <enter> reveal, 1-4 rate (again/hard/good/easy), s sync now, q quit

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vocab_review::cli::ReviewArgs;
use vocab_review::{Rating, ReviewItem, ReviewRuntime, SessionState};

fn print_front(card: &ReviewItem, position: usize, total: usize) {
    println!();
    println!("[{}/{}] {}", position + 1, total, card.word);
    if let Some(ref pos) = card.part_of_speech {
        println!("        ({})", pos);
    }
}

fn print_back(card: &ReviewItem) {
    println!("  meaning: {}", card.meaning);
    if let Some(ref pronunciation) = card.pronunciation {
        println!("  pronunciation: {}", pronunciation);
    }
    if let Some(ref translation) = card.translation {
        println!("  translation: {}", translation);
    }
    for example in &card.examples {
        println!("  - {}", example);
    }
}

fn parse_rating(input: &str) -> Option<Rating> {
    match input {
        "1" => Some(Rating::Again),
        "2" => Some(Rating::Hard),
        "3" => Some(Rating::Good),
        "4" => Some(Rating::Easy),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = ReviewArgs::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = args.common.resolve()?;
    let mut runtime = ReviewRuntime::from_config(&config).await?;
    if args.offline {
        runtime.monitor.set_reachable(false);
    }
    runtime.spawn_background(&config, !args.offline)?;

    let session = &runtime.session;
    match session.start().await {
        SessionState::EmptyDeck => {
            println!("Nothing due for review.");
            runtime.shutdown().await;
            return Ok(());
        }
        SessionState::Error(message) => {
            eprintln!("{}", message);
            runtime.shutdown().await;
            std::process::exit(1);
        }
        _ => {}
    }

    if let Some(source) = session.deck_source() {
        println!("{} cards loaded from {:?}", session.deck_len(), source);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown: Option<usize> = None;

    loop {
        let (card_index, show_answer) = match session.state() {
            SessionState::Active {
                card_index,
                show_answer,
            } => (card_index, show_answer),
            SessionState::Complete { accuracy } => {
                println!();
                println!("Session complete: {:.0}% remembered", accuracy * 100.0);
                break;
            }
            SessionState::Error(message) => {
                eprintln!("{}", message);
                break;
            }
            _ => break,
        };

        let Some(card) = session.current_card() else {
            break;
        };
        if shown != Some(card_index) {
            print_front(&card, card_index, session.deck_len());
            shown = Some(card_index);
        }
        if show_answer {
            println!(
                "  rate: 1 again  2 hard  3 good  4 easy   [{}]",
                session.sync_status()
            );
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "q" => break,
            "s" => session.request_sync_now(),
            "" => {
                session.reveal_answer();
                print_back(&card);
            }
            input => match parse_rating(input) {
                Some(rating) => {
                    if let Err(e) = session.submit_rating(rating).await {
                        eprintln!("Failed to record rating: {}", e);
                    }
                }
                None => println!("Unknown key: {}", input),
            },
        }
    }

    let stats = session.session_stats();
    println!(
        "Rated {} cards, {} remembered, {}s. Sync: {}",
        stats.total,
        stats.correct,
        stats.elapsed.as_secs(),
        session.sync_status()
    );

    runtime.shutdown().await;
    Ok(())
}
