mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};

use quiztrace::config::{self, Config};
use quiztrace::logging;
use quiztrace::models::{JsonOutput, Level, Snapshot};
use quiztrace::quiz::{self, QuestionFormat, QuizSession};
use quiztrace::topic::extract_topic;

#[derive(Parser)]
#[command(name = "quiztrace")]
#[command(about = "A quiz companion that tracks per-topic mastery with Bayesian Knowledge Tracing")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the effective BKT parameters
    Config,

    /// Show the topic inferred for a piece of text
    Topic {
        /// Question or message text
        text: String,
    },

    /// Parse and normalize a question file
    Parse {
        /// Path to the question file
        file: PathBuf,

        /// Question file format: json/text
        #[arg(long, short, default_value = "json")]
        format: String,
    },

    /// Apply already-graded answers to a fresh session and show the result
    Replay {
        /// JSON array of {"question": ..., "correct": true|false}
        file: PathBuf,

        /// Only list topics at this level: beginner/intermediate/advanced
        #[arg(long, short)]
        level: Option<String>,
    },

    /// Launch the interactive quiz
    Quiz {
        /// Path to the question file
        file: PathBuf,

        /// Question file format: json/text
        #[arg(long, short, default_value = "json")]
        format: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    // The TUI owns the terminal, so it logs to a file instead
    let _log_guard = if matches!(cli.command, Commands::Quiz { .. }) {
        logging::init_file_tracing(&config.log_level, &config::log_dir())
    } else {
        logging::init_tracing(&config.log_level);
        None
    };
    match &config.source {
        Some(path) => info!(path = %path.display(), "loaded configuration"),
        None => info!("no configuration file, using defaults"),
    }

    match cli.command {
        Commands::Config => {
            let path = config::config_path();
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "path": path,
                        "loaded": config.source.is_some(),
                        "bkt": config.bkt,
                    })))?
                );
            } else {
                match &config.source {
                    Some(_) => println!("Config file: {}", path.display()),
                    None => println!("Config file: {} (not found, defaults)", path.display()),
                }
                println!("Prior:       {:.3}", config.bkt.prior);
                println!("Learn rate:  {:.3}", config.bkt.learn_rate);
                println!("Guess:       {:.3}", config.bkt.guess);
                println!("Slip:        {:.3}", config.bkt.slip);
            }
        }

        Commands::Topic { text } => {
            let topic = extract_topic(&text);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "text": text,
                        "topic": topic,
                    })))?
                );
            } else {
                println!("{}", topic);
            }
        }

        Commands::Parse { file, format } => {
            let format = parse_format(&format)?;
            let raws = quiz::read_questions(&file, format)?;
            let report = quiz::normalize_all(raws);

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&report))?);
            } else if report.questions.is_empty() {
                println!("No questions found.");
            } else {
                for (i, n) in report.questions.iter().enumerate() {
                    let q = &n.question;
                    println!("{}. {} [{}]", i + 1, q.text, q.topic);
                    for (letter, text) in &q.options {
                        let marker = if *letter == q.correct { "*" } else { " " };
                        println!("   {}{}: {}", marker, letter, text);
                    }
                    println!("   Hint: {}", q.hint);
                    if !n.repairs.is_empty() {
                        let repairs: Vec<&str> = n.repairs.iter().map(|r| r.as_str()).collect();
                        println!("   Repaired: {}", repairs.join(", "));
                    }
                    println!();
                }
                if report.skipped > 0 {
                    println!("Skipped {} question(s) with no text.", report.skipped);
                }
            }
        }

        Commands::Replay { file, level } => {
            let level = level.as_deref().map(parse_level).transpose()?;
            let evidence = quiz::read_evidence(&file)?;
            let mut session = QuizSession::new(config.bkt)?;
            for e in &evidence {
                let update = session.record(&e.question, e.correct);
                debug!(question = %e.question, mastery = update.mastery, "replayed answer");
            }
            let mut snapshot = session.snapshot();
            if let Some(level) = level {
                retain_level(&mut snapshot, level);
            }

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&snapshot))?);
            } else {
                print_snapshot(&snapshot);
            }
        }

        Commands::Quiz { file, format } => {
            let format = parse_format(&format)?;
            let raws = quiz::read_questions(&file, format)?;
            let mut session = QuizSession::new(config.bkt)?;
            if session.load(raws) == 0 {
                return Err(format!("No usable questions in {}", file.display()).into());
            }
            tui::run(session)?;
        }
    }

    Ok(())
}

fn parse_format(format: &str) -> Result<QuestionFormat, String> {
    QuestionFormat::from_str(format).ok_or_else(|| {
        format!(
            "Invalid format '{}'. Use: {} or {}",
            format,
            QuestionFormat::Json.as_str(),
            QuestionFormat::Text.as_str()
        )
    })
}

fn parse_level(level: &str) -> Result<Level, String> {
    Level::from_str(level).ok_or_else(|| {
        format!(
            "Invalid level '{}'. Use: beginner, intermediate or advanced",
            level
        )
    })
}

// Aggregate scores stay; only the topic listing is narrowed
fn retain_level(snapshot: &mut Snapshot, level: Level) {
    snapshot.per_topic.retain(|t| t.level == level);
}

fn print_snapshot(snapshot: &Snapshot) {
    println!("=== Knowledge Snapshot ===");
    println!(
        "Score: {}% ({}/{} correct)",
        snapshot.overall_percent, snapshot.answered_correctly, snapshot.total_questions
    );
    println!("Average mastery: {}%", snapshot.overall_mastery_percent);

    if snapshot.per_topic.is_empty() {
        println!("No topics yet.");
        return;
    }

    println!();
    println!(
        "{:<25} {:>8} {:<14} {:>8} {:>8}",
        "TOPIC", "MASTERY", "LEVEL", "ATTEMPTS", "CORRECT"
    );
    println!("{}", "-".repeat(67));
    for t in &snapshot.per_topic {
        println!(
            "{:<25} {:>7}% {:<14} {:>8} {:>7}%",
            truncate(&t.topic, 23),
            t.mastery_percent,
            t.level.label(),
            t.attempts,
            t.success_percent
        );
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
