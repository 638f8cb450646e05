use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use wordbook_app::config::Config;
use wordbook_app::database::{db, progress, reports, sessions};
use wordbook_app::export::json::{export_json_to_path, import_json};
use wordbook_app::models::{
    FixedClock, Judgment, ModerationAction, NewWord, NewWordbook, ReviewSession, SystemClock,
};

/// Wordbook - vocabulary study with spaced repetition
#[derive(Parser)]
#[command(name = "wordbook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Study wordbooks and schedule reviews with spaced repetition")]
struct Cli {
    /// SQLite database file (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty wordbook
    Create {
        name: String,
        /// Number of study days
        #[arg(long)]
        days: u32,
        #[arg(long)]
        description: Option<String>,
    },

    /// List wordbooks
    List,

    /// Show the words of a wordbook
    Words {
        wordbook_id: i64,
        #[arg(long)]
        day: Option<u32>,
        /// Only words whose english or korean text contains this
        #[arg(long)]
        search: Option<String>,
    },

    /// Add a word to a wordbook
    AddWord {
        wordbook_id: i64,
        english: String,
        korean: String,
        #[arg(long)]
        day: u32,
    },

    /// Delete a word (with its progress and reports)
    DeleteWord { word_id: i64 },

    /// Delete a wordbook (with its words, progress and reports)
    DeleteWordbook { wordbook_id: i64 },

    /// Record a judgment (unknown, unsure, known) for one word
    Review {
        user: String,
        word_id: i64,
        judgment: Judgment,
    },

    /// Walk through the words due today and judge each one
    Session {
        user: String,
        wordbook_id: i64,
        /// Judgments in order, one per due word (e.g. known,unsure,unknown)
        #[arg(long, value_delimiter = ',')]
        judgments: Vec<Judgment>,
    },

    /// Show a stored review session summary
    SessionSummary { user: String, session_id: i64 },

    /// List words due for review
    Due {
        user: String,
        wordbook_id: i64,
        /// Only these days of the wordbook (comma-separated)
        #[arg(long, value_delimiter = ',')]
        days: Option<Vec<u32>>,
    },

    /// Show progress statistics for a user
    Stats {
        user: String,
        /// Summarize one day of this wordbook instead (needs --day)
        #[arg(long, requires = "day")]
        wordbook: Option<i64>,
        /// Day of the wordbook to summarize (needs --wordbook)
        #[arg(long, requires = "wordbook")]
        day: Option<u32>,
    },

    /// List wordbooks with words due for review
    DueWordbooks { user: String },

    /// Show the known words of every day of a wordbook
    Progress { user: String, wordbook_id: i64 },

    /// Show due words, recently studied words and today's activity
    Dashboard { user: String },

    /// Show progress per wordbook and reviews over the last week
    Statistics { user: String },

    /// Report a correction for a word
    Report {
        user: String,
        word_id: i64,
        english: String,
        korean: String,
    },

    /// List word reports, newest first
    Reports,

    /// Accept, reject, delete or undo a report
    Moderate {
        report_id: i64,
        action: ModerationAction,
    },

    /// Delete several reports
    DeleteReports {
        #[arg(required = true, value_delimiter = ',')]
        report_ids: Vec<i64>,
    },

    /// Export a wordbook to JSON
    Export { wordbook_id: i64, output: PathBuf },

    /// Import a wordbook from JSON
    Import { file: PathBuf },

    /// Create a sample wordbook if there are none
    Seed,

    /// Show the current date, including days skipped with next-day
    Today,

    /// Move the app's date one day ahead of the system clock
    NextDay,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path());
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let conn = db::init_database(&db_path).context("Failed to initialize database")?;

    run(cli.command, &conn, &config)
}

fn run(command: Commands, conn: &Connection, config: &Config) -> Result<()> {
    let policy = &config.scheduler;
    let clock = FixedClock(db::current_date(conn, &SystemClock)?);

    match command {
        Commands::Create {
            name,
            days,
            description,
        } => {
            let wordbook = db::create_wordbook(
                conn,
                &NewWordbook {
                    name,
                    total_days: days,
                    description,
                },
            )?;
            println!("Created wordbook {} '{}'", wordbook.id, wordbook.name);
        }
        Commands::List => {
            let wordbooks = db::list_wordbooks(conn)?;
            println!("Wordbooks ({})", wordbooks.len());
            for wordbook in wordbooks {
                let words = db::words_for_wordbook(conn, wordbook.id, None)?.len();
                println!(
                    "  {}. {} ({} days, {} words)",
                    wordbook.id, wordbook.name, wordbook.total_days, words
                );
            }
        }
        Commands::Words {
            wordbook_id,
            day,
            search,
        } => {
            let words = match search {
                Some(query) => db::search_words(conn, wordbook_id, &query)?
                    .into_iter()
                    .filter(|w| day.is_none_or(|d| w.day == d))
                    .collect(),
                None => db::words_for_wordbook(conn, wordbook_id, day)?,
            };
            for word in words {
                println!("  [{}] day {}: {} - {}", word.id, word.day, word.english, word.korean);
            }
        }
        Commands::AddWord {
            wordbook_id,
            english,
            korean,
            day,
        } => {
            let word = db::add_word(conn, wordbook_id, &NewWord { english, korean, day })?;
            println!("Word {} on day {}: {} - {}", word.id, word.day, word.english, word.korean);
        }
        Commands::DeleteWord { word_id } => {
            db::delete_word(conn, word_id)?;
            println!("Deleted word {word_id}");
        }
        Commands::DeleteWordbook { wordbook_id } => {
            db::delete_wordbook(conn, wordbook_id)?;
            println!("Deleted wordbook {wordbook_id}");
        }
        Commands::Review {
            user,
            word_id,
            judgment,
        } => {
            let progress = progress::record_judgment(conn, policy, &clock, &user, word_id, judgment)?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        Commands::Session {
            user,
            wordbook_id,
            judgments,
        } => {
            let due = progress::words_due_for_review(conn, &user, wordbook_id, None, clock.0)?;
            if due.is_empty() {
                println!("Nothing to review today");
                return Ok(());
            }

            let mut session = ReviewSession::new(user, due);
            for judgment in judgments {
                let Some(current) = session.current_word() else {
                    break;
                };
                println!("  {} - {}: {}", current.word.english, current.word.korean, judgment);
                session.judge_current(conn, policy, &clock, judgment)?;
            }
            println!(
                "Reviewed {} of {} words ({} left)",
                session.reviewed_count(),
                session.total_count(),
                session.remaining_count()
            );

            let (session_id, summary) = session.finish(conn)?;
            println!(
                "Session {}: {} correct, {} incorrect, accuracy {:.0}%",
                session_id,
                summary.correct_words,
                summary.incorrect_words,
                summary.accuracy * 100.0
            );
        }
        Commands::SessionSummary { user, session_id } => {
            let summary = sessions::session_summary(conn, session_id, &user)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Due {
            user,
            wordbook_id,
            days,
        } => {
            let due =
                progress::words_due_for_review(conn, &user, wordbook_id, days.as_deref(), clock.0)?;
            let due_days = progress::days_with_due_words(conn, &user, wordbook_id, clock.0)?;
            println!("{} words due on {} (days {:?})", due.len(), clock.0, due_days);
            for item in due {
                println!(
                    "  [{}] day {}: {} - {} (last: {})",
                    item.word.id, item.word.day, item.word.english, item.word.korean, item.status
                );
            }
        }
        Commands::Stats {
            user,
            wordbook,
            day,
        } => match wordbook.zip(day) {
            Some((wordbook_id, day)) => {
                let summary = progress::day_summary(conn, &user, wordbook_id, day)?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            None => {
                let stats = progress::progress_stats(conn, &user)?;
                println!("{}", serde_json::to_string_pretty(&stats)?);
            }
        },
        Commands::DueWordbooks { user } => {
            let wordbooks = progress::wordbooks_with_due_words(conn, &user, clock.0)?;
            println!("{} wordbooks to review on {}", wordbooks.len(), clock.0);
            for wordbook in wordbooks {
                println!("  {}. {}", wordbook.id, wordbook.name);
            }
        }
        Commands::Progress { user, wordbook_id } => {
            for day in progress::wordbook_day_progress(conn, &user, wordbook_id)? {
                println!(
                    "  day {}: {}/{} known",
                    day.day, day.known_words, day.total_words
                );
            }
        }
        Commands::Dashboard { user } => {
            let dashboard = progress::dashboard(conn, &user, clock.0)?;
            println!("{}", serde_json::to_string_pretty(&dashboard)?);
        }
        Commands::Statistics { user } => {
            let statistics = progress::statistics(conn, &user, clock.0)?;
            println!("{}", serde_json::to_string_pretty(&statistics)?);
        }
        Commands::Report {
            user,
            word_id,
            english,
            korean,
        } => {
            let report = reports::submit_report(conn, &user, word_id, &english, &korean)?;
            println!("Report {} submitted", report.id);
        }
        Commands::Reports => {
            for report in reports::list_reports(conn)? {
                println!(
                    "  [{}] {} word {}: {} / {} -> {} / {} by {}",
                    report.id,
                    report.status,
                    report.word_id,
                    report.original_english,
                    report.original_korean,
                    report.reported_english,
                    report.reported_korean,
                    report.user_id
                );
            }
        }
        Commands::Moderate { report_id, action } => {
            reports::moderate_report(conn, report_id, action)?;
            println!("Report {report_id}: {action:?} done");
        }
        Commands::DeleteReports { report_ids } => {
            let deleted = reports::delete_reports(conn, &report_ids)?;
            println!("Deleted {deleted} reports");
        }
        Commands::Export {
            wordbook_id,
            output,
        } => {
            let contents = db::load_wordbook_contents(conn, wordbook_id)?;
            export_json_to_path(&contents, &output)
                .with_context(|| format!("Failed to export to {}", output.display()))?;
            println!(
                "Wordbook '{}' exported with {} words",
                contents.wordbook.name,
                contents.words.len()
            );
        }
        Commands::Import { file } => {
            let contents = import_json(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let wordbook = db::import_wordbook(conn, &contents)?;
            println!(
                "Wordbook '{}' imported successfully with {} words",
                wordbook.name,
                contents.words.len()
            );
        }
        Commands::Seed => {
            if !db::list_wordbooks(conn)?.is_empty() {
                println!("Database already has wordbooks");
                return Ok(());
            }
            let wordbook = db::create_wordbook(
                conn,
                &NewWordbook {
                    name: "Everyday English".to_string(),
                    total_days: 2,
                    description: Some("Sample wordbook".to_string()),
                },
            )?;
            for (english, korean, day) in [
                ("hello", "안녕하세요", 1),
                ("thank you", "감사합니다", 1),
                ("please", "부탁합니다", 2),
            ] {
                db::add_word(
                    conn,
                    wordbook.id,
                    &NewWord {
                        english: english.to_string(),
                        korean: korean.to_string(),
                        day,
                    },
                )?;
            }
            println!("Sample data created!");
        }
        Commands::Today => println!("{}", clock.0),
        Commands::NextDay => println!("{}", db::advance_day(conn, &SystemClock)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_stats_day_summary_flags() {
        let cli = Cli::try_parse_from(["wordbook", "stats", "bob", "--wordbook", "3", "--day", "2"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stats {
                wordbook: Some(3),
                day: Some(2),
                ..
            }
        ));

        let cli = Cli::try_parse_from(["wordbook", "stats", "bob"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stats {
                wordbook: None,
                day: None,
                ..
            }
        ));

        assert!(Cli::try_parse_from(["wordbook", "stats", "bob", "--day", "2"]).is_err());
        assert!(Cli::try_parse_from(["wordbook", "stats", "bob", "--wordbook", "3"]).is_err());
        assert!(
            Cli::try_parse_from(["wordbook", "stats", "bob", "--wordbook", "3", "--day", "-1"])
                .is_err()
        );
    }
}
