use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use standup::cli::{render_github_report, ReportView};
use standup::config::AppConfig;
use standup::database::Database;
use standup::error::StandupError;
use standup::github::{AggregationRequest, Aggregator, GitHubClient};
use standup::scheduler::notifier::DesktopNotifier;
use standup::scheduler::Scheduler;
use standup::web::Dashboard;

#[derive(Parser)]
#[command(name = "standup")]
#[command(about = "Daily standup assistant: GitHub work summary, check-ins, and reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show GitHub assignments, mentions, board status, and recent merges
    Github {
        /// Override the staleness threshold in weeks
        #[arg(long)]
        stale_weeks: Option<i64>,

        /// Only include board issues whose status matches this value
        #[arg(long)]
        status: Option<String>,

        /// Only show recently merged pull requests
        #[arg(long)]
        merged_only: bool,
    },
    /// Show recently merged pull requests
    Merged,
    /// Answer the daily check-in questions
    Questions,
    /// Answer the morning question about today's focus
    Morning,
    /// List stored entries
    List {
        /// journal, exercise, symptoms, or reminders
        category: String,
    },
    /// Serve the web dashboard
    Web {
        /// Listen port, defaults to SERVER_PORT
        #[arg(long)]
        port: Option<u16>,

        /// Serve canned sample data instead of calling GitHub
        #[arg(long)]
        dev: bool,
    },
    /// Run in the background with scheduled notifications
    Daemon {
        /// Also serve the web dashboard on this port
        #[arg(long)]
        web_port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    init_tracing(&cli.command, &config)?;

    match cli.command {
        Commands::Github {
            stale_weeks,
            status,
            merged_only,
        } => run_github(&config, stale_weeks, status, merged_only).await,
        Commands::Merged => run_github(&config, None, None, true).await,
        Commands::Questions => {
            let db = open_database(&config).await?;
            standup::cli::Cli::new(&db).run_questions().await?;
            Ok(())
        }
        Commands::Morning => {
            let db = open_database(&config).await?;
            standup::cli::Cli::new(&db).ask_morning_question().await?;
            Ok(())
        }
        Commands::List { category } => {
            let db = open_database(&config).await?;
            standup::cli::Cli::new(&db)
                .list_entries(&mut std::io::stdout(), &category)
                .await?;
            Ok(())
        }
        Commands::Web { port, dev } => {
            let port = port.unwrap_or(config.server_port);
            let mut dashboard = Dashboard::new(config.clone(), Arc::new(GitHubClient::new()));
            if dev {
                dashboard = dashboard.with_dev_mode();
            }
            dashboard.serve(port).await?;
            Ok(())
        }
        Commands::Daemon { web_port } => run_daemon(config, web_port).await,
    }
}

async fn run_github(
    config: &AppConfig,
    stale_weeks: Option<i64>,
    status: Option<String>,
    merged_only: bool,
) -> anyhow::Result<()> {
    if config.username.is_empty() {
        return Err(StandupError::ConfigError("GITHUB_USERNAME is not set".to_string()).into());
    }

    let mut request = AggregationRequest::from_config(config);
    if let Some(weeks) = stale_weeks {
        request.stale_threshold = chrono::Duration::weeks(weeks);
    }
    if status.is_some() {
        request.status_filter = status;
    }

    let aggregator = Aggregator::new(Arc::new(GitHubClient::new()));
    let summary = aggregator.aggregate(&request).await?;

    let view = ReportView {
        username: config.username.clone(),
        board_configured: config.project_board.is_some(),
        stale_weeks: stale_weeks.unwrap_or(config.stale_weeks),
        merge_window_hours: config.merge_window_hours,
        merged_only,
        now: chrono::Utc::now(),
    };
    print!("{}", render_github_report(&summary, &view));
    Ok(())
}

async fn run_daemon(config: AppConfig, web_port: Option<u16>) -> anyhow::Result<()> {
    info!("starting standup daemon");

    let db = Arc::new(open_database(&config).await?);
    let scheduler = Scheduler::new(db, Arc::new(DesktopNotifier));
    tokio::spawn(async move { scheduler.run().await });
    info!("scheduler started");

    if let Some(port) = web_port {
        let dashboard = Dashboard::new(config.clone(), Arc::new(GitHubClient::new()));
        tokio::spawn(async move {
            if let Err(e) = dashboard.serve(port).await {
                error!(error = %e, "web server stopped");
            }
        });
    }

    println!("Standup assistant is now running in the background.");
    println!("Logs are stored at: {}", config.log_path().display());
    if let Some(port) = web_port {
        println!("\nWeb UI available at: http://localhost:{}", port);
    }
    println!("\nScheduled times:");
    println!("  7:45 AM - Daily summary (run `standup morning` to set a focus)");
    println!("  1:00 PM - Daily check-in (run `standup questions` to respond)");
    println!("\nPress Ctrl+C to stop the daemon.");

    tokio::signal::ctrl_c().await?;
    info!("shutting down standup daemon");
    println!("\nStandup assistant stopped.");
    Ok(())
}

async fn open_database(config: &AppConfig) -> Result<Database, StandupError> {
    let db = Database::new(&config.database_path).await?;
    info!("database ready at {}", config.database_path);
    Ok(db)
}

/// Daemon mode appends to the log file under the state dir; everything
/// else logs to stderr.
fn init_tracing(command: &Commands, config: &AppConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "standup=info,tower_http=info".into());

    if matches!(command, Commands::Daemon { .. }) {
        std::fs::create_dir_all(&config.state_dir)?;
        let file = std::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(config.log_path())?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}
