mod config;
mod confirm;
mod entity_cmds;
mod export_cmd;
mod resolve;
mod schedule_cmds;
mod serve_cmd;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};

use roster_core::generate::{GeminiClient, NaiveGenerator};
use roster_core::{RosterGenerator, ScheduleFilter, Session};
use roster_store::{FileStore, KeyValueStore};

use config::{Overrides, RosterConfig};

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Onboarding roster planner")]
struct Cli {
    /// Data directory for persisted records (overrides ROSTER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a roster config file (`--data-dir` is saved as storage.data_dir)
    Init {
        /// Gemini API key
        #[arg(long)]
        api_key: Option<String>,
        /// Gemini model name
        #[arg(long)]
        model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Manage new starters
    Starter {
        #[command(subcommand)]
        command: StarterCommands,
    },
    /// Manage mentors
    Mentor {
        #[command(subcommand)]
        command: MentorCommands,
    },
    /// Manage training modules
    Module {
        #[command(subcommand)]
        command: ModuleCommands,
    },
    /// Generate a roster, replacing the current schedule
    Generate {
        #[command(flatten)]
        args: GenerateArgs,
    },
    /// Show the schedule, optionally filtered
    Show {
        /// Only sessions for this trainee (exact name)
        #[arg(long)]
        starter: Option<String>,
        /// Only sessions with this mentor (exact name)
        #[arg(long, conflicts_with = "starter")]
        mentor: Option<String>,
        /// Emit grouped JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Change the day, time, or location of one session
    Edit {
        /// Session ID or unique ID prefix
        session: String,
        #[arg(long)]
        day: Option<String>,
        #[arg(long)]
        time: Option<String>,
        /// New location; pass an empty string to clear it
        #[arg(long)]
        location: Option<String>,
    },
    /// Delete one session
    Delete {
        /// Session ID or unique ID prefix
        session: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Export the schedule as CSV
    Export {
        /// Output file (default: training_roster.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Write CSV to stdout instead of a file
        #[arg(long, conflicts_with = "output")]
        stdout: bool,
    },
    /// Print the roster grouped by day
    Print {
        #[arg(long)]
        starter: Option<String>,
        #[arg(long, conflicts_with = "starter")]
        mentor: Option<String>,
        /// Render a standalone HTML page
        #[arg(long)]
        html: bool,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Restore the default inputs and discard the schedule
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Launch interactive TUI dashboard
    Dashboard {
        #[command(flatten)]
        args: GenerateArgs,
    },
    /// Serve a read-only web view of the roster
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum StarterCommands {
    /// Add a starter
    Add {
        name: String,
        /// Job role (default: "Trainee")
        #[arg(long)]
        role: Option<String>,
    },
    /// List starters
    List,
    /// Remove a starter by ID or name
    Remove { starter: String },
    /// Remove every starter
    Clear {
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum MentorCommands {
    /// Add a mentor
    Add {
        name: String,
        /// Comma-separated expertise tags
        #[arg(long)]
        expertise: Option<String>,
    },
    /// List mentors
    List,
    /// Remove a mentor by ID or name
    Remove { mentor: String },
    /// Remove every mentor
    Clear {
        #[arg(long, short)]
        yes: bool,
    },
    /// Replace a mentor's expertise tags
    SetExpertise {
        mentor: String,
        /// Comma-separated tags; empty for none
        expertise: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    /// Add a training module
    Add {
        name: String,
        /// Duration label (default: "1 hour")
        #[arg(long)]
        duration: Option<String>,
        /// Expertise a mentor needs to teach it
        #[arg(long)]
        requires: Option<String>,
    },
    /// List modules
    List,
    /// Remove a module by ID or name
    Remove { module: String },
    /// Remove every module
    Clear {
        #[arg(long, short)]
        yes: bool,
    },
    /// Change a module's duration label
    SetDuration { module: String, duration: String },
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// First day of the roster week (default: today)
    #[arg(long)]
    start_date: Option<NaiveDate>,
    /// Gemini API key (overrides ROSTER_API_KEY)
    #[arg(long)]
    api_key: Option<String>,
    /// Gemini model (overrides ROSTER_MODEL)
    #[arg(long)]
    model: Option<String>,
    /// Use the built-in round-robin planner instead of Gemini
    #[arg(long)]
    offline: bool,
}

impl GenerateArgs {
    fn start_date(&self) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

/// Execute the `roster init` command: write the config file.
fn cmd_init(
    api_key: Option<String>,
    model: Option<String>,
    store_dir: Option<PathBuf>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        gemini: config::GeminiSection {
            api_key: api_key.clone(),
            model: model.clone(),
            base_url: None,
        },
        storage: config::StorageSection {
            data_dir: store_dir.clone(),
        },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    match api_key.as_deref() {
        Some(key) => println!("  gemini.api_key = {}", mask_key(key)),
        None => println!("  gemini.api_key = (unset; set {} instead)", config::API_KEY_ENV),
    }
    if let Some(model) = &model {
        println!("  gemini.model = {model}");
    }
    if let Some(dir) = &store_dir {
        println!("  storage.data_dir = {}", dir.display());
    }
    println!();
    println!("Next: run `roster generate` to build a roster from the default inputs.");

    Ok(())
}

/// Keep the first and last four characters of a key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn open_store(resolved: &RosterConfig) -> Arc<dyn KeyValueStore> {
    tracing::debug!(data_dir = %resolved.store_config.data_dir().display(), "opening store");
    Arc::new(FileStore::new(resolved.store_config.clone()))
}

fn build_generator(
    resolved: &RosterConfig,
    offline: bool,
) -> anyhow::Result<Arc<dyn RosterGenerator>> {
    if offline {
        return Ok(Arc::new(NaiveGenerator));
    }
    Ok(Arc::new(GeminiClient::new(resolved.gemini_config()?)))
}

fn resolve_config(
    data_dir: Option<PathBuf>,
    args: Option<&GenerateArgs>,
) -> anyhow::Result<RosterConfig> {
    let overrides = Overrides {
        data_dir,
        api_key: args.and_then(|a| a.api_key.clone()),
        model: args.and_then(|a| a.model.clone()),
    };
    RosterConfig::resolve(&overrides).context("failed to load roster configuration")
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if matches!(cli.command, Commands::Dashboard { .. }) {
        "warn"
    } else {
        "info"
    };
    init_tracing(default_level);

    match cli.command {
        Commands::Init {
            api_key,
            model,
            force,
        } => {
            cmd_init(api_key, model, cli.data_dir, force)?;
        }
        Commands::Starter { command } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let mut session = Session::open(open_store(&resolved));
            entity_cmds::run_starter_command(command, &mut session)?;
        }
        Commands::Mentor { command } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let mut session = Session::open(open_store(&resolved));
            entity_cmds::run_mentor_command(command, &mut session)?;
        }
        Commands::Module { command } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let mut session = Session::open(open_store(&resolved));
            entity_cmds::run_module_command(command, &mut session)?;
        }
        Commands::Generate { args } => {
            let resolved = resolve_config(cli.data_dir, Some(&args))?;
            let generator = build_generator(&resolved, args.offline)?;
            let mut session = Session::open(open_store(&resolved));
            schedule_cmds::run_generate(&mut session, generator.as_ref(), args.start_date()).await?;
        }
        Commands::Show {
            starter,
            mentor,
            json,
        } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let session = Session::open(open_store(&resolved));
            let filter = ScheduleFilter::from_options(starter.as_deref(), mentor.as_deref());
            schedule_cmds::run_show(&session, &filter, json)?;
        }
        Commands::Edit {
            session: reference,
            day,
            time,
            location,
        } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let mut session = Session::open(open_store(&resolved));
            let fields = schedule_cmds::EditFields {
                day,
                time,
                location,
            };
            schedule_cmds::run_edit(&mut session, &reference, fields)?;
        }
        Commands::Delete {
            session: reference,
            yes,
        } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let mut session = Session::open(open_store(&resolved));
            schedule_cmds::run_delete(&mut session, &reference, yes)?;
        }
        Commands::Export { output, stdout } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let session = Session::open(open_store(&resolved));
            export_cmd::run_export(&session, output.as_deref(), stdout)?;
        }
        Commands::Print {
            starter,
            mentor,
            html,
            output,
        } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let session = Session::open(open_store(&resolved));
            let filter = ScheduleFilter::from_options(starter.as_deref(), mentor.as_deref());
            export_cmd::run_print(&session, &filter, html, output.as_deref())?;
        }
        Commands::Reset { yes } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            let mut session = Session::open(open_store(&resolved));
            schedule_cmds::run_reset(&mut session, yes)?;
        }
        Commands::Dashboard { args } => {
            let resolved = resolve_config(cli.data_dir, Some(&args))?;
            // The dashboard opens without a key; generation reports it.
            let generator = match build_generator(&resolved, args.offline) {
                Ok(g) => Some(g),
                Err(e) => {
                    tracing::warn!(error = %e, "roster generation unavailable");
                    None
                }
            };
            let session = Session::open(open_store(&resolved));
            let app = tui::app::App::new(session, generator, args.start_date());
            tui::run_dashboard(app).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = resolve_config(cli.data_dir, None)?;
            serve_cmd::run_serve(open_store(&resolved), &bind, port).await?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "roster", &mut std::io::stdout());
        }
    }

    Ok(())
}
