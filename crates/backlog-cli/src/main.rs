mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{linear::LinearSubcommand, spec::SpecSubcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "backlog",
    about = "Feature backlog tracking: JSON backlog, markdown feature docs, tracker migration",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .feature-tracking/ or .git/)
    #[arg(long, global = true, env = "BACKLOG_ROOT")]
    project_root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the backlog file and the default feature template
    Init,

    /// Create a new feature
    Create {
        /// Feature name
        name: String,
        /// Feature description
        description: String,
        /// critical, high, medium or low
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Epic ID this feature belongs to
        #[arg(long)]
        epic: Option<String>,
        /// Estimated hours
        #[arg(long, default_value_t = backlog_core::feature::DEFAULT_ESTIMATED_HOURS)]
        hours: u32,
        /// Feature tags
        #[arg(long, num_args = 0..)]
        tags: Vec<String>,
        /// Business value: high, medium or low
        #[arg(long, default_value = "medium")]
        value: String,
        /// Linear issue ID (e.g. LIN-123)
        #[arg(long)]
        linear: Option<String>,
    },

    /// Move a backlog feature to a different status
    Move {
        /// Feature ID to move
        feature_id: String,
        /// backlog, planning, active, review, testing, complete or deprecated
        status: String,
    },

    /// List backlog features
    List {
        /// Filter by status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one feature from the backlog or the completed collection
    Show { feature_id: String },

    /// Show backlog metrics
    Metrics,

    /// Migrate the backlog to the Linear issue tracker
    Linear {
        #[command(subcommand)]
        subcommand: LinearSubcommand,
    },

    /// Create features from the `specify` spec-generation tool
    Spec {
        #[command(subcommand)]
        subcommand: SpecSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.project_root.as_deref());
    tracing::debug!(root = %root.display(), "resolved project root");

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Create {
            name,
            description,
            priority,
            epic,
            hours,
            tags,
            value,
            linear,
        } => cmd::feature::create(
            &root,
            cmd::feature::CreateArgs {
                name,
                description,
                priority,
                epic,
                hours,
                tags,
                value,
                linear,
            },
            cli.json,
        ),
        Commands::Move { feature_id, status } => {
            cmd::feature::move_to(&root, &feature_id, &status, cli.json)
        }
        Commands::List { status } => cmd::feature::list(&root, status.as_deref(), cli.json),
        Commands::Show { feature_id } => cmd::feature::show(&root, &feature_id, cli.json),
        Commands::Metrics => cmd::feature::metrics(&root, cli.json),
        Commands::Linear { subcommand } => cmd::linear::run(&root, subcommand, cli.json),
        Commands::Spec { subcommand } => cmd::spec::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
