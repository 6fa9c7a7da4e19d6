mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    activity::ActivitySubcommand, config::ConfigSubcommand, vtt::VttSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "subline",
    about = "Subtitle translation workflow: WebVTT segments and activity assignment",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .subline/)
    #[arg(long, global = true, env = "SUBLINE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .subline/ with a default config
    Init,

    /// Parse, build, and translate WebVTT files
    Vtt {
        #[command(subcommand)]
        subcommand: VttSubcommand,
    },

    /// Import and list activities
    Activity {
        #[command(subcommand)]
        subcommand: ActivitySubcommand,
    },

    /// Assign unassigned activities in a date range to users
    Assign {
        /// Comma-separated user ids (e.g. 1,2,3)
        #[arg(long, value_delimiter = ',', required = true)]
        users: Vec<i64>,
        /// First scheduled date (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last scheduled date (YYYY-MM-DD)
        #[arg(long)]
        to: String,
        /// Maximum number of activities to hand out
        #[arg(long)]
        count: String,
    },

    /// List a user's assignments, or update one with --item/--status
    Assignments {
        user_id: i64,
        /// Activity id to update
        #[arg(long, requires = "status")]
        item: Option<i64>,
        /// New status: assigned, working, completed
        #[arg(long, requires = "item")]
        status: Option<String>,
    },

    /// Validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Run the HTTP API
    Serve {
        /// Port to listen on (default: server.port from config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, cli.json),
        Commands::Vtt { subcommand } => cmd::vtt::run(subcommand, cli.json),
        Commands::Activity { subcommand } => cmd::activity::run(&root, subcommand, cli.json),
        Commands::Assign {
            users,
            from,
            to,
            count,
        } => cmd::assign::run(&root, users, &from, &to, &count, cli.json),
        Commands::Assignments {
            user_id,
            item,
            status,
        } => cmd::assignments::run(&root, user_id, item.zip(status), cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Serve { port } => cmd::serve::run(&root, port),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
