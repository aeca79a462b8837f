// gearguard-admin/src/main.rs

use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::utils::{connect, require_session, session_file_path};
use admin_cli::*;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Parser)]
#[command(name = "gearguard-admin")]
#[command(about = "Command line access to Gear Guard maintenance data")]
#[command(version)]
struct Cli {
    /// Show extended version information
    #[arg(long, action = clap::ArgAction::SetTrue)]
    version_info: bool,

    /// Print connection details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Sign in, sign out, show the current user")]
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    #[command(about = "Maintenance request management")]
    Request {
        #[command(subcommand)]
        action: RequestAction,
    },
    #[command(about = "Show the maintenance calendar for a month")]
    Calendar(CalendarArgs),
    #[command(about = "Equipment roster and reports")]
    Equipment {
        #[command(subcommand)]
        action: EquipmentAction,
    },
    #[command(about = "Maintenance teams")]
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },
    #[command(about = "Work centers")]
    WorkCenter {
        #[command(subcommand)]
        action: WorkCenterAction,
    },
}

async fn run(command: Commands, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let backend = connect(verbose)?;
    let session_file = session_file_path()?;
    if verbose {
        eprintln!("Session file: {}", session_file.display());
    }

    if let Commands::Session { action } = command {
        return handle_session_command(&backend, &session_file, action).await;
    }

    let session = require_session(&backend, &session_file).await?;
    let store = backend.store.as_ref();
    let bearer = session.bearer();
    match command {
        Commands::Session { .. } => Ok(()),
        Commands::Request { action } => handle_request_command(store, &session, action).await,
        Commands::Calendar(args) => handle_calendar_command(store, &bearer, args).await,
        Commands::Equipment { action } => handle_equipment_command(store, &bearer, action).await,
        Commands::Team { action } => handle_team_command(store, &bearer, action).await,
        Commands::WorkCenter { action } => handle_work_center_command(store, &bearer, action).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.version_info {
        println!("gearguard-admin {}", built_info::PKG_VERSION);
        println!("Built: {}", built_info::BUILT_TIME_UTC);
        if let Some(commit) = built_info::GIT_COMMIT_HASH {
            println!("Git commit: {}", commit);
        }
        return;
    }

    let Some(command) = cli.command else {
        eprintln!("No command given. Run `gearguard-admin --help` for usage.");
        std::process::exit(2);
    };

    if let Err(e) = run(command, cli.verbose).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
