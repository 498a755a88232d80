mod access_cmds;
mod app;
mod catalog_cmd;
mod chat_cmd;
mod config;
mod export_cmd;
mod generate_cmd;
mod plan_cmds;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};

use giaoan_store::models::{ActivityTab, PlanFormat};

use config::{GiaoanConfig, Overrides};

#[derive(Parser)]
#[command(name = "giaoan", about = "Lesson-plan generator for Vietnamese preschool teachers")]
struct Cli {
    /// Gemini API key (overrides GIAOAN_API_KEY / GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Gemini model name (overrides GIAOAN_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Directory for saved plans (overrides GIAOAN_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a giaoan config file
    Init {
        /// URL of a `username,password` CSV; enables the login gate
        #[arg(long)]
        credentials_url: Option<String>,
        /// Default teacher name for new plans
        #[arg(long)]
        teacher: Option<String>,
        /// Default school name for new plans
        #[arg(long)]
        school: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Log in against the configured credential list
    Login {
        username: String,
        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the recorded login
    Logout,
    /// Manage the stored Gemini API key
    ApiKey {
        #[command(subcommand)]
        command: ApiKeyCommands,
    },
    /// List the activity types and age groups offered by the form
    Catalog,
    /// Generate and save a new lesson plan
    Generate(GenerateArgs),
    /// Ask for changes to a saved plan
    Chat {
        /// Requested change, in Vietnamese
        message: String,
        /// Plan to refine (defaults to the most recent)
        #[arg(long)]
        plan: Option<i64>,
        /// Section to print after refining (all when omitted)
        #[arg(long)]
        tab: Option<ActivityTab>,
    },
    /// Saved plan management
    Plans {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Write a saved plan as a Word-compatible document
    Export {
        /// Plan to export (defaults to the most recent)
        #[arg(long)]
        plan: Option<i64>,
        /// Output file path (defaults to a name derived from the subject)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Serve the workspace over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Theme ("Chủ đề")
    #[arg(long)]
    pub topic: Option<String>,
    /// Lesson title ("Đề tài")
    #[arg(long)]
    pub subject: Option<String>,
    /// Developmental area ("Lĩnh vực"); see `giaoan catalog`
    #[arg(long)]
    pub activity_type: Option<String>,
    /// Age group; see `giaoan catalog`
    #[arg(long)]
    pub age_group: Option<String>,
    #[arg(long)]
    pub duration: Option<String>,
    /// YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub preparation_date: Option<String>,
    /// YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub teaching_date: Option<String>,
    #[arg(long)]
    pub teacher: Option<String>,
    #[arg(long)]
    pub school: Option<String>,
    /// Layout of the activity section: no-columns or with-columns
    #[arg(long)]
    pub format: Option<PlanFormat>,
    /// Section to print (all when omitted)
    #[arg(long)]
    pub tab: Option<ActivityTab>,
    /// Print the generated sections as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum ApiKeyCommands {
    /// Save an API key in the data directory
    Set {
        /// Key to store (read from stdin when omitted)
        key: Option<String>,
    },
    /// Remove the stored API key
    Clear,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// List saved plans, oldest first
    List,
    /// Show the request behind a saved plan
    Show {
        id: i64,
        /// Print the whole record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a saved plan
    Load {
        id: i64,
        /// Section to print (all when omitted)
        #[arg(long)]
        tab: Option<ActivityTab>,
    },
    /// Delete a saved plan
    Delete { id: i64 },
}

/// Execute the `giaoan init` command: write config file.
fn cmd_init(
    credentials_url: Option<String>,
    teacher: Option<String>,
    school: Option<String>,
    force: bool,
) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut cfg = config::ConfigFile::default();
    cfg.access.credentials_url = credentials_url;
    cfg.teacher.name = teacher;
    cfg.teacher.school = school;
    config::save_config_to(&path, &cfg)?;

    println!("Config written to {}", path.display());
    match &cfg.access.credentials_url {
        Some(url) => println!("  access.credentials_url = {url}"),
        None => println!("  login gate disabled (no credentials_url)"),
    }
    println!();
    println!("Next: run `giaoan api-key set` or export GIAOAN_API_KEY.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = Overrides {
        api_key: cli.api_key,
        model: cli.model,
        data_dir: cli.data_dir,
    };

    match cli.command {
        Commands::Init {
            credentials_url,
            teacher,
            school,
            force,
        } => {
            cmd_init(credentials_url, teacher, school, force)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "giaoan", &mut std::io::stdout());
        }
        Commands::Catalog => catalog_cmd::run_catalog(),
        Commands::Login { username, password } => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            access_cmds::run_login(&resolved, &username, password).await?;
        }
        Commands::Logout => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            access_cmds::run_logout(&resolved)?;
        }
        Commands::ApiKey { command } => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            access_cmds::run_api_key_command(command, &resolved)?;
        }
        Commands::Generate(args) => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            generate_cmd::run_generate(&resolved, args).await?;
        }
        Commands::Chat { message, plan, tab } => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            chat_cmd::run_chat(&resolved, &message, plan, tab).await?;
        }
        Commands::Plans { command } => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            plan_cmds::run_plan_command(command, &resolved)?;
        }
        Commands::Export { plan, output } => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            export_cmd::run_export(&resolved, plan, output.as_deref())?;
        }
        Commands::Serve { bind, port } => {
            let resolved = GiaoanConfig::resolve(&overrides)?;
            serve_cmd::run_serve(&resolved, &bind, port).await?;
        }
    }

    Ok(())
}
