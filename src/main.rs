use anyhow::Result;
use clap::Parser;

use gitver::calculate::CalculateTool;
use gitver::config;
use gitver::git::Git2Repository;
use gitver::output::{self, OutputFormat};

#[derive(clap::Parser)]
#[command(
    name = "gitver",
    about = "Calculate a deterministic semantic version from git history"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Calculate for a specific branch instead of HEAD")]
    branch: Option<String>,

    #[arg(long, help = "Skip the version cache entirely")]
    no_cache: bool,

    #[arg(long, help = "Print a single variable instead of the full set")]
    show_variable: Option<String>,

    #[arg(short, long, value_enum, default_value_t, help = "Output format")]
    format: OutputFormat,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.version {
        println!("gitver {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration
    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            output::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    // Discover the repository from the working directory
    let repo = match Git2Repository::open(".") {
        Ok(repo) => repo,
        Err(e) => {
            output::display_error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };

    let tool = CalculateTool::new(&repo, &config, args.no_cache);
    let variables = match tool.calculate_version_variables(args.branch.as_deref()) {
        Ok(variables) => variables,
        Err(e) => {
            output::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let result = match args.show_variable.as_deref() {
        Some(name) => output::display_single_variable(&variables, name),
        None => output::display_variables(&variables, args.format),
    };

    if let Err(e) = result {
        output::display_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
