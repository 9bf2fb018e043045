// ABOUTME: Entry point for the caravel CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;

use caravel::config::{self, Config};
use caravel::deploy::Orchestrator;
use caravel::error::{Error, Result};
use caravel::platform::{HttpPlatform, PlatformOps};
use caravel::prompt::StdinPrompt;
use clap::Parser;
use cli::{Cli, Commands};
use std::collections::BTreeMap;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { address, force } => {
            let cwd = env::current_dir()?;
            let path = config::init_config(&cwd, address.as_deref(), force)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
        Commands::List => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            let platform = login(&config).await?;

            let mut entries = platform.list_one_click_templates().await?;
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            for entry in &entries {
                println!("{}", entry.name);
            }
            Ok(())
        }
        Commands::Deploy {
            template,
            namespace,
            vars,
            interactive,
        } => {
            let cwd = env::current_dir()?;
            let config = Config::discover(&cwd)?;
            let user_vars = parse_vars(&vars)?;
            let platform = login(&config).await?;

            println!("  → Deploying one-click template {template}...");

            let stdin_prompt = StdinPrompt;
            let mut orchestrator =
                Orchestrator::new(&platform).with_poll_settings(config.poll_settings());
            if interactive {
                orchestrator = orchestrator.with_prompt(&stdin_prompt);
            }

            let state = orchestrator
                .deploy_one_click(&template, &namespace, &user_vars)
                .await?;

            for name in state.deployed() {
                println!("  ✓ {name}");
            }
            println!("Deployment complete!");
            Ok(())
        }
    }
}

async fn login(config: &Config) -> Result<HttpPlatform> {
    let password = config.password()?;
    let base_url = config.base_url();
    let platform = HttpPlatform::login(config.connect_settings(&base_url), &password).await?;
    Ok(platform)
}

/// Parse repeated `--var ID=VALUE` assignments.
fn parse_vars(vars: &[String]) -> Result<BTreeMap<String, String>> {
    let mut parsed = BTreeMap::new();
    for assignment in vars {
        let (id, value) = assignment
            .split_once('=')
            .ok_or_else(|| Error::InvalidVarAssignment(assignment.clone()))?;
        if id.is_empty() {
            return Err(Error::InvalidVarAssignment(assignment.clone()));
        }
        parsed.insert(id.to_string(), value.to_string());
    }
    Ok(parsed)
}
