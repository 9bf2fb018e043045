// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "caravel")]
#[command(about = "One-click application deployment for CapRover-compatible platforms")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new caravel.yml configuration file
    Init {
        /// Platform dashboard address, e.g. captain.apps.example.com
        #[arg(short, long)]
        address: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// List one-click templates available on the platform
    List,

    /// Deploy a one-click template
    Deploy {
        /// Template name from the platform catalog
        template: String,

        /// Prefix for the created application names
        #[arg(short, long)]
        namespace: String,

        /// Template variable assignment, ID=VALUE (repeatable)
        #[arg(long = "var", value_name = "ID=VALUE")]
        vars: Vec<String>,

        /// Prompt on stdin for variables not covered by --var
        #[arg(short, long)]
        interactive: bool,
    },
}
