//! seddy CLI - DAG workflow decider for Amazon Simple Workflow Service

use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::sync::watch;

use seddy::config;
use seddy::decider::Decider;
use seddy::error::{FixSuggestion, SeddyError};
use seddy::launcher;
use seddy::registrar;
use seddy::spec;
use seddy::swf::client::HttpSwfClient;

#[derive(Parser)]
#[command(name = "seddy")]
#[command(about = "DAG workflow decider for Amazon Simple Workflow Service")]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease verbosity
    #[arg(short = 'q', long, action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a spec and run the Decider Loop until Ctrl-C.
    Decider {
        /// Path to a workflow spec file (JSON or YAML).
        spec_file: String,
        #[arg(long)]
        domain: String,
        #[arg(long)]
        task_list: String,
        /// Override the generated decider identity.
        #[arg(long)]
        identity: Option<String>,
    },

    /// Register (or deprecate) every workflow/activity type in a spec.
    Register {
        spec_file: String,
        #[arg(long)]
        domain: String,
        /// Deprecate instead of registering.
        #[arg(long)]
        deprecate: bool,
    },

    /// Start one execution of a workflow declared in a spec.
    Execute {
        spec_file: String,
        workflow_name: String,
        workflow_version: String,
        #[arg(long)]
        domain: String,
        /// JSON-encoded workflow input.
        #[arg(long)]
        input: String,
        #[arg(long)]
        workflow_id: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbosity = cli.verbose as i8 - cli.quiet as i8;
    config::init_tracing(verbosity);

    let result = match cli.command {
        Commands::Decider { spec_file, domain, task_list, identity } => {
            run_decider(&spec_file, domain, task_list, identity).await
        }
        Commands::Register { spec_file, domain, deprecate } => {
            run_register(&spec_file, domain, deprecate).await
        }
        Commands::Execute { spec_file, workflow_name, workflow_version, domain, input, workflow_id } => {
            run_execute(&spec_file, workflow_name, workflow_version, domain, input, workflow_id).await
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err}", "error:".red().bold());
        if let Some(hint) = err.fix_suggestion() {
            eprintln!("  {} {hint}", "hint:".yellow());
        }
        std::process::exit(1);
    }
}

async fn run_decider(
    spec_file: &str,
    domain: String,
    task_list: String,
    identity_override: Option<String>,
) -> Result<(), SeddyError> {
    let workflows = spec::load_file(spec_file)?;
    let identity = config::identity(identity_override);
    let client = Arc::new(HttpSwfClient::new(config::swf_endpoint()));
    let decider = Decider::new(client, domain, task_list, identity, workflows);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        let _ = shutdown_tx.send(true);
    });

    decider.run(shutdown_rx).await?;
    println!("Quitting due to keyboard-interrupt");
    Ok(())
}

async fn run_register(spec_file: &str, domain: String, deprecate: bool) -> Result<(), SeddyError> {
    let workflows = spec::load_file(spec_file)?;
    let client = HttpSwfClient::new(config::swf_endpoint());

    if deprecate {
        for graph in workflows.iter() {
            registrar::deprecate(
                &client,
                &domain,
                seddy::spec::TypeId { name: graph.name.clone(), version: graph.version.clone() },
            )
            .await?;
        }
    } else {
        registrar::register_all(&client, &domain, &workflows).await?;
    }
    Ok(())
}

async fn run_execute(
    spec_file: &str,
    workflow_name: String,
    workflow_version: String,
    domain: String,
    input: String,
    workflow_id: Option<String>,
) -> Result<(), SeddyError> {
    let workflows = spec::load_file(spec_file)?;
    let graph = workflows
        .get(&workflow_name, &workflow_version)
        .ok_or_else(|| SeddyError::UnsupportedWorkflow {
            name: workflow_name.clone(),
            version: workflow_version.clone(),
        })?;

    let input: serde_json::Value = serde_json::from_str(&input)
        .map_err(|e| SeddyError::Other(format!("--input is not valid JSON: {e}")))?;

    let client = HttpSwfClient::new(config::swf_endpoint());
    let run_id = launcher::start(
        &client,
        &domain,
        seddy::spec::TypeId { name: graph.name.clone(), version: graph.version.clone() },
        input,
        workflow_id,
        None,
    )
    .await?;

    println!("started execution, runId={run_id}");
    Ok(())
}
