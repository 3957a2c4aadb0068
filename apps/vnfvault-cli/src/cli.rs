use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use vnfvault_config::{load_policy, parse_policy, resolve_targets, DEFAULT_POLICY_DOCUMENT};
use vnfvault_core::controller::Controller;
use vnfvault_core::fault::{FaultInjector, NeverFail, SeededFaultInjector, DEFAULT_FAULT_PROBABILITY};
use vnfvault_core::planner::plan;
use vnfvault_core::progress::ProgressReporter;
use vnfvault_core::types::{BackupPolicy, ClusterTopology, Node, NodeRole};
use vnfvault_core::workflow::ClusterWorkflow;

use crate::pacing::ConsolePacer;
use crate::render;

/// Pacing tick used when wall-clock pacing is enabled.
const DEFAULT_TICK: Duration = Duration::from_millis(40);

#[derive(Debug, Parser)]
#[command(
    name = "vnfvault",
    about = "Simulated VNF backup/restore planner and controller (log-only)"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan a policy across its targets and drive the resources to completion
    Run(RunArgs),
    /// Print planned resources and action lists without running them
    Plan(PlanArgs),
    /// Run the phased node-oriented cluster workflow (switchover + restore)
    Cluster(ClusterArgs),
}

#[derive(Debug, Args, Clone)]
struct RunArgs {
    /// Policy document path; the embedded sample is used when omitted
    #[arg(long)]
    policy_file: Option<PathBuf>,
    /// Comma-separated targets, overriding any list in the document
    #[arg(long)]
    targets: Option<String>,
    /// Probability of a simulated host fault per target (0 disables)
    #[arg(long, default_value_t = 0.0)]
    fault_probability: f64,
    /// Seed for the fault draw
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Draw progress instantly instead of pacing it
    #[arg(long)]
    no_pacing: bool,
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Args, Clone)]
struct PlanArgs {
    /// Policy document path; the embedded sample is used when omitted
    #[arg(long)]
    policy_file: Option<PathBuf>,
    /// Comma-separated targets, overriding any list in the document
    #[arg(long)]
    targets: Option<String>,
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Args, Clone)]
struct ClusterArgs {
    /// Probability of the post-check host-down draw
    #[arg(long, default_value_t = DEFAULT_FAULT_PROBABILITY)]
    fault_probability: f64,
    /// Seed for the fault draw
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Draw progress instantly instead of pacing it
    #[arg(long)]
    no_pacing: bool,
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Command::Run(args)) => run_policy(args).await,
            Some(Command::Plan(args)) => print_plan(args),
            Some(Command::Cluster(args)) => run_cluster(args).await,
            None => run_policy(RunArgs::default_invocation()).await,
        }
    }
}

impl RunArgs {
    fn default_invocation() -> Self {
        Self {
            policy_file: None,
            targets: None,
            fault_probability: 0.0,
            seed: 0,
            no_pacing: false,
            verbose: false,
        }
    }
}

async fn run_policy(args: RunArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);
    let policy = effective_policy(args.policy_file.as_deref())?;
    let targets = resolve_targets(parse_target_list(args.targets.as_deref()).as_deref(), &policy);

    tracing::info!(policy = %policy.name, targets = ?targets, "starting simulated backup run");
    let mut output = plan(&policy, &targets, None).context("planning failed")?;

    let controller = Controller::new()
        .with_fault_injector(fault_injector(args.fault_probability, args.seed))
        .with_progress_reporter(pacer(args.no_pacing));
    let summary = controller.run(&mut output, None).await;

    for resource in &output.resources {
        println!("---");
        print!("{}", resource.to_yaml()?);
    }

    println!("\n{}", render::summary_table(&summary));
    tracing::info!("simulated backup run complete");
    Ok(())
}

fn print_plan(args: PlanArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);
    let policy = effective_policy(args.policy_file.as_deref())?;
    let targets = resolve_targets(parse_target_list(args.targets.as_deref()).as_deref(), &policy);

    let output = plan(&policy, &targets, None).context("planning failed")?;
    for resource in &output.resources {
        println!("---");
        print!("{}", resource.to_yaml()?);
        let actions = output.actions_for(resource.name());
        println!("# {} action(s):", actions.len());
        for (index, action) in actions.iter().enumerate() {
            println!("#   {}. {}", index + 1, action.describe());
        }
    }
    Ok(())
}

async fn run_cluster(args: ClusterArgs) -> anyhow::Result<()> {
    init_logging(args.verbose);
    let topology = demo_topology();

    println!("{}", render::topology_table(&topology));

    let workflow = ClusterWorkflow::new()
        .with_fault_injector(fault_injector(args.fault_probability, args.seed))
        .with_progress_reporter(pacer(args.no_pacing));
    let report = workflow.run(topology).await;

    println!("\n{}", render::cluster_summary(&report));
    Ok(())
}

fn effective_policy(path: Option<&std::path::Path>) -> anyhow::Result<BackupPolicy> {
    match path {
        Some(path) => load_policy(path)
            .with_context(|| format!("failed to load policy from {}", path.display())),
        None => {
            tracing::info!("no policy file supplied; using the embedded sample document");
            parse_policy(DEFAULT_POLICY_DOCUMENT).context("embedded policy document is invalid")
        }
    }
}

fn parse_target_list(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|csv| {
        csv.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn fault_injector(probability: f64, seed: u64) -> Arc<dyn FaultInjector> {
    if probability > 0.0 {
        Arc::new(SeededFaultInjector::new(seed, probability))
    } else {
        Arc::new(NeverFail)
    }
}

fn pacer(no_pacing: bool) -> Arc<dyn ProgressReporter> {
    if no_pacing {
        Arc::new(ConsolePacer::instant())
    } else {
        Arc::new(ConsolePacer::new(DEFAULT_TICK))
    }
}

/// The reference five-node cluster the `cluster` subcommand simulates.
fn demo_topology() -> ClusterTopology {
    let node = |id: &str, role| Node {
        id: id.to_string(),
        role,
    };
    ClusterTopology::new(vec![
        node("vnf-node-01", NodeRole::Active),
        node("vnf-node-02", NodeRole::Active),
        node("vnf-node-03", NodeRole::Standby),
        node("vnf-node-04", NodeRole::Standby),
        node("vnf-node-05", NodeRole::Active),
    ])
    .with_vms("vnf-node-01", vec!["vnf-a".to_string(), "vnf-b".to_string()])
    .with_vms("vnf-node-02", vec!["vnf-c".to_string()])
    .with_vms("vnf-node-03", vec!["vnf-d".to_string()])
    .with_vms("vnf-node-04", vec!["vnf-e".to_string(), "vnf-f".to_string()])
    .with_vms("vnf-node-05", vec!["vnf-g".to_string()])
    .with_vm_size("vnf-a", 1200)
    .with_vm_size("vnf-b", 800)
    .with_vm_size("vnf-c", 600)
    .with_vm_size("vnf-d", 400)
    .with_vm_size("vnf-e", 200)
    .with_vm_size("vnf-f", 300)
    .with_vm_size("vnf-g", 900)
}

fn init_logging(verbose: bool) {
    if env::var("RUST_LOG").is_err() {
        let level = if verbose { "debug" } else { "info" };
        env::set_var("RUST_LOG", level);
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target_list_trims_and_drops_empties() {
        assert_eq!(
            parse_target_list(Some("vim-a, vim-b,,")),
            Some(vec!["vim-a".to_string(), "vim-b".to_string()])
        );
        assert_eq!(parse_target_list(None), None);
    }

    #[test]
    fn test_demo_topology_matches_reference_grouping() {
        let topology = demo_topology();
        assert_eq!(
            topology.active_nodes(),
            vec!["vnf-node-01", "vnf-node-02", "vnf-node-05"]
        );
        assert_eq!(topology.standby_nodes(), vec!["vnf-node-03", "vnf-node-04"]);
        assert_eq!(topology.vm_size("vnf-g"), Some(900));
    }

    #[test]
    fn test_cli_parses_cluster_flags() {
        let cli = Cli::parse_from([
            "vnfvault",
            "cluster",
            "--fault-probability",
            "1.0",
            "--seed",
            "7",
            "--no-pacing",
        ]);
        match cli.command {
            Some(Command::Cluster(args)) => {
                assert_eq!(args.fault_probability, 1.0);
                assert_eq!(args.seed, 7);
                assert!(args.no_pacing);
            }
            other => panic!("expected cluster command, got {:?}", other),
        }
    }
}
