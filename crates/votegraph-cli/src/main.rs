use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use votegraph_core::{
    CommunitySummary, ConfigManager, EvaluationStats, LabelSet, LoggingConfig, PopulationSummary,
    ReportRecord, VoteGraphConfig,
};
use votegraph_graph::{
    analyze_coordination, build_report, detect_communities, evaluate, load_events, load_labels,
    load_posts, CommunityMap, CoordinationAnalysis, VotingGraph,
};

#[derive(Parser)]
#[command(name = "votegraph")]
#[command(about = "VoteGraph - Vote ring detection over upvote graphs", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty, table); defaults to the configured one
    #[arg(short, long, global = true)]
    output: Option<OutputFormat>,

    /// Explicit configuration file
    #[arg(long, global = true, env = "VOTEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
    Table,
}

impl OutputFormat {
    fn from_config(name: &str) -> Self {
        match name {
            "json" => OutputFormat::Json,
            "pretty" => OutputFormat::Pretty,
            _ => OutputFormat::Table,
        }
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Vote events file (JSON array, or JSON lines with a .jsonl extension)
    #[arg(long)]
    events: Option<PathBuf>,

    /// Finalized posts with their upvoters, as exported by the simulation
    #[arg(long)]
    posts: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every agent and report suspected coordination
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Ground-truth labels; enables precision/recall and group summaries
        #[arg(short, long)]
        labels: Option<PathBuf>,

        /// Only show the N highest-scoring agents
        #[arg(short, long)]
        top: Option<usize>,
    },

    /// Partition agents into mutual-vote communities
    Communities {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Precision, recall and F1 against ground-truth labels
    Evaluate {
        #[command(flatten)]
        input: InputArgs,

        /// Ground-truth labels
        #[arg(short, long)]
        labels: PathBuf,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination (defaults to ./.votegraph.toml)
        path: Option<PathBuf>,
    },
}

enum CommandOutput {
    Analysis {
        analysis: CoordinationAnalysis,
        top: Option<usize>,
    },
    Communities(CommunityMap),
    Evaluation(EvaluationStats),
    Message(serde_json::Value),
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "agent")]
    agent_id: String,
    upvoters: usize,
    #[tabled(rename = "given")]
    upvotes_given: usize,
    clustering: String,
    diversity: String,
    score: String,
    flagged: bool,
}

impl From<&ReportRecord> for ReportRow {
    fn from(r: &ReportRecord) -> Self {
        Self {
            agent_id: r.agent_id.clone(),
            upvoters: r.upvoters,
            upvotes_given: r.upvotes_given,
            clustering: format!("{:.3}", r.clustering_coefficient),
            diversity: format!("{:.3}", r.external_diversity_ratio),
            score: format!("{:.3}", r.coordination_score),
            flagged: r.flagged,
        }
    }
}

#[derive(Tabled)]
struct PopulationRow {
    label: String,
    members: usize,
    clustering: String,
    diversity: String,
    score: String,
    flagged: usize,
}

impl From<&PopulationSummary> for PopulationRow {
    fn from(p: &PopulationSummary) -> Self {
        Self {
            label: p.label.to_string(),
            members: p.members,
            clustering: format!("{:.3}", p.mean_clustering),
            diversity: format!("{:.3}", p.mean_diversity),
            score: format!("{:.3}", p.mean_score),
            flagged: p.flagged,
        }
    }
}

#[derive(Tabled)]
struct CompositionRow {
    community: usize,
    members: usize,
    honest: usize,
    colluding: usize,
    spammer: usize,
    unlabeled: usize,
}

impl From<&CommunitySummary> for CompositionRow {
    fn from(c: &CommunitySummary) -> Self {
        Self {
            community: c.community_id,
            members: c.members,
            honest: c.honest,
            colluding: c.colluding,
            spammer: c.spammer,
            unlabeled: c.unlabeled,
        }
    }
}

#[derive(Tabled)]
struct CommunityRow {
    community: usize,
    members: usize,
    sample: String,
}

#[derive(Serialize)]
struct CommunitiesResult {
    community_count: usize,
    sizes: Vec<usize>,
    communities: serde_json::Map<String, serde_json::Value>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(manager) => manager.config().clone(),
        Err(e) => exit_with_error(e),
    };

    init_tracing(&config.logging, cli.verbose);

    let format = cli
        .output
        .unwrap_or_else(|| OutputFormat::from_config(&config.output.format));

    match execute_command(&cli, &config) {
        Ok(output) => {
            print_output(format, &output)?;
            Ok(())
        }
        Err(e) => exit_with_error(e),
    }
}

fn exit_with_error(e: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), e);
    std::process::exit(1);
}

fn load_config(path: Option<&Path>) -> Result<ConfigManager> {
    match path {
        Some(path) => ConfigManager::from_path(path),
        None => ConfigManager::load(),
    }
    .context("Failed to load configuration")
}

fn init_tracing(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = if verbose {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    let registry = tracing_subscriber::registry().with(filter);
    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    match logging.format.as_str() {
        "json" => registry.with(layer.json()).init(),
        "compact" => registry.with(layer.compact()).init(),
        _ => registry.with(layer.pretty()).init(),
    }
}

fn execute_command(cli: &Cli, config: &VoteGraphConfig) -> Result<CommandOutput> {
    match &cli.command {
        Commands::Analyze { input, labels, top } => {
            let graph = load_graph(input)?;
            let labels = labels.as_deref().map(read_labels).transpose()?;
            let analysis = analyze_coordination(&graph, labels.as_ref())
                .context("Coordination analysis failed")?;

            Ok(CommandOutput::Analysis {
                analysis,
                top: top.or(config.output.top),
            })
        }

        Commands::Communities { input } => {
            let graph = load_graph(input)?;
            Ok(CommandOutput::Communities(detect_communities(&graph)))
        }

        Commands::Evaluate { input, labels } => {
            let graph = load_graph(input)?;
            let labels = read_labels(labels)?;
            let report = build_report(&graph);
            let stats = evaluate(&report, &labels).context("Evaluation failed")?;
            Ok(CommandOutput::Evaluation(stats))
        }

        Commands::InitConfig { path } => {
            let path = path
                .clone()
                .unwrap_or_else(|| PathBuf::from(".votegraph.toml"));
            ConfigManager::create_default_config(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            Ok(CommandOutput::Message(serde_json::json!({
                "config_path": path.display().to_string(),
                "status": "created",
            })))
        }
    }
}

fn load_graph(input: &InputArgs) -> Result<VotingGraph> {
    let graph = match (&input.events, &input.posts) {
        (Some(path), _) => {
            let events = load_events(path)
                .with_context(|| format!("Failed to read vote events from {}", path.display()))?;
            VotingGraph::from_events(events).context("Invalid vote event")
        }
        (None, Some(path)) => {
            let posts = load_posts(path)
                .with_context(|| format!("Failed to read posts from {}", path.display()))?;
            VotingGraph::from_posts(&posts).context("Invalid post upvote")
        }
        (None, None) => anyhow::bail!("either --events or --posts is required"),
    }?;

    info!(
        agents = graph.agent_count(),
        votes = graph.edge_count(),
        "Loaded voting graph"
    );
    Ok(graph)
}

fn read_labels(path: &Path) -> Result<LabelSet> {
    load_labels(path).with_context(|| format!("Failed to read labels from {}", path.display()))
}

fn communities_result(map: &CommunityMap) -> CommunitiesResult {
    let communities = map
        .iter()
        .map(|a| (a.agent_id.clone(), serde_json::Value::from(a.community_id)))
        .collect();
    CommunitiesResult {
        community_count: map.community_count(),
        sizes: map.sizes(),
        communities,
    }
}

fn visible_report(report: &[ReportRecord], top: Option<usize>) -> &[ReportRecord] {
    match top {
        Some(n) if n < report.len() => &report[..n],
        _ => report,
    }
}

fn print_output(format: OutputFormat, output: &CommandOutput) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(output)?)?),
        OutputFormat::Pretty => print_pretty(&to_json(output)?)?,
        OutputFormat::Table => print_table(output)?,
    }
    Ok(())
}

fn to_json(output: &CommandOutput) -> Result<serde_json::Value> {
    let value = match output {
        CommandOutput::Analysis { analysis, top } => {
            let mut value = serde_json::to_value(analysis)?;
            value["report"] = serde_json::to_value(visible_report(&analysis.report, *top))?;
            value["communities"] = serde_json::to_value(communities_result(&analysis.communities))?;
            value
        }
        CommandOutput::Communities(map) => serde_json::to_value(communities_result(map))?,
        CommandOutput::Evaluation(stats) => serde_json::to_value(stats)?,
        CommandOutput::Message(value) => value.clone(),
    };
    Ok(value)
}

fn print_pretty(value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Object(map) => {
            for (key, val) in map {
                let key_colored = key.cyan().bold();
                match val {
                    serde_json::Value::String(s) => {
                        println!("{}: {}", key_colored, s.green());
                    }
                    serde_json::Value::Number(n) => {
                        println!("{}: {}", key_colored, n.to_string().yellow());
                    }
                    serde_json::Value::Bool(b) => {
                        let val_colored = if *b { "true".red() } else { "false".green() };
                        println!("{}: {}", key_colored, val_colored);
                    }
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        println!("{}:", key_colored);
                        print_pretty(val)?;
                    }
                    serde_json::Value::Null => {
                        println!("{}: {}", key_colored, "null".dimmed());
                    }
                }
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("\n{}{}:", "Item ".cyan(), (i + 1).to_string().yellow());
                print_pretty(item)?;
            }
        }
        _ => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}

fn print_table(output: &CommandOutput) -> Result<()> {
    match output {
        CommandOutput::Analysis { analysis, top } => {
            let rows: Vec<ReportRow> = visible_report(&analysis.report, *top)
                .iter()
                .map(ReportRow::from)
                .collect();
            println!("{}", Table::new(rows).with(Style::rounded()));
            println!(
                "{} {} of {} agents, {} communities",
                "Flagged:".cyan().bold(),
                analysis.flagged_count().to_string().red(),
                analysis.report.len(),
                analysis.communities.community_count()
            );

            if let Some(stats) = &analysis.stats {
                print_stats(stats);
            }
            if !analysis.populations.is_empty() {
                let rows = analysis.populations.iter().map(PopulationRow::from);
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
            if !analysis.compositions.is_empty() {
                let rows = analysis.compositions.iter().map(CompositionRow::from);
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
        }
        CommandOutput::Communities(map) => {
            println!("{}", Table::new(community_rows(map)).with(Style::rounded()));
        }
        CommandOutput::Evaluation(stats) => print_stats(stats),
        CommandOutput::Message(value) => print_pretty(value)?,
    }
    Ok(())
}

fn community_rows(map: &CommunityMap) -> Vec<CommunityRow> {
    map.sizes()
        .into_iter()
        .enumerate()
        .map(|(community, members)| {
            let names: Vec<&str> = map
                .members(community)
                .into_iter()
                .take(5)
                .map(|a| a.as_str())
                .collect();
            let mut sample = names.join(", ");
            if members > names.len() {
                sample.push_str(", ...");
            }
            CommunityRow {
                community,
                members,
                sample,
            }
        })
        .collect()
}

fn print_stats(stats: &EvaluationStats) {
    println!(
        "{} {:.1}%  {} {:.1}%  {} {:.3}",
        "Precision:".cyan().bold(),
        stats.precision * 100.0,
        "Recall:".cyan().bold(),
        stats.recall * 100.0,
        "F1:".cyan().bold(),
        stats.f1_score
    );
    println!(
        "  TP {}  FP {}  FN {}  TN {}",
        stats.true_positives, stats.false_positives, stats.false_negatives, stats.true_negatives
    );
}
