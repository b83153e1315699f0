//! Retwine CLI - batch driver for interaction-graph reconstruction
//!
//! Usage:
//!   retwine <DATASET>... --out graphs/            # build + export graphs
//!   retwine <DATASET>... --backbone --alpha 0.01  # also extract backbones
//!
//! Each dataset directory is expected to contain:
//!   users.csv                  flagged users (userid, user_screen_name)
//!   tweets.csv                 message rows
//!   recovered_retweets.json    recovered content, one JSON object per line
//!   recovered_replies.json     ditto for replies
//! plus optional companion logs (`.log`) with `Total: <N>, collected: <M>`.
//!
//! Datasets are processed independently: one failure never aborts the rest,
//! and the failed subset is reported at the end.

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use retwine_core::engine::records::RecoveredRecord;
use retwine_core::storage::export::export_graph;
use retwine_core::storage::{
    load_message_records, load_recovered_records, load_user_records, parse_recovery_log,
};
use retwine_core::{
    build_bipartite_graph, build_interaction_graph, check_bipartite, extract_backbone,
    BuildError, IdentityResolver, InteractionKind, MsgMap,
};

#[derive(Parser)]
#[command(name = "retwine")]
#[command(version)]
#[command(about = "Reconstruct interaction graphs and extract influence backbones")]
struct Cli {
    /// Dataset directories to process
    #[arg(value_name = "DATASET", required = true)]
    datasets: Vec<PathBuf>,

    /// Output directory for exported node/edge CSV files
    #[arg(short, long, default_value = "graphs")]
    out: PathBuf,

    /// Interaction kinds to process: retweet, reply, or both
    #[arg(short, long, default_value = "both")]
    kind: String,

    /// Also extract the statistical backbone of each bipartite graph
    #[arg(short, long)]
    backbone: bool,

    /// Significance level for the Benjamini-Hochberg cut
    #[arg(long, default_value_t = 0.01)]
    alpha: f64,

    /// Increase log verbosity (-v = debug, -vv = trace)
    #[arg(short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let kinds: Vec<InteractionKind> = match cli.kind.as_str() {
        "retweet" => vec![InteractionKind::Retweet],
        "reply" => vec![InteractionKind::Reply],
        "both" => vec![InteractionKind::Retweet, InteractionKind::Reply],
        other => {
            eprintln!("Unknown interaction kind '{other}' (expected retweet, reply, or both)");
            process::exit(2);
        }
    };

    // Isolate-and-continue: collect per-dataset outcomes, report at the end.
    let mut failures: Vec<(PathBuf, BuildError)> = Vec::new();
    for dataset in &cli.datasets {
        match process_dataset(dataset, &kinds, &cli) {
            Ok(()) => println!("✓ {}", dataset.display()),
            Err(e) => {
                eprintln!("✗ {}: {e}", dataset.display());
                failures.push((dataset.clone(), e));
            }
        }
    }

    if !failures.is_empty() {
        eprintln!(
            "\n{} of {} datasets failed:",
            failures.len(),
            cli.datasets.len()
        );
        for (dataset, error) in &failures {
            eprintln!("  {}: {error}", dataset.display());
        }
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn dataset_stem(dataset: &Path) -> String {
    dataset
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dataset".to_string())
}

fn load_recovery(
    dataset: &Path,
    name: &str,
) -> Result<Vec<RecoveredRecord>, BuildError> {
    let path = dataset.join(format!("{name}.json"));
    let records = load_recovered_records(&path)?;
    let log_path = dataset.join(format!("{name}.log"));
    if log_path.exists() {
        let stats = parse_recovery_log(&std::fs::read_to_string(&log_path)?)?;
        tracing::info!(
            dataset = %dataset.display(),
            set = name,
            total = stats.total,
            collected = stats.collected,
            recall = format!("{:.1}%", 100.0 * stats.recall()),
            "recovery statistics"
        );
    }
    Ok(records)
}

fn process_dataset(
    dataset: &Path,
    kinds: &[InteractionKind],
    cli: &Cli,
) -> Result<(), BuildError> {
    let users = load_user_records(&dataset.join("users.csv"))?;
    let rows = load_message_records(&dataset.join("tweets.csv"))?;
    let recovered_rt = load_recovery(dataset, "recovered_retweets")?;
    let recovered_rp = load_recovery(dataset, "recovered_replies")?;

    let resolver = IdentityResolver::from_sources(
        users
            .iter()
            .map(|u| (u.userid.as_str(), u.user_screen_name.as_str())),
        recovered_rt
            .iter()
            .map(|r| (r.user.id_str.as_str(), r.user.screen_name.as_str())),
        recovered_rp
            .iter()
            .map(|r| (r.user.id_str.as_str(), r.user.screen_name.as_str())),
    );
    let msgmap = MsgMap::from_recovered(
        recovered_rt
            .iter()
            .chain(&recovered_rp)
            .map(|r| (r.id_str.as_str(), r.user.id_str.as_str())),
        &resolver,
    );
    tracing::info!(
        dataset = %dataset.display(),
        users = resolver.num_users(),
        flagged = resolver.num_flagged(),
        recovered_messages = msgmap.len(),
        "identities resolved"
    );

    let stem = dataset_stem(dataset);
    for &kind in kinds {
        let (graph, stats) = build_interaction_graph(&rows, kind, &resolver, &msgmap);
        tracing::info!(
            dataset = %dataset.display(),
            kind = %kind,
            edges = graph.num_edges(),
            considered = stats.rows_considered,
            skipped = stats.rows_skipped(),
            "directed graph built"
        );
        export_graph(&cli.out, &format!("{stem}_{kind}"), &graph)?;

        let (bipartite, _) = build_bipartite_graph(&rows, kind, &resolver, &msgmap);
        let report = check_bipartite(&bipartite);
        if !report.passed() {
            // Builder bug, not bad input: report and keep this graph out of
            // downstream consumption, but do not fail the dataset.
            tracing::error!(
                dataset = %dataset.display(),
                kind = %kind,
                report = ?report,
                "coherence check failed; skipping backbone for this graph"
            );
            continue;
        }

        if cli.backbone && bipartite.num_posts() > 0 {
            let artifacts = extract_backbone(&bipartite, cli.alpha)?;
            export_graph(
                &cli.out,
                &format!("{stem}_{kind}_backbone"),
                &artifacts.filtered,
            )?;
            println!(
                "  {kind}: {} of {} projected pairs significant at alpha={}",
                artifacts.filtered.num_edges(),
                artifacts.tested,
                cli.alpha
            );
        }
    }
    Ok(())
}
