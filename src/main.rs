use anyhow::{Context, Result};
use clap::Parser;
use log_miner::cli::Cli;
use log_miner::{LogMiner, RunSummary};
use tracing::info;

/// Cluster rows shown in the end-of-run table
const PREVIEW_CLUSTERS: usize = 20;

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_writer(std::io::stderr)
        .init();

    let config = cli.miner_config();
    config.log_config();

    let miner = LogMiner::new(config);
    let summary = miner.run().with_context(|| {
        format!(
            "Failed to mine templates from {}",
            miner.config().input.display()
        )
    })?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    info!("═══════════════════════════════════════════════════════");
    info!("📊 Clustering summary");
    info!("   Lines read:       {:>8}", summary.lines_read);
    info!("   Lines parsed:     {:>8}", summary.records_parsed);
    info!("   Lines skipped:    {:>8}", summary.skipped.len());
    info!("   Clusters found:   {:>8}", summary.clusters_total);
    info!("   Clusters kept:    {:>8}", summary.clusters_kept);
    info!("   Rows written:     {:>8}", summary.rows_written);
    info!("   Elapsed:          {:>7.2}s", summary.elapsed_secs);

    let kept: Vec<_> = summary.clusters.iter().filter(|c| c.kept).collect();
    if !kept.is_empty() {
        info!("───────────────────────────────────────────────────────");
        info!("   {:<8} {:>6} {:>6}  sample", "EventId", "lines", "tokens");
        for cluster in kept.iter().take(PREVIEW_CLUSTERS) {
            info!(
                "   {:<8} {:>6} {:>6}  {}",
                cluster.event_id, cluster.size, cluster.length, cluster.sample
            );
        }
        if kept.len() > PREVIEW_CLUSTERS {
            info!("   ... {} more clusters", kept.len() - PREVIEW_CLUSTERS);
        }
    }

    match &summary.output {
        Some(path) => info!("✅ Saved clusters to {}", path.display()),
        None => info!("No cluster reached the lower bound, nothing written"),
    }
    info!("═══════════════════════════════════════════════════════");
}
