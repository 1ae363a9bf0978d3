//! Command-line arguments for `log-miner`

use crate::cluster_config::ClusterConfig;
use crate::miner::MinerConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "log-miner")]
#[command(version)]
#[command(about = "Cluster log lines into event templates by token similarity", long_about = None)]
pub struct Cli {
    /// Log file to mine, one entry per line
    pub input: PathBuf,

    /// Field template, e.g. '<Date> <Time> <Level> <Component>: <Content>'
    pub log_format: String,

    /// Minimum shared-token ratio for a line to join an existing cluster
    #[arg(allow_negative_numbers = true)]
    pub similarity_threshold: f64,

    /// Clusters with fewer lines are left out of clusters.csv
    pub lower_bound: usize,

    /// Directory for clusters.csv, created if missing
    pub output_dir: PathBuf,

    /// Seed the event id generator for reproducible ids
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::WARN;
        }
        match self.verbose {
            0 => tracing::Level::INFO,
            1 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn miner_config(&self) -> MinerConfig {
        let cluster = ClusterConfig::new()
            .with_similarity_threshold(self.similarity_threshold)
            .with_lower_bound(self.lower_bound);

        let config = MinerConfig::new(&self.input, &self.log_format, &self.output_dir)
            .with_cluster_config(cluster);

        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from([
            "log-miner",
            "HDFS.log",
            "<Date> <Time> <Content>",
            "0.5",
            "2",
            "result",
        ])
        .unwrap();

        let config = cli.miner_config();
        assert_eq!(config.input, PathBuf::from("HDFS.log"));
        assert_eq!(config.log_format, "<Date> <Time> <Content>");
        assert_eq!(config.cluster.similarity_threshold, 0.5);
        assert_eq!(config.cluster.lower_bound, 2);
        assert_eq!(config.output_dir, PathBuf::from("result"));
        assert_eq!(config.seed, None);
        assert_eq!(cli.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_all_positionals_required() {
        let result = Cli::try_parse_from(["log-miner", "HDFS.log", "<Content>", "0.5", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_lower_bound_rejected() {
        let result =
            Cli::try_parse_from(["log-miner", "in.log", "<Content>", "0.5", "-1", "out"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_and_verbosity() {
        let cli = Cli::try_parse_from([
            "log-miner", "in.log", "<Content>", "0.35", "0", "out", "--seed", "7", "-vv",
        ])
        .unwrap();

        assert_eq!(cli.miner_config().seed, Some(7));
        assert_eq!(cli.log_level(), tracing::Level::TRACE);
    }

    #[test]
    fn test_quiet() {
        let cli =
            Cli::try_parse_from(["log-miner", "in.log", "<Content>", "0.35", "0", "out", "-q"])
                .unwrap();
        assert_eq!(cli.log_level(), tracing::Level::WARN);
    }
}
