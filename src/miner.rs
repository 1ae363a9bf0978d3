//! End-to-end mining run: compile the format, parse the input, cluster,
//! report.
//!
//! Configuration problems (bad template, unreadable input, output directory
//! that can't be created) abort the run. Lines that can't be parsed are
//! counted and summarized, never fatal.
use crate::cluster_config::ClusterConfig;
use crate::cluster_engine::ClusterEngine;
use crate::error::{MinerError, Result};
use crate::event_id::{EventIdGenerator, RandomEventIds};
use crate::log_format::LogFormat;
use crate::record_parser::{RecordParser, SkippedLine};
use crate::reporter::{ClusterSummary, Reporter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Skipped lines logged individually at `warn` before switching to `debug`
const SKIP_WARN_LIMIT: usize = 20;

#[derive(Debug, Clone)]
pub struct MinerConfig {
    pub input: PathBuf,
    pub log_format: String,
    pub cluster: ClusterConfig,
    pub output_dir: PathBuf,
    /// Seed for event ids; random when absent
    pub seed: Option<u64>,
}

impl MinerConfig {
    pub fn new(
        input: impl Into<PathBuf>,
        log_format: impl Into<String>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input: input.into(),
            log_format: log_format.into(),
            cluster: ClusterConfig::default(),
            output_dir: output_dir.into(),
            seed: None,
        }
    }

    pub fn with_cluster_config(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn log_config(&self) {
        tracing::info!("📋 Configuration:");
        tracing::info!("   Input: {}", self.input.display());
        tracing::info!("   Log format: {}", self.log_format);
        tracing::info!(
            "   Similarity threshold: {}",
            self.cluster.similarity_threshold
        );
        tracing::info!("   Lower bound: {}", self.cluster.lower_bound);
        tracing::info!("   Output directory: {}", self.output_dir.display());
        if let Some(seed) = self.seed {
            tracing::info!("   Event id seed: {}", seed);
        }
    }
}

/// What a run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub lines_read: usize,
    pub records_parsed: usize,
    pub skipped: Vec<SkippedLine>,
    pub clusters_total: usize,
    pub clusters_kept: usize,
    pub rows_written: usize,
    /// Path of `clusters.csv`, `None` when no cluster met the lower bound
    pub output: Option<PathBuf>,
    pub clusters: Vec<ClusterSummary>,
    pub elapsed_secs: f64,
}

pub struct LogMiner {
    config: MinerConfig,
}

impl LogMiner {
    pub fn new(config: MinerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MinerConfig {
        &self.config
    }

    /// Run with random (or seeded, if configured) event ids
    pub fn run(&self) -> Result<RunSummary> {
        match self.config.seed {
            Some(seed) => self.run_with_ids(RandomEventIds::seeded(seed)),
            None => self.run_with_ids(RandomEventIds::from_entropy()),
        }
    }

    pub fn run_with_ids<G: EventIdGenerator>(&self, event_ids: G) -> Result<RunSummary> {
        let start = Instant::now();

        self.config.cluster.validate()?;
        let format = LogFormat::compile(&self.config.log_format)?;
        create_output_dir(&self.config.output_dir)?;

        let parser = RecordParser::new(format);
        let input = parser.parse_file(&self.config.input)?;
        tracing::info!(
            "Parsed {} of {} lines from {}",
            input.records.len(),
            input.lines_read,
            self.config.input.display()
        );
        log_skipped(&input.skipped, parser.format().template());

        let lines_read = input.lines_read;
        let records_parsed = input.records.len();

        let mut engine = ClusterEngine::with_config(&self.config.cluster);
        engine.add_records(input.records);
        tracing::info!(
            "Found {} clusters (similarity threshold {})",
            engine.len(),
            engine.similarity_threshold()
        );

        let mut reporter = Reporter::new(self.config.cluster.lower_bound, event_ids);
        let report = reporter.build(engine.clusters());
        let output = report.write_to_dir(&self.config.output_dir)?;

        Ok(RunSummary {
            lines_read,
            records_parsed,
            skipped: input.skipped,
            clusters_total: engine.len(),
            clusters_kept: report.kept_clusters(),
            rows_written: report.rows().len(),
            output,
            clusters: report.clusters().to_vec(),
            elapsed_secs: start.elapsed().as_secs_f64(),
        })
    }
}

fn create_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| MinerError::CreateOutputDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn log_skipped(skipped: &[SkippedLine], format: &str) {
    if skipped.is_empty() {
        return;
    }

    tracing::warn!(
        "⚠️  Skipped {} lines that did not match log format {:?}",
        skipped.len(),
        format
    );
    for (idx, line) in skipped.iter().enumerate() {
        if idx < SKIP_WARN_LIMIT {
            tracing::warn!("   line {}: {} ({})", line.line_number, line.line, line.reason);
        } else {
            tracing::debug!("   line {}: {} ({})", line.line_number, line.line, line.reason);
        }
    }
    if skipped.len() > SKIP_WARN_LIMIT {
        tracing::warn!(
            "   ... and {} more (use -v to list them)",
            skipped.len() - SKIP_WARN_LIMIT
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_id::SequentialEventIds;
    use crate::reporter::OUTPUT_FILE_NAME;

    fn write_input(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join("input.log");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_run_writes_clusters() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "INFO a b c\nINFO a b d\nINFO x y z\n");
        let out = dir.path().join("out");

        let config = MinerConfig::new(&input, "<Level> <Content>", &out)
            .with_cluster_config(ClusterConfig::new().with_similarity_threshold(0.7));
        let summary = LogMiner::new(config)
            .run_with_ids(SequentialEventIds::new())
            .unwrap();

        assert_eq!(summary.lines_read, 3);
        assert_eq!(summary.records_parsed, 3);
        assert_eq!(summary.clusters_total, 2);
        assert_eq!(summary.rows_written, 3);
        assert_eq!(summary.output, Some(out.join(OUTPUT_FILE_NAME)));

        let csv = fs::read_to_string(out.join(OUTPUT_FILE_NAME)).unwrap();
        assert_eq!(
            csv,
            "Level,Content,LineId,EventId\n\
             INFO,a b c,1,e1\n\
             INFO,a b d,2,e1\n\
             INFO,x y z,1,e2\n"
        );
    }

    #[test]
    fn test_creates_nested_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "INFO hello\n");
        let out = dir.path().join("a").join("b");

        LogMiner::new(MinerConfig::new(&input, "<Level> <Content>", &out))
            .run_with_ids(SequentialEventIds::new())
            .unwrap();

        assert!(out.join(OUTPUT_FILE_NAME).exists());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = MinerConfig::new(dir.path().join("missing.log"), "<Content>", dir.path());

        let err = LogMiner::new(config).run().unwrap_err();
        assert!(matches!(err, MinerError::ReadInput { .. }));
    }

    #[test]
    fn test_bad_template_is_fatal_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never-created");
        let config = MinerConfig::new(dir.path().join("missing.log"), "<Level <Content>", &out);

        let err = LogMiner::new(config).run().unwrap_err();
        assert!(matches!(err, MinerError::InvalidFormat { .. }));
        assert!(!out.exists());
    }

    #[test]
    fn test_output_dir_over_a_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "INFO hello\n");

        let err = LogMiner::new(MinerConfig::new(&input, "<Level> <Content>", &input))
            .run()
            .unwrap_err();
        assert!(matches!(err, MinerError::CreateOutputDir { .. }));
    }

    #[test]
    fn test_nothing_kept_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "INFO a\nWARN b c\n");
        let out = dir.path().join("out");

        let config = MinerConfig::new(&input, "<Level> <Content>", &out)
            .with_cluster_config(ClusterConfig::new().with_lower_bound(2));
        let summary = LogMiner::new(config).run().unwrap();

        assert_eq!(summary.clusters_total, 2);
        assert_eq!(summary.clusters_kept, 0);
        assert_eq!(summary.output, None);
        assert!(!out.join(OUTPUT_FILE_NAME).exists());
    }

    #[test]
    fn test_seeded_runs_repeat_event_ids() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(dir.path(), "INFO a b\nWARN x y z\n");

        let run = |name: &str| {
            let out = dir.path().join(name);
            let config = MinerConfig::new(&input, "<Level> <Content>", &out).with_seed(9);
            LogMiner::new(config).run().unwrap();
            fs::read_to_string(out.join(OUTPUT_FILE_NAME)).unwrap()
        };

        assert_eq!(run("first"), run("second"));
    }
}
