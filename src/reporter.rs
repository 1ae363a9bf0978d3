/// Turns finished clusters into the `clusters.csv` report.
///
/// Every cluster gets an event id; clusters smaller than the lower bound are
/// then dropped. Retained members are numbered 1.. within their cluster and
/// written cluster by cluster, members in arrival order.
use crate::cluster_engine::LogCluster;
use crate::error::{MinerError, Result};
use crate::event_id::EventIdGenerator;
use crate::record::LogRecord;
use std::io;
use std::path::{Path, PathBuf};

pub const OUTPUT_FILE_NAME: &str = "clusters.csv";
pub const LINE_ID_COLUMN: &str = "LineId";
pub const EVENT_ID_COLUMN: &str = "EventId";

#[derive(Debug, Clone)]
pub struct ReportRow<'a> {
    pub record: &'a LogRecord,
    /// 1-based position within the cluster
    pub line_id: usize,
    pub event_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSummary {
    pub event_id: String,
    pub size: usize,
    pub length: usize,
    pub kept: bool,
    /// Content of the first member, or all its fields when it has no
    /// `Content` field
    pub sample: String,
}

#[derive(Debug, Clone)]
pub struct Report<'a> {
    columns: Vec<String>,
    rows: Vec<ReportRow<'a>>,
    clusters: Vec<ClusterSummary>,
}

impl<'a> Report<'a> {
    /// Field columns followed by `LineId` and `EventId`
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[ReportRow<'a>] {
        &self.rows
    }

    /// One entry per cluster in creation order, dropped ones included
    pub fn clusters(&self) -> &[ClusterSummary] {
        &self.clusters
    }

    pub fn kept_clusters(&self) -> usize {
        self.clusters.iter().filter(|c| c.kept).count()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;

        let field_columns = &self.columns[..self.columns.len() - 2];
        for row in &self.rows {
            let line_id = row.line_id.to_string();
            let values = field_columns
                .iter()
                .map(|column| row.record.get(column).unwrap_or(""))
                .chain([line_id.as_str(), row.event_id.as_str()]);
            writer.write_record(values)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Write `clusters.csv` into `dir`. An empty report writes nothing and
    /// returns `None`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<Option<PathBuf>> {
        if self.is_empty() {
            tracing::info!("No clusters found to save.");
            return Ok(None);
        }

        let path = dir.join(OUTPUT_FILE_NAME);
        let write_error = |source| MinerError::WriteOutput {
            path: path.clone(),
            source,
        };

        let file = std::fs::File::create(&path).map_err(|e| write_error(csv::Error::from(e)))?;
        self.write_csv(io::BufWriter::new(file)).map_err(write_error)?;

        tracing::info!("Wrote {} rows to {}", self.rows.len(), path.display());
        Ok(Some(path))
    }
}

pub struct Reporter<G> {
    lower_bound: usize,
    event_ids: G,
}

impl<G: EventIdGenerator> Reporter<G> {
    pub fn new(lower_bound: usize, event_ids: G) -> Self {
        Self {
            lower_bound,
            event_ids,
        }
    }

    pub fn lower_bound(&self) -> usize {
        self.lower_bound
    }

    pub fn build<'a>(&mut self, clusters: &'a [LogCluster]) -> Report<'a> {
        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::new();
        let mut summaries = Vec::with_capacity(clusters.len());

        for cluster in clusters {
            // Drawn for dropped clusters too, so a seeded generator gives the
            // same id to the same cluster whatever the lower bound.
            let event_id = self.event_ids.next_event_id();
            let kept = cluster.len() >= self.lower_bound;

            if kept {
                for (idx, record) in cluster.members().iter().enumerate() {
                    for name in record.schema().iter() {
                        if !columns.contains(name) {
                            columns.push(name.clone());
                        }
                    }
                    rows.push(ReportRow {
                        record,
                        line_id: idx + 1,
                        event_id: event_id.clone(),
                    });
                }
            } else {
                tracing::debug!(
                    "Dropping cluster {} with {} members (lower bound {})",
                    event_id,
                    cluster.len(),
                    self.lower_bound
                );
            }

            summaries.push(ClusterSummary {
                sample: cluster.members().first().map(sample_text).unwrap_or_default(),
                event_id,
                size: cluster.len(),
                length: cluster.length(),
                kept,
            });
        }

        columns.push(LINE_ID_COLUMN.to_string());
        columns.push(EVENT_ID_COLUMN.to_string());

        Report {
            columns,
            rows,
            clusters: summaries,
        }
    }
}

fn sample_text(record: &LogRecord) -> String {
    match record.get("Content") {
        Some(content) => content.to_string(),
        None => record.values().join(" "),
    }
}
