//! Single-pass, length-gated clustering of parsed log records.
//!
//! Each record is compared only against clusters whose founding record had
//! the same number of tokens. Similarity is the size of the multiset
//! intersection between the record's tokens and the cluster's token counts,
//! divided by the record's token count. The record joins the *first* cluster
//! (in creation order) that reaches the threshold, otherwise it founds a new
//! one.
//!
//! A cluster's token counts grow by per-token maximum, not by sum: a token
//! seen twice in one member and once in another is counted twice, not three
//! times. The threshold therefore keeps the same meaning however large a
//! cluster gets.

use crate::cluster_config::ClusterConfig;
use crate::record::{LogRecord, TokenCounts};
use rustc_hash::FxHashMap;

#[derive(Debug, Clone)]
pub struct LogCluster {
    length: usize,
    token_counts: FxHashMap<String, usize>,
    members: Vec<LogRecord>,
}

impl LogCluster {
    fn seeded(length: usize, counts: &TokenCounts<'_>) -> Self {
        let token_counts = counts
            .iter()
            .map(|(token, count)| (token.to_owned(), count))
            .collect();

        Self {
            length,
            token_counts,
            members: Vec::new(),
        }
    }

    /// Token count shared by every member
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn members(&self) -> &[LogRecord] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Highest multiplicity of `token` seen in any single member
    pub fn token_count(&self, token: &str) -> usize {
        self.token_counts.get(token).copied().unwrap_or(0)
    }

    pub fn token_counts(&self) -> impl Iterator<Item = (&str, usize)> {
        self.token_counts
            .iter()
            .map(|(token, &count)| (token.as_str(), count))
    }

    /// Size of the multiset intersection with `counts`
    pub fn shared_tokens(&self, counts: &TokenCounts<'_>) -> usize {
        counts
            .iter()
            .map(|(token, count)| count.min(self.token_count(token)))
            .sum()
    }

    /// Shared tokens over the record's token count. Two empty token
    /// sequences are identical, so a zero-length record scores 1.0.
    pub fn similarity(&self, counts: &TokenCounts<'_>) -> f64 {
        let log_length = counts.total();
        if log_length == 0 {
            return 1.0;
        }
        self.shared_tokens(counts) as f64 / log_length as f64
    }

    fn raise_counts(&mut self, counts: &TokenCounts<'_>) {
        for (token, count) in counts.iter() {
            match self.token_counts.get_mut(token) {
                Some(existing) => *existing = (*existing).max(count),
                None => {
                    self.token_counts.insert(token.to_owned(), count);
                }
            }
        }
    }
}

/// Where the engine put a record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment {
    Joined { cluster: usize, similarity: f64 },
    Created { cluster: usize },
}

impl Assignment {
    /// Index of the cluster in creation order
    pub fn cluster(&self) -> usize {
        match *self {
            Assignment::Joined { cluster, .. } | Assignment::Created { cluster } => cluster,
        }
    }

    pub fn is_new_cluster(&self) -> bool {
        matches!(self, Assignment::Created { .. })
    }
}

/// Owns the cluster set for the lifetime of one run.
#[derive(Debug, Clone)]
pub struct ClusterEngine {
    similarity_threshold: f64,
    clusters: Vec<LogCluster>,
    // Cluster indices per token length, in creation order
    by_length: FxHashMap<usize, Vec<usize>>,
    records_seen: usize,
}

impl ClusterEngine {
    pub fn new(similarity_threshold: f64) -> Self {
        Self {
            similarity_threshold,
            clusters: Vec::new(),
            by_length: FxHashMap::default(),
            records_seen: 0,
        }
    }

    pub fn with_config(config: &ClusterConfig) -> Self {
        Self::new(config.similarity_threshold)
    }

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Assign one record. Records must arrive in input order: the outcome
    /// depends on every earlier assignment.
    pub fn add_record(&mut self, record: LogRecord) -> Assignment {
        self.records_seen += 1;

        let assignment = {
            let counts = record.token_counts();
            let log_length = counts.total();

            match self.first_fit(&counts, log_length) {
                Some((cluster, similarity)) => {
                    self.clusters[cluster].raise_counts(&counts);
                    Assignment::Joined {
                        cluster,
                        similarity,
                    }
                }
                None => {
                    let cluster = self.clusters.len();
                    self.clusters.push(LogCluster::seeded(log_length, &counts));
                    self.by_length.entry(log_length).or_default().push(cluster);
                    Assignment::Created { cluster }
                }
            }
        };

        tracing::trace!(
            "Line {} ({} tokens) -> {:?}",
            record.line_number(),
            record.token_count(),
            assignment
        );

        self.clusters[assignment.cluster()].members.push(record);
        assignment
    }

    pub fn add_records<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = LogRecord>,
    {
        for record in records {
            self.add_record(record);
        }
        tracing::debug!(
            "Clustered {} records into {} clusters",
            self.records_seen,
            self.clusters.len()
        );
    }

    fn first_fit(&self, counts: &TokenCounts<'_>, log_length: usize) -> Option<(usize, f64)> {
        let candidates = self.by_length.get(&log_length)?;

        candidates.iter().find_map(|&idx| {
            let similarity = self.clusters[idx].similarity(counts);
            (similarity >= self.similarity_threshold).then_some((idx, similarity))
        })
    }

    /// Clusters in creation order
    pub fn clusters(&self) -> &[LogCluster] {
        &self.clusters
    }

    pub fn into_clusters(self) -> Vec<LogCluster> {
        self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn records_seen(&self) -> usize {
        self.records_seen
    }
}
