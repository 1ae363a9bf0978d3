// Core modules
pub mod cluster_engine;
pub mod log_format;
pub mod record;
pub mod record_parser;
pub mod reporter;

// Configuration, errors and the end-to-end run
pub mod cli;
pub mod cluster_config;
pub mod error;
pub mod event_id;
pub mod miner;

pub use cluster_config::ClusterConfig;
pub use cluster_engine::{Assignment, ClusterEngine, LogCluster};
pub use error::MinerError;
pub use log_format::LogFormat;
pub use miner::{LogMiner, MinerConfig, RunSummary};
pub use record::{LogRecord, TokenCounts};
pub use record_parser::{ParseOutcome, RecordParser, SkipReason};
