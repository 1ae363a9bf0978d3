//! Parsed log records and the token multisets the clustering engine compares.

use crate::log_format::FieldSchema;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Token sequence of a single record. Most log lines fit inline.
pub type Tokens<'a> = SmallVec<[&'a str; 32]>;

/// One parsed log line: values for each field of its schema, in schema order.
///
/// Records produced by the same format share one schema allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    schema: FieldSchema,
    values: Vec<String>,
    line_number: usize,
}

impl LogRecord {
    /// Build a record. `values` must line up with `schema`; a missing trailing
    /// value is stored as an empty string.
    pub fn new(schema: FieldSchema, mut values: Vec<String>, line_number: usize) -> Self {
        values.resize(schema.len(), String::new());
        Self {
            schema,
            values,
            line_number,
        }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// 1-based line number in the input file
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema
            .iter()
            .position(|name| name == field)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// (field, value) pairs in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.schema
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    /// Whitespace tokens of all field values joined with a single space.
    pub fn tokens(&self) -> Tokens<'_> {
        self.values
            .iter()
            .flat_map(|value| value.split_whitespace())
            .collect()
    }

    pub fn token_count(&self) -> usize {
        self.values
            .iter()
            .map(|value| value.split_whitespace().count())
            .sum()
    }

    pub fn token_counts(&self) -> TokenCounts<'_> {
        TokenCounts::from_tokens(self.tokens())
    }
}

/// Multiset of tokens: token -> number of occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCounts<'a> {
    counts: FxHashMap<&'a str, usize>,
    total: usize,
}

impl<'a> TokenCounts<'a> {
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut counts = Self::default();
        for token in tokens {
            counts.add(token);
        }
        counts
    }

    pub fn add(&mut self, token: &'a str) {
        *self.counts.entry(token).or_insert(0) += 1;
        self.total += 1;
    }

    pub fn get(&self, token: &str) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }

    /// Number of tokens counted, duplicates included
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct tokens
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, usize)> + '_ {
        self.counts.iter().map(|(&token, &count)| (token, count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn schema(names: &[&str]) -> FieldSchema {
        names.iter().map(|s| s.to_string()).collect::<Vec<_>>().into()
    }

    #[test]
    fn test_fields_keep_schema_order() {
        let record = LogRecord::new(
            schema(&["Level", "Component", "Content"]),
            vec!["INFO".into(), "dfs.DataNode".into(), "Receiving block".into()],
            7,
        );

        let fields: Vec<_> = record.fields().collect();
        assert_eq!(
            fields,
            vec![
                ("Level", "INFO"),
                ("Component", "dfs.DataNode"),
                ("Content", "Receiving block")
            ]
        );
        assert_eq!(record.get("Component"), Some("dfs.DataNode"));
        assert_eq!(record.get("PID"), None);
        assert_eq!(record.line_number(), 7);
    }

    #[test]
    fn test_missing_values_become_empty() {
        let record = LogRecord::new(schema(&["Level", "PID", "Content"]), vec!["INFO".into()], 1);
        assert_eq!(record.get("PID"), Some(""));
        assert_eq!(record.get("Content"), Some(""));
    }

    #[test]
    fn test_tokens_split_across_fields() {
        let record = LogRecord::new(
            schema(&["Time", "Content"]),
            vec!["10:00:01".into(), "  Served   block blk_1 to /10.0.0.1 ".into()],
            1,
        );

        let tokens = record.tokens();
        assert_eq!(
            tokens.as_slice(),
            &["10:00:01", "Served", "block", "blk_1", "to", "/10.0.0.1"]
        );
        assert_eq!(record.token_count(), 6);
    }

    #[test]
    fn test_empty_fields_contribute_no_tokens() {
        let record = LogRecord::new(
            schema(&["Component", "PID", "Content"]),
            vec!["kernel".into(), "".into(), "".into()],
            1,
        );
        assert_eq!(record.token_count(), 1);
    }

    #[test]
    fn test_token_counts() {
        let counts = TokenCounts::from_tokens(["a", "b", "a", "c", "a"]);

        assert_eq!(counts.get("a"), 3);
        assert_eq!(counts.get("b"), 1);
        assert_eq!(counts.get("z"), 0);
        assert_eq!(counts.total(), 5);
        assert_eq!(counts.distinct(), 3);
    }

    #[test]
    fn test_records_share_schema() {
        let shared = schema(&["Content"]);
        let a = LogRecord::new(Arc::clone(&shared), vec!["x".into()], 1);
        let b = LogRecord::new(Arc::clone(&shared), vec!["y".into()], 2);
        assert!(Arc::ptr_eq(a.schema(), b.schema()));
    }
}
