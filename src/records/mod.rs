// src/records/mod.rs

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub const BRANCH_COLUMN: &str = "Loan Branch";
pub const LOAN_NO_COLUMN: &str = "Loan No";

/// One loan's spreadsheet row: column name → cell value, loosely typed.
/// Any column may be missing; values may arrive as strings or numbers.
#[derive(Debug, Clone)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Record(map)),
            other => Err(anyhow!("record is not a JSON object: {}", other)),
        }
    }

    /// Trimmed string form of a cell, or `None` when the column is absent
    /// or holds null/empty.
    pub fn get_str(&self, column: &str) -> Option<String> {
        let v = self.0.get(column)?;
        let s = match v {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => return None,
            other => other.to_string(),
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    pub fn branch(&self) -> Option<String> {
        self.get_str(BRANCH_COLUMN)
    }

    pub fn loan_no(&self) -> Option<String> {
        self.get_str(LOAN_NO_COLUMN)
    }
}

/// The full record set, fetched once and read-only afterwards.
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: Vec<Record>,
    pub fetched_at: DateTime<Utc>,
}

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        let set = RecordSet {
            records,
            fetched_at: Utc::now(),
        };
        let dupes = set.duplicate_identity_count();
        if dupes > 0 {
            debug!(dupes, "duplicate (branch, loan) identity pairs in record set");
        }
        set
    }

    pub fn from_values(values: Vec<Value>) -> Result<Self> {
        let records = values
            .into_iter()
            .map(Record::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(RecordSet::new(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct trimmed branch names, sorted.
    pub fn branches(&self) -> Vec<String> {
        let set: BTreeSet<String> = self.records.iter().filter_map(Record::branch).collect();
        set.into_iter().collect()
    }

    /// Distinct loan numbers for an exact trimmed branch match, sorted.
    pub fn loans_for_branch(&self, branch: &str) -> Vec<String> {
        let branch = branch.trim();
        let set: BTreeSet<String> = self
            .records
            .iter()
            .filter(|r| r.branch().as_deref() == Some(branch))
            .filter_map(Record::loan_no)
            .collect();
        set.into_iter().collect()
    }

    /// First record matching the trimmed (branch, loan no) pair. Linear scan;
    /// the set is small enough that nothing smarter is warranted.
    pub fn find(&self, branch: &str, loan_no: &str) -> Option<&Record> {
        let branch = branch.trim();
        let loan_no = loan_no.trim();
        self.records.iter().find(|r| {
            r.branch().as_deref() == Some(branch) && r.loan_no().as_deref() == Some(loan_no)
        })
    }

    /// Number of (branch, loan) pairs that appear more than once. No
    /// uniqueness is enforced anywhere; this exists for the load-time
    /// diagnostic only.
    fn duplicate_identity_count(&self) -> usize {
        let mut seen: HashMap<(String, String), usize> = HashMap::new();
        for r in &self.records {
            if let (Some(b), Some(l)) = (r.branch(), r.loan_no()) {
                *seen.entry((b, l)).or_insert(0) += 1;
            }
        }
        seen.values().filter(|&&n| n > 1).count()
    }
}
