// src/app/mod.rs

use anyhow::Result;
use tracing::{error, info};

use crate::records::RecordSet;
use crate::view::{self, RenderedView};

/// Shown when the initial fetch fails; the original tool has no retry.
pub const FETCH_FAILED_MESSAGE: &str = "Unable to load loan records. Please try again later.";

/// One lookup session. The record set is fetched once per session and only
/// re-filtered afterwards; every transition consumes the session and returns
/// the next one.
#[derive(Debug)]
pub enum Session {
    Loading,
    Failed { message: String },
    Active { records: RecordSet, stage: Stage },
}

#[derive(Debug)]
pub enum Stage {
    /// Branch list available, nothing selected.
    Ready { branches: Vec<String> },
    /// Branch chosen, dependent loan list populated.
    Filtered {
        branch: String,
        loans: Vec<String>,
    },
    /// Search hit: the record rendered for display.
    Displayed {
        branch: String,
        loan_no: String,
        view: RenderedView,
    },
    /// Search miss for the selected pair.
    NotFound { branch: String, loan_no: String },
}

impl Session {
    pub fn loading() -> Self {
        Session::Loading
    }

    /// Resolve the initial fetch. Any error collapses to the static failure
    /// message; the underlying cause goes to the log only.
    pub fn on_fetch(self, result: Result<RecordSet>) -> Self {
        match result {
            Ok(records) => {
                let branches = records.branches();
                info!(records = records.len(), branches = branches.len(), "record set loaded");
                Session::Active {
                    records,
                    stage: Stage::Ready { branches },
                }
            }
            Err(e) => {
                error!("initial fetch failed: {:#}", e);
                Session::Failed {
                    message: FETCH_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Choose (or change) the branch. Always lands in `Filtered`, discarding
    /// any prior loan selection or displayed record.
    pub fn select_branch(self, branch: &str) -> Self {
        match self {
            Session::Active { records, .. } => {
                let loans = records.loans_for_branch(branch);
                Session::Active {
                    records,
                    stage: Stage::Filtered {
                        branch: branch.trim().to_string(),
                        loans,
                    },
                }
            }
            other => other,
        }
    }

    /// Search for the selected (branch, loan) pair. Only meaningful once a
    /// branch is filtered; in any other stage the session is unchanged.
    pub fn search(self, loan_no: &str) -> Self {
        match self {
            Session::Active {
                records,
                stage:
                    Stage::Filtered { branch, .. }
                    | Stage::Displayed { branch, .. }
                    | Stage::NotFound { branch, .. },
            } => {
                let loan_no = loan_no.trim().to_string();
                let stage = match records.find(&branch, &loan_no) {
                    Some(record) => Stage::Displayed {
                        view: view::render_record(record),
                        branch,
                        loan_no,
                    },
                    None => Stage::NotFound { branch, loan_no },
                };
                Session::Active { records, stage }
            }
            other => other,
        }
    }
}
