// src/view/mod.rs

use once_cell::sync::Lazy;

use crate::format::{self, CHARGE_COLUMNS, DATE_COLUMNS};
use crate::records::Record;

/// Shown in place of an absent or empty cell.
pub const PLACEHOLDER: &str = "—";

/// Headline currency columns shown in the snapshot strip.
pub static SNAPSHOT_COLUMNS: &[&str] = &["Loan Amount", "Total Due", "EMI Amount"];

/// A build-time grouping of sheet columns under a block title.
pub struct DisplayBlock {
    pub title: &'static str,
    pub fields: &'static [(&'static str, &'static str)],
}

pub static DISPLAY_BLOCKS: Lazy<Vec<DisplayBlock>> = Lazy::new(|| {
    vec![
        DisplayBlock {
            title: "Loan & Borrower Details",
            fields: &[
                ("Loan Branch", "Branch"),
                ("Loan No", "Loan Number"),
                ("Borrower Name", "Borrower"),
                ("Co-Borrower Name", "Co-Borrower"),
                ("Loan Amount", "Loan Amount"),
                ("EMI Amount", "EMI"),
                ("Sanction Date", "Sanctioned On"),
                ("Disbursement Date", "Disbursed On"),
            ],
        },
        DisplayBlock {
            title: "Case & Legal Status",
            fields: &[
                ("Case Status", "Status"),
                ("Advocate Name", "Advocate"),
                ("Court Name", "Court"),
                ("Demand Notice Date", "Demand Notice On"),
                ("Sec 09 Filing Date", "Sec 09 Filed On"),
                ("Sec.138 Filing Date", "Sec 138 Filed On"),
                ("Next Hearing Date", "Next Hearing"),
            ],
        },
        DisplayBlock {
            title: "Charges & Expenses",
            fields: &[
                ("Demand Notice Expense", "Demand Notice Expense"),
                ("Sec 09 Expense", "Sec 09 Expense"),
                ("Sec.138 Expense", "Sec 138 Expense"),
                ("Total Due", "Total Due"),
            ],
        },
        DisplayBlock {
            title: "Key Dates",
            fields: &[
                ("NPA Date", "NPA On"),
                ("Last Payment Date", "Last Payment"),
                ("Closure Date", "Closed On"),
            ],
        },
    ]
});

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub title: String,
    pub fields: Vec<RenderedField>,
}

/// The four-metric currency strip above the detail blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub loan_amount: String,
    pub total_due: String,
    pub emi_amount: String,
    pub total_charges: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub snapshot: Snapshot,
    pub blocks: Vec<RenderedBlock>,
}

fn field_value(record: &Record, column: &str) -> String {
    let raw = match record.get_str(column) {
        Some(v) => v,
        None => return PLACEHOLDER.to_string(),
    };
    if DATE_COLUMNS.contains(&column) {
        format::format_date(&raw)
    } else if CHARGE_COLUMNS.contains(&column) || SNAPSHOT_COLUMNS.contains(&column) {
        format::format_currency(&raw)
    } else {
        raw
    }
}

fn snapshot_value(record: &Record, column: &str) -> String {
    match record.get_str(column) {
        Some(raw) => format::format_currency(&raw),
        None => "N/A".to_string(),
    }
}

/// Render one record into the full view: snapshot strip plus every display
/// block, formatted per column kind, placeholder for absent cells.
pub fn render_record(record: &Record) -> RenderedView {
    let snapshot = Snapshot {
        loan_amount: snapshot_value(record, "Loan Amount"),
        total_due: snapshot_value(record, "Total Due"),
        emi_amount: snapshot_value(record, "EMI Amount"),
        total_charges: format::format_inr(format::total_charges(record)),
    };

    let blocks = DISPLAY_BLOCKS
        .iter()
        .map(|block| RenderedBlock {
            title: block.title.to_string(),
            fields: block
                .fields
                .iter()
                .map(|(column, label)| RenderedField {
                    label: label.to_string(),
                    value: field_value(record, column),
                })
                .collect(),
        })
        .collect();

    RenderedView { snapshot, blocks }
}
