// src/bin/lookup.rs
//
// Terminal lookup client: fetches the record set through the proxy, walks
// the branch → loan cascade from stdin, and prints the selected record's
// snapshot and detail blocks.

use anyhow::{Context, Result};
use loanlens::app::{Session, Stage, FETCH_FAILED_MESSAGE};
use loanlens::fetch;
use loanlens::view::RenderedView;
use reqwest::Client;
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

fn prompt(label: &str, options: &[String]) -> Result<String> {
    println!("{}:", label);
    for (i, opt) in options.iter().enumerate() {
        println!("  {}) {}", i + 1, opt);
    }
    print!("> ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading selection")?;
    let line = line.trim();

    // accept either the index or the literal value
    if let Ok(n) = line.parse::<usize>() {
        if n >= 1 && n <= options.len() {
            return Ok(options[n - 1].clone());
        }
    }
    Ok(line.to_string())
}

fn print_view(view: &RenderedView) {
    println!();
    println!(
        "  Loan Amount: {}   Total Due: {}   EMI: {}   Total Charges: {}",
        view.snapshot.loan_amount,
        view.snapshot.total_due,
        view.snapshot.emi_amount,
        view.snapshot.total_charges
    );
    for block in &view.blocks {
        println!("\n== {} ==", block.title);
        for field in &block.fields {
            println!("  {:<20} {}", field.label, field.value);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let base = std::env::var("LOANLENS_PROXY_URL")
        .unwrap_or_else(|_| "http://127.0.0.1:8787".to_string());
    let client = Client::new();

    let session = Session::loading();
    let session = session.on_fetch(fetch::fetch_records(&client, &base).await);

    let session = match &session {
        Session::Failed { message } => {
            eprintln!("{}", message);
            return Ok(());
        }
        Session::Active {
            stage: Stage::Ready { branches },
            ..
        } => {
            let branch = prompt("Loan Branch", branches)?;
            session.select_branch(&branch)
        }
        _ => {
            eprintln!("{}", FETCH_FAILED_MESSAGE);
            return Ok(());
        }
    };

    let session = match &session {
        Session::Active {
            stage: Stage::Filtered { loans, .. },
            ..
        } => {
            if loans.is_empty() {
                println!("No loans for that branch.");
                return Ok(());
            }
            let loan = prompt("Loan No", loans)?;
            session.search(&loan)
        }
        _ => return Ok(()),
    };

    match session {
        Session::Active {
            stage: Stage::Displayed { view, .. },
            ..
        } => print_view(&view),
        Session::Active {
            stage: Stage::NotFound { branch, loan_no },
            ..
        } => println!("No record found for {} / {}.", branch, loan_no),
        _ => {}
    }

    Ok(())
}
