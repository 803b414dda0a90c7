// src/fetch/mod.rs

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::records::RecordSet;

/// Carried over from the original page, where it sat unused next to the
/// fetch calls. Never attached to a request; the real credential lives on
/// the proxy side.
pub const CLIENT_AUTH_KEY: &str = "LMS-2024-CLIENT";

#[derive(Debug, Deserialize)]
struct FetchEnvelope {
    status: String,
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Fetch the full record set through the proxy. Expects the upstream
/// envelope `{"status":"success","data":[...]}`.
pub async fn fetch_records(client: &Client, base: &str) -> Result<RecordSet> {
    let url = format!("{}/proxy", base.trim_end_matches('/'));
    let envelope: FetchEnvelope = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?
        .json()
        .await
        .context("decoding record envelope")?;

    if envelope.status != "success" {
        return Err(anyhow!(
            "upstream reported '{}': {}",
            envelope.status,
            envelope.message.unwrap_or_default()
        ));
    }

    info!(records = envelope.data.len(), "fetched record set");
    RecordSet::from_values(envelope.data)
}

/// Submit form fields as a write through the proxy. The proxy attaches the
/// credential; the reply is the upstream's JSON verbatim. The local record
/// cache is NOT refreshed on success.
pub async fn submit_update(
    client: &Client,
    base: &str,
    fields: Map<String, Value>,
) -> Result<Value> {
    let url = format!("{}/proxy", base.trim_end_matches('/'));
    let reply: Value = client
        .post(&url)
        .json(&Value::Object(fields))
        .send()
        .await
        .with_context(|| format!("POST {}", url))?
        .error_for_status()
        .with_context(|| format!("POST {}", url))?
        .json()
        .await
        .context("decoding write reply")?;
    Ok(reply)
}
