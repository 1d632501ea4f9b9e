//! HTTP clients for ChEMBL and the enrichment services.
//!
//! Fetching and parsing are split: every client exposes pure `parse_*`
//! functions over the raw payload so they can be exercised without a network.

pub mod chembl;
pub mod crossref;
pub mod iuphar;
pub mod openalex;
pub mod pubchem;
pub mod pubmed;
pub mod semantic_scholar;
pub mod uniprot;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::warn;

use crate::{
    config::Settings,
    error::{EtlError, EtlResult},
    normalize::{clean_text, format_float},
};

/// Shared client: polite user agent, compression and a request timeout.
pub fn http_client(settings: &Settings) -> EtlResult<Client> {
    Client::builder()
        .user_agent(format!(
            "bioetl/{} (+mailto:{})",
            env!("CARGO_PKG_VERSION"),
            settings.contact_email
        ))
        .gzip(true)
        .brotli(true)
        .timeout(settings.http_timeout())
        .build()
        .map_err(|err| EtlError::http("client", err))
}

/// Send a request and decode a JSON body. `404` is reported as `Ok(None)`.
pub(crate) async fn send_json(
    request: RequestBuilder,
    service: &'static str,
) -> EtlResult<Option<Value>> {
    let resp = request
        .send()
        .await
        .map_err(|err| EtlError::http(service, err))?;
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(EtlError::http(service, format!("HTTP {status}")));
    }
    let body = resp
        .json::<Value>()
        .await
        .map_err(|err| EtlError::parse(service, err))?;
    Ok(Some(body))
}

/// [`send_json`] for enrichment services: a failed request is logged and
/// yields no body so the remaining requests of the run still go out.
pub(crate) async fn send_json_lenient(
    request: RequestBuilder,
    service: &'static str,
) -> Option<Value> {
    match send_json(request, service).await {
        Ok(body) => body,
        Err(err) => {
            warn!(service, error = %err, "request failed; skipping");
            None
        }
    }
}

/// Render a JSON scalar as a cell value; containers and blanks yield `None`.
pub(crate) fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => clean_text(s),
        Value::Number(n) => n
            .as_i64()
            .map(|i| i.to_string())
            .or_else(|| n.as_f64().and_then(format_float)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// [`scalar`] at a JSON pointer such as `/molecule_structures/canonical_smiles`.
pub(crate) fn text_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(scalar)
}

/// Array at `pointer`, or an empty slice.
pub(crate) fn array_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}
