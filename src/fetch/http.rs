//! Blocking HTTP retrieval of the dorm mail page.

use reqwest::blocking::Client;
use reqwest::Proxy;
use reqwest::header::CONTENT_TYPE;

use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::model::MailRecord;
use crate::parser::{self, ParseOptions};

use super::encoding::EncodingChain;

/// Build the HTTP client for `config`.
pub fn build_client(config: &SourceConfig) -> Result<Client, FetchError> {
    let mut builder = Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str());

    if let Some(proxy) = &config.proxy_url {
        builder = builder.proxy(Proxy::all(proxy).map_err(FetchError::Client)?);
    } else if !config.system_proxy {
        builder = builder.no_proxy();
    }

    builder.build().map_err(FetchError::Client)
}

/// GET the configured page and decode it to text.
///
/// Any transport failure or non-2xx status comes back as `Err`; decoding
/// itself cannot fail.
pub fn fetch_page(config: &SourceConfig) -> Result<String, FetchError> {
    let client = build_client(config)?;
    fetch_page_with(&client, config)
}

/// Same as [`fetch_page`], reusing an existing client.
pub fn fetch_page_with(client: &Client, config: &SourceConfig) -> Result<String, FetchError> {
    let url = config.url.as_str();
    tracing::debug!(url, timeout_secs = config.timeout_secs, "Fetching dorm mail page");

    let resp = client.get(url).send().map_err(|e| {
        let err = FetchError::from_reqwest(url, e);
        tracing::warn!(error = %err, "Dorm mail request failed");
        err
    })?;

    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(url, status = %status, "Dorm mail page returned an error status");
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let bytes = resp
        .bytes()
        .map_err(|e| FetchError::from_reqwest(url, e))?;
    if bytes.is_empty() {
        tracing::warn!(url, "Dorm mail page body is empty");
        return Err(FetchError::EmptyBody {
            url: url.to_string(),
        });
    }

    let chain = EncodingChain::from_labels(&config.legacy_encoding, &config.final_encoding);
    let decoded = chain.decode(&bytes, content_type.as_deref());
    tracing::debug!(
        encoding = decoded.encoding.name(),
        source = ?decoded.source,
        bytes = bytes.len(),
        "Resolved page encoding"
    );
    Ok(decoded.text)
}

/// Fetch and parse in one go.
///
/// `Ok(vec![])` means the board is reachable but lists nothing.
pub fn fetch_records(
    config: &SourceConfig,
    options: &ParseOptions,
) -> Result<Vec<MailRecord>, FetchError> {
    let html = fetch_page(config)?;
    Ok(parser::parse(&html, options))
}
