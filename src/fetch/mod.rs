//! Page retrieval: HTTP fetch and local files, both decoded through the
//! same encoding chain.

pub mod encoding;
pub mod http;

use std::path::Path;

use crate::config::SourceConfig;
use crate::error::{DormMailError, Result};

pub use encoding::{Decoded, EncodingChain, EncodingSource};
pub use http::{fetch_page, fetch_records};

/// Read a saved copy of the page from disk.
///
/// The bytes go through the same chain as a fetched page, with any
/// `<meta>` charset standing in for the response header.
pub fn read_page(path: impl AsRef<Path>, config: &SourceConfig) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| DormMailError::io(path, e))?;
    let chain = EncodingChain::from_labels(&config.legacy_encoding, &config.final_encoding);
    let decoded = chain.decode(&bytes, None);
    tracing::debug!(
        path = %path.display(),
        encoding = decoded.encoding.name(),
        source = ?decoded.source,
        "Read saved page"
    );
    Ok(decoded.text)
}
