//! Character encoding resolution for the board's legacy pages.
//!
//! Order: BOM, declared charset (header or `<meta>`), legacy encoding
//! (Big5), UTF-8. Each of those must decode cleanly. If none does, the
//! declared or legacy charset is still used when only a few sequences
//! are unmapped; otherwise the page is decoded lossily with the
//! last-resort encoding (GB2312/GBK).

use std::borrow::Cow;

use encoding_rs::{Encoding, BIG5, GBK, UTF_8};

/// How many leading bytes are searched for a `<meta>` charset.
const META_SNIFF_LEN: usize = 1024;

/// Which step of the chain produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingSource {
    Bom,
    Declared,
    Legacy,
    Utf8,
    Fallback,
}

/// Decoded page text and the encoding that produced it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub text: String,
    pub encoding: &'static Encoding,
    pub source: EncodingSource,
}

/// The trial-decode chain.
#[derive(Debug, Clone, Copy)]
pub struct EncodingChain {
    legacy: &'static Encoding,
    fallback: &'static Encoding,
}

impl Default for EncodingChain {
    fn default() -> Self {
        Self {
            legacy: BIG5,
            fallback: GBK,
        }
    }
}

impl EncodingChain {
    /// Build a chain from WHATWG labels, keeping the defaults for
    /// labels `encoding_rs` does not know.
    pub fn from_labels(legacy: &str, fallback: &str) -> Self {
        let defaults = Self::default();
        Self {
            legacy: lookup(legacy).unwrap_or(defaults.legacy),
            fallback: lookup(fallback).unwrap_or(defaults.fallback),
        }
    }

    pub fn legacy(&self) -> &'static Encoding {
        self.legacy
    }

    pub fn fallback(&self) -> &'static Encoding {
        self.fallback
    }

    /// Decode `bytes`. Never fails; the last step replaces bad sequences.
    ///
    /// `content_type` is the raw `Content-Type` header value, if any.
    pub fn decode(&self, bytes: &[u8], content_type: Option<&str>) -> Decoded {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            if let Some(text) = decode_strict(encoding, &bytes[bom_len..]) {
                return Decoded {
                    text,
                    encoding,
                    source: EncodingSource::Bom,
                };
            }
        }

        let declared = content_type
            .and_then(charset_param)
            .or_else(|| meta_charset(bytes))
            .and_then(|label| lookup(&label));
        if let Some(encoding) = declared {
            if let Some(text) = decode_strict(encoding, bytes) {
                return Decoded {
                    text,
                    encoding,
                    source: EncodingSource::Declared,
                };
            }
            tracing::debug!(
                encoding = encoding.name(),
                "Declared charset does not decode cleanly, trying fallbacks"
            );
        }

        let trials = [
            (self.legacy, EncodingSource::Legacy),
            (UTF_8, EncodingSource::Utf8),
        ];
        for (encoding, source) in trials {
            if let Some(text) = decode_strict(encoding, bytes) {
                return Decoded {
                    text,
                    encoding,
                    source,
                };
            }
        }

        // A page that almost decodes as its declared (or legacy) charset
        // keeps that charset; stray unmapped pairs become U+FFFD.
        let near_misses = declared
            .map(|encoding| (encoding, EncodingSource::Declared))
            .into_iter()
            .chain([(self.legacy, EncodingSource::Legacy)]);
        for (encoding, source) in near_misses {
            if let Some(text) = decode_tolerant(encoding, bytes) {
                tracing::debug!(
                    encoding = encoding.name(),
                    "Decoded with replacement for unmapped sequences"
                );
                return Decoded {
                    text,
                    encoding,
                    source,
                };
            }
        }

        let (text, _had_errors) = self.fallback.decode_without_bom_handling(bytes);
        Decoded {
            text: text.into_owned(),
            encoding: self.fallback,
            source: EncodingSource::Fallback,
        }
    }
}

fn lookup(label: &str) -> Option<&'static Encoding> {
    let encoding = Encoding::for_label(label.trim().as_bytes());
    if encoding.is_none() {
        tracing::warn!(label = %label, "Unknown encoding label");
    }
    encoding
}

fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
}

/// Replacement characters tolerated before a near-miss charset is given
/// up for the final fallback. Larger pages may carry up to 1% instead.
const MAX_STRAY_REPLACEMENTS: usize = 4;

/// Decode with replacement, unless that would replace more than a
/// handful of sequences.
fn decode_tolerant(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
    let total = text.chars().count();
    let replaced = text
        .chars()
        .filter(|&c| c == char::REPLACEMENT_CHARACTER)
        .count();
    (replaced <= MAX_STRAY_REPLACEMENTS.max(total / 100)).then(|| text.into_owned())
}

/// Extract `charset=` from a `Content-Type` style value.
pub fn charset_param(value: &str) -> Option<String> {
    let lower = value.to_ascii_lowercase();
    let start = lower.find("charset=")? + "charset=".len();
    let rest = &value[start..];
    let label: String = rest
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|&c| !matches!(c, '"' | '\'' | ';' | '>' | '/' | ' ' | '\t' | '\r' | '\n'))
        .collect();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

/// Find a charset declared in a `<meta>` tag near the top of the page.
pub fn meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(META_SNIFF_LEN)];
    // Labels are ASCII; anything else in the head is irrelevant here.
    let head: String = head
        .iter()
        .map(|&b| if b.is_ascii() { b as char } else { ' ' })
        .collect();
    let lower = head.to_ascii_lowercase();

    let mut from = 0;
    while let Some(pos) = lower[from..].find("<meta") {
        let tag_start = from + pos;
        let tag_end = lower[tag_start..]
            .find('>')
            .map_or(lower.len(), |e| tag_start + e);
        if let Some(label) = charset_param(&head[tag_start..tag_end]) {
            return Some(label);
        }
        from = tag_end;
    }
    None
}
