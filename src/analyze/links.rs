// src/analyze/links.rs
//! Reference extraction: first code-host and first model-host repository URL in a text.

use once_cell::sync::OnceCell;
use regex::Regex;
use std::collections::BTreeMap;

use crate::item::ReferenceKind;

fn code_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"https?://github\.com/[\w-]+/[\w.-]+").unwrap())
}

fn model_re() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"https?://huggingface\.co/[\w-]+/[\w.-]+").unwrap())
}

/// Returns at most one URL per kind; kinds without a match are absent.
pub fn extract_references(text: &str) -> BTreeMap<ReferenceKind, String> {
    let mut out = BTreeMap::new();
    for (kind, re) in [
        (ReferenceKind::Code, code_re()),
        (ReferenceKind::Model, model_re()),
    ] {
        if let Some(m) = re.find(text) {
            // sentence-final period is prose, not part of the repo name
            let url = m.as_str().trim_end_matches('.');
            out.insert(kind, url.to_string());
        }
    }
    out
}
