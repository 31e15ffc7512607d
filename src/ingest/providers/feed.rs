//! Syndication feed adapter (RSS 2.0, Atom, JSON Feed).
//!
//! Well-formed feeds go through `feed_rs`. When the strict parse fails, a
//! lenient streaming scan recovers every `<item>`/`<entry>` that was complete
//! before the first XML error, so a feed with one broken entry still yields the
//! rest.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::parse_timestamp;
use crate::ingest::types::{RawRecord, Source, SourceAdapter, SourceCategory};
use crate::ingest::{normalize_text, passes_safety_filter};

pub struct FeedAdapter {
    source: Source,
    mode: Mode,
    safety_keywords: Vec<String>,
}

enum Mode {
    Fixture(String),
    Http { client: reqwest::Client },
}

/// Loosely-typed entry shared by both parse paths before normalization.
#[derive(Debug, Default, Clone, PartialEq)]
pub(crate) struct PartialEntry {
    pub title: String,
    pub link: String,
    pub body: String,
    pub authors: Vec<String>,
    pub date: String,
    link_is_primary: bool,
}

impl PartialEntry {
    /// The first primary link wins; a secondary one only fills an empty slot.
    fn offer_link(&mut self, href: &str, rel: Option<&str>) {
        let href = href.trim();
        if href.is_empty() {
            return;
        }
        let primary = is_primary_rel(rel);
        if self.link.is_empty() || (primary && !self.link_is_primary) {
            self.link = href.to_string();
            self.link_is_primary = primary;
        }
    }
}

/// `alternate` or unlabelled links name the entry itself; replies/edit/self do not.
fn is_primary_rel(rel: Option<&str>) -> bool {
    matches!(rel.map(str::trim), None | Some("") | Some("alternate"))
}

fn canonical_link(links: &[feed_rs::model::Link]) -> Option<String> {
    links
        .iter()
        .find(|l| is_primary_rel(l.rel.as_deref()))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}

// RSS <author> is parsed into `email` under a placeholder name;
// Atom authors and dc:creator carry a real `name`.
fn person_name(p: feed_rs::model::Person) -> String {
    let name = p.name.trim();
    if !name.is_empty() && name != "author" {
        return p.name;
    }
    p.email.unwrap_or_default()
}

/// `jane@example.com (Jane Roe)` and `Jane Roe <jane@example.com>` become `Jane Roe`.
pub(crate) fn display_name(raw: &str) -> String {
    let raw = raw.trim();
    let parenthesized = raw
        .strip_suffix(')')
        .and_then(|s| s.split_once('('))
        .map(|(_, name)| name.trim())
        .filter(|name| !name.is_empty());
    if let Some(name) = parenthesized {
        return name.to_string();
    }
    let bracketed = raw
        .split_once('<')
        .map(|(name, _)| name.trim().trim_matches('"').trim())
        .filter(|name| !name.is_empty());
    bracketed.unwrap_or(raw).to_string()
}

impl FeedAdapter {
    pub fn from_fixture(source: Source, xml: &str, safety_keywords: Vec<String>) -> Self {
        Self {
            source,
            mode: Mode::Fixture(xml.to_string()),
            safety_keywords,
        }
    }

    pub fn from_url(source: Source, client: reqwest::Client, safety_keywords: Vec<String>) -> Self {
        Self {
            source,
            mode: Mode::Http { client },
            safety_keywords,
        }
    }

    /// Parse, cap, and (for the safety category) keyword-filter one feed document.
    fn parse_records(&self, bytes: &[u8]) -> Vec<RawRecord> {
        let t0 = std::time::Instant::now();
        let entries = match feed_rs::parser::parse(bytes) {
            Ok(feed) => feed
                .entries
                .into_iter()
                .map(|e| {
                    let link = canonical_link(&e.links)
                        .or_else(|| e.id.starts_with("http").then(|| e.id.clone()))
                        .unwrap_or_default();
                    PartialEntry {
                        title: e.title.map(|t| t.content).unwrap_or_default(),
                        link,
                        body: e
                            .summary
                            .map(|t| t.content)
                            .or_else(|| e.content.and_then(|c| c.body))
                            .unwrap_or_default(),
                        authors: e.authors.into_iter().map(person_name).collect(),
                        date: e
                            .published
                            .or(e.updated)
                            .map(|d| d.to_rfc3339())
                            .unwrap_or_default(),
                        ..PartialEntry::default()
                    }
                })
                .collect(),
            Err(e) => {
                let text = String::from_utf8_lossy(bytes);
                let recovered = recover_entries(&text);
                tracing::warn!(
                    target: "ingest",
                    source = %self.source.name,
                    error = %e,
                    recovered = recovered.len(),
                    "malformed feed, keeping recoverable entries"
                );
                counter!("ingest_feed_recovered_total").increment(1);
                recovered
            }
        };

        let cap = self.source.item_cap();
        let mut out = Vec::new();
        for e in entries.into_iter().take(cap) {
            let url = e.link.trim().to_string();
            if url.is_empty() {
                continue;
            }
            let rec = RawRecord {
                title: normalize_text(&e.title),
                body: normalize_text(&e.body),
                contributors: e
                    .authors
                    .iter()
                    .map(|a| normalize_text(&display_name(a)))
                    .filter(|a| !a.is_empty())
                    .collect(),
                url,
                published: parse_timestamp(&e.date),
                source: self.source.name.clone(),
                category: self.source.category,
            };
            if self.source.category == SourceCategory::Safety
                && !passes_safety_filter(
                    &self.source,
                    &format!("{} {}", rec.title, rec.body),
                    &self.safety_keywords,
                )
            {
                continue;
            }
            out.push(rec);
        }

        histogram!("ingest_parse_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        counter!("mining_records_total").increment(out.len() as u64);
        out
    }
}

#[async_trait]
impl SourceAdapter for FeedAdapter {
    async fn fetch_records(&self) -> Result<Vec<RawRecord>> {
        match &self.mode {
            Mode::Fixture(xml) => Ok(self.parse_records(xml.as_bytes())),
            Mode::Http { client } => {
                tracing::info!(target: "ingest", source = %self.source.name, "fetching feed");
                let bytes = client
                    .get(&self.source.url)
                    .send()
                    .await
                    .context("feed http get()")?
                    .error_for_status()
                    .context("feed http status")?
                    .bytes()
                    .await
                    .context("feed http .bytes()")?;
                Ok(self.parse_records(&bytes))
            }
        }
    }

    fn name(&self) -> &str {
        &self.source.name
    }

    fn category(&self) -> SourceCategory {
        self.source.category
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Link,
    Body,
    Author,
    Date,
}

fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Streaming scan that keeps every entry closed before the first XML error.
pub(crate) fn recover_entries(xml: &str) -> Vec<PartialEntry> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut out = Vec::new();
    let mut cur: Option<PartialEntry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if cur.is_none() {
                    if matches!(e.local_name().as_ref(), b"item" | b"entry") {
                        cur = Some(PartialEntry::default());
                    }
                    continue;
                }
                let Some(entry) = cur.as_mut() else { continue };
                field = match e.local_name().as_ref() {
                    b"title" => Some(Field::Title),
                    b"link" => {
                        if let Some(h) = attr(&e, "href") {
                            entry.offer_link(&h, attr(&e, "rel").as_deref());
                        }
                        Some(Field::Link)
                    }
                    b"description" | b"summary" | b"content" | b"encoded" => Some(Field::Body),
                    b"author" | b"creator" | b"name" => Some(Field::Author),
                    b"pubDate" | b"published" | b"updated" | b"date" => Some(Field::Date),
                    _ => field,
                };
            }
            Ok(Event::Empty(e)) => {
                if let (Some(entry), b"link") = (cur.as_mut(), e.local_name().as_ref()) {
                    if let Some(h) = attr(&e, "href") {
                        entry.offer_link(&h, attr(&e, "rel").as_deref());
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let text = t.unescape().map(|c| c.into_owned()).unwrap_or_default();
                push_text(cur.as_mut(), field, text);
            }
            Ok(Event::CData(c)) => {
                let text = String::from_utf8_lossy(&c).into_owned();
                push_text(cur.as_mut(), field, text);
            }
            Ok(Event::End(e)) => {
                if matches!(e.local_name().as_ref(), b"item" | b"entry") {
                    if let Some(done) = cur.take() {
                        out.push(done);
                    }
                }
                field = None;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::debug!(
                    target: "ingest",
                    error = %e,
                    position = reader.buffer_position(),
                    "feed scan stopped at xml error"
                );
                break;
            }
            Ok(_) => {}
        }
    }
    out
}

fn push_text(entry: Option<&mut PartialEntry>, field: Option<Field>, text: String) {
    let (Some(entry), Some(field)) = (entry, field) else {
        return;
    };
    if text.trim().is_empty() {
        return;
    }
    match field {
        Field::Title => entry.title.push_str(&text),
        Field::Link => entry.offer_link(&text, None),
        Field::Body => {
            if entry.body.is_empty() {
                entry.body = text;
            }
        }
        Field::Author => entry.authors.push(text.trim().to_string()),
        Field::Date => {
            if entry.date.is_empty() {
                entry.date = text.trim().to_string();
            }
        }
    }
}
