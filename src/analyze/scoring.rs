//! Signal-based relevance score.
//!
//! Every rule yields explanation lines with the points they contributed; the
//! total is just their sum, so the score can always be recomputed from the
//! explanation list. Rules are independent and additive:
//!
//! 1. watchlist author       +100 each
//! 2. watchlist organization +50 each
//! 3. code reference         min(stars/10, 100), or +10 when stars are 0 or unknown
//! 4. model reference        min(likes/5, 100), nothing when 0 or unknown
//! 5. channels               0 points, one line listing the names

use std::collections::BTreeMap;

use crate::analyze::watchlist::WatchlistHits;
use crate::item::{Item, ReferenceKind, Signal};
use crate::reputation::ReputationResult;

pub const AUTHOR_POINTS: u32 = 100;
pub const ORG_POINTS: u32 = 50;
pub const CODE_AVAILABLE_POINTS: u32 = 10;
pub const REFERENCE_POINTS_CAP: u32 = 100;
pub const STARS_PER_POINT: u64 = 10;
pub const LIKES_PER_POINT: u64 = 5;

/// Final score and the ordered explanation list it was summed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreCard {
    pub score: u32,
    pub signals: Vec<Signal>,
}

pub type ReputationMap = BTreeMap<ReferenceKind, ReputationResult>;

pub fn score(
    item: &Item,
    reputation: &ReputationMap,
    hits: &WatchlistHits,
    channels: &[String],
) -> ScoreCard {
    let mut signals = author_signals(hits);
    signals.extend(org_signals(hits));
    signals.extend(code_signal(item, reputation));
    signals.extend(model_signal(item, reputation));
    signals.extend(channel_signal(channels));

    let score = signals.iter().map(|s| s.points).sum();
    ScoreCard { score, signals }
}

/// Score `item` in place and record its channels.
pub fn apply(item: &mut Item, reputation: &ReputationMap, hits: &WatchlistHits, channels: Vec<String>) {
    let card = score(item, reputation, hits, &channels);
    item.score = card.score;
    item.signals = card.signals;
    item.channels = channels;
}

fn author_signals(hits: &WatchlistHits) -> Vec<Signal> {
    hits.authors
        .iter()
        .map(|a| Signal::new(format!("Star Author: {}", a.name), AUTHOR_POINTS))
        .collect()
}

fn org_signals(hits: &WatchlistHits) -> Vec<Signal> {
    hits.organizations
        .iter()
        .map(|o| Signal::new(format!("Org Mention: {}", o.name), ORG_POINTS))
        .collect()
}

fn capped_points(value: u64, per_point: u64) -> u32 {
    (value / per_point).min(REFERENCE_POINTS_CAP as u64) as u32
}

// A failed lookup and a genuinely unstarred repo both land on the flat bonus.
fn code_signal(item: &Item, reputation: &ReputationMap) -> Option<Signal> {
    if !item.references.contains_key(&ReferenceKind::Code) {
        return None;
    }
    let stars = reputation
        .get(&ReferenceKind::Code)
        .map(|r| r.value)
        .unwrap_or(0);
    if stars > 0 {
        let pts = capped_points(stars, STARS_PER_POINT);
        Some(Signal::new(format!("GitHub: {stars} stars (+{pts})"), pts))
    } else {
        Some(Signal::new("Code Available", CODE_AVAILABLE_POINTS))
    }
}

fn model_signal(item: &Item, reputation: &ReputationMap) -> Option<Signal> {
    if !item.references.contains_key(&ReferenceKind::Model) {
        return None;
    }
    let likes = reputation
        .get(&ReferenceKind::Model)
        .filter(|r| r.fresh)
        .map(|r| r.value)
        .unwrap_or(0);
    (likes > 0).then(|| {
        let pts = capped_points(likes, LIKES_PER_POINT);
        Signal::new(format!("HF Likes: {likes} (+{pts})"), pts)
    })
}

fn channel_signal(channels: &[String]) -> Option<Signal> {
    (!channels.is_empty()).then(|| Signal::new(format!("Channels: {}", channels.join(", ")), 0))
}
