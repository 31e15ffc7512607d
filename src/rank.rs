// src/rank.rs
//! Ranking: dedup by canonical URL, then a total order for deterministic output.
//!
//! - Dedup keeps the **first-seen** item per URL (input order = adapter invocation order).
//! - Sort: score desc, then publication time desc (undated items after dated ones),
//!   then URL asc.
//!
//! Threshold filtering is a caller-side view over the ranked slice; it never
//! mutates or reorders the collection.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::item::Item;

pub fn compare(a: &Item, b: &Item) -> Ordering {
    b.score
        .cmp(&a.score)
        // None < Some, so reversing puts undated items last
        .then_with(|| b.published.cmp(&a.published))
        .then_with(|| a.url.cmp(&b.url))
}

/// Drop later items whose URL was already seen. Returns the kept items and the drop count.
pub fn dedup_first_seen(items: Vec<Item>) -> (Vec<Item>, usize) {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut keep = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for it in items {
        if seen.insert(it.url.clone()) {
            keep.push(it);
        } else {
            dropped += 1;
        }
    }
    (keep, dropped)
}

pub fn sort_items(items: &mut [Item]) {
    items.sort_by(compare);
}

/// Dedup then sort.
pub fn rank(items: Vec<Item>) -> Vec<Item> {
    let (mut kept, _) = dedup_first_seen(items);
    sort_items(&mut kept);
    kept
}

pub fn above_threshold(items: &[Item], min_score: u32) -> Vec<&Item> {
    items.iter().filter(|it| it.score >= min_score).collect()
}

/// The digest view: at most `n` items scoring at least `min_score`.
pub fn top(items: &[Item], min_score: u32, n: usize) -> Vec<&Item> {
    let mut view = above_threshold(items, min_score);
    view.truncate(n);
    view
}
