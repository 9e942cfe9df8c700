// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth, optional identity) → Protected (bearer token required).
// The guard is applied per router in server.rs, so handlers in `protected`
// can rely on an `Extension<Principal>` being present.

pub mod protected; // Tier 2: bearer token required
pub mod public; // Tier 1: open routes, rate limited where abuse is likely

use crate::models::slug::{slugify, unique_slug};

/// Slug derived from `text` that none of `existing` already uses.
/// `fallback` stands in when `text` has no sluggable characters.
pub(crate) fn fresh_slug<'a, I>(text: &str, fallback: &str, existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = existing.into_iter().collect();
    let base = match slugify(text) {
        base if base.is_empty() => slugify(fallback),
        base => base,
    };
    unique_slug(&base, |candidate| taken.contains(&candidate))
}
