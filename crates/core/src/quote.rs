//! Quote supersession chains.
//!
//! Quotes form singly-linked lists through `supersedes_id`, terminating at
//! version 1. Which quote is current is never stored; it is the head of its
//! chain after [`group_into_chains`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "DRAFT",
            QuoteStatus::Sent => "SENT",
            QuoteStatus::Accepted => "ACCEPTED",
            QuoteStatus::Expired => "EXPIRED",
        }
    }
}

impl FromStr for QuoteStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRAFT" => Ok(QuoteStatus::Draft),
            "SENT" => Ok(QuoteStatus::Sent),
            "ACCEPTED" => Ok(QuoteStatus::Accepted),
            "EXPIRED" => Ok(QuoteStatus::Expired),
            other => Err(CoreError::Validation(format!("Invalid quote status '{other}'"))),
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Versioning
// ---------------------------------------------------------------------------

/// Version for a new quote given the version of the quote it supersedes.
pub fn next_version(superseded_version: Option<i32>) -> i32 {
    superseded_version.map_or(1, |v| v + 1)
}

/// Validate an ISO 4217-style currency code (three uppercase ASCII letters).
pub fn validate_currency(code: &str) -> Result<(), validator::ValidationError> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("currency")
            .with_message("Currency must be a three-letter uppercase code".into()))
    }
}

// ---------------------------------------------------------------------------
// Chain grouping
// ---------------------------------------------------------------------------

/// Anything that participates in a supersession chain.
pub trait ChainLink {
    fn id(&self) -> DbId;
    fn supersedes_id(&self) -> Option<DbId>;
    fn version(&self) -> i32;
    fn created_at(&self) -> Timestamp;
}

/// Group quotes by chain root, newest version first within each chain, and
/// chains ordered by their most recently created quote.
///
/// The root of a quote is found by following `supersedes_id` while the
/// target is part of `quotes`. Links pointing outside the set end the walk,
/// so a partial history still groups consistently.
pub fn group_into_chains<T: ChainLink>(quotes: Vec<T>) -> Vec<Vec<T>> {
    let parents: HashMap<DbId, Option<DbId>> =
        quotes.iter().map(|q| (q.id(), q.supersedes_id())).collect();

    let root_of = |start: DbId| -> DbId {
        let mut current = start;
        let mut seen = HashSet::new();
        while seen.insert(current) {
            match parents.get(&current).copied().flatten() {
                Some(parent) if parents.contains_key(&parent) => current = parent,
                _ => break,
            }
        }
        current
    };

    let mut order: Vec<DbId> = Vec::new();
    let mut groups: HashMap<DbId, Vec<T>> = HashMap::new();
    for quote in quotes {
        let root = root_of(quote.id());
        groups
            .entry(root)
            .or_insert_with(|| {
                order.push(root);
                Vec::new()
            })
            .push(quote);
    }

    let mut chains: Vec<Vec<T>> = order
        .into_iter()
        .filter_map(|root| groups.remove(&root))
        .map(|mut chain| {
            chain.sort_by(|a, b| {
                b.version()
                    .cmp(&a.version())
                    .then_with(|| b.created_at().cmp(&a.created_at()))
            });
            chain
        })
        .collect();

    chains.sort_by(|a, b| latest_created(b).cmp(&latest_created(a)));
    chains
}

fn latest_created<T: ChainLink>(chain: &[T]) -> Option<Timestamp> {
    chain.iter().map(ChainLink::created_at).max()
}

/// Whether a head-first chain has strictly decreasing, contiguous versions
/// ending at 1, with each element superseding the next.
pub fn is_well_formed(chain: &[impl ChainLink]) -> bool {
    let Some(last) = chain.last() else {
        return false;
    };
    if last.version() != 1 || last.supersedes_id().is_some() {
        return false;
    }
    chain.windows(2).all(|pair| {
        pair[0].version() == pair[1].version() + 1 && pair[0].supersedes_id() == Some(pair[1].id())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
