use chrono::{Days, NaiveDateTime};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::entry::BackupEntry;

/// Oldest age, in days, that is searched for a matching date (40 years).
pub const MAX_SCAN_DAYS: u32 = 365 * 40;

const DAYS_PER_WEEK: u64 = 7;
const DAYS_PER_MONTH_SLOT: u32 = 28;
const DAYS_PER_YEAR: u64 = 365;

// Extra days accepted at the end of each generation window so that the day a
// coarser slot boundary falls on is not pushed into the next generation. A
// monthly window is 30 days per month (not 28) so February never loses its
// monthly backup.
const WEEKLY_SLACK_DAYS: u64 = 1;
const MONTHLY_WINDOW_DAYS: u64 = 30;
const MONTHLY_SLACK_DAYS: u64 = 3;
const YEARLY_SLACK_DAYS: u64 = 2;

/// How many generations of each kind to keep.
///
/// Each count is in its own unit: days, weeks, months and years. Zero turns
/// the generation off, so entries that would have landed there fall through
/// to the next enabled generation or become obsolete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetentionPolicy {
    pub daily: u32,
    pub weekly: u32,
    pub monthly: u32,
    pub yearly: u32,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(7, 12, 6, 5)
    }
}

impl RetentionPolicy {
    pub fn new(daily: u32, weekly: u32, monthly: u32, yearly: u32) -> Self {
        Self {
            daily,
            weekly,
            monthly,
            yearly,
        }
    }

    /// Map an age in days to its generation and the slot within it.
    pub fn generation_for(&self, days_ago: u32) -> (Generation, u32) {
        let age = u64::from(days_ago);

        if self.daily > 0 && age <= u64::from(self.daily) {
            return (Generation::Daily, days_ago);
        }
        if self.weekly > 0 && age <= u64::from(self.weekly) * DAYS_PER_WEEK + WEEKLY_SLACK_DAYS {
            return (Generation::Weekly, days_ago / DAYS_PER_WEEK as u32);
        }
        if self.monthly > 0
            && age <= u64::from(self.monthly) * MONTHLY_WINDOW_DAYS + MONTHLY_SLACK_DAYS
        {
            return (Generation::Monthly, days_ago / DAYS_PER_MONTH_SLOT);
        }
        if self.yearly > 0 && age <= u64::from(self.yearly) * DAYS_PER_YEAR + YEARLY_SLACK_DAYS {
            return (Generation::Yearly, days_ago / DAYS_PER_YEAR as u32);
        }
        (Generation::Obsolete, 0)
    }
}

/// Coarseness tier of the retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Generation {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Obsolete,
}

impl Generation {
    pub const ALL: [Generation; 5] = [
        Generation::Daily,
        Generation::Weekly,
        Generation::Monthly,
        Generation::Yearly,
        Generation::Obsolete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Daily => "daily",
            Generation::Weekly => "weekly",
            Generation::Monthly => "monthly",
            Generation::Yearly => "yearly",
            Generation::Obsolete => "obsolete",
        }
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entries of one series, sorted into generation → slot → entries.
///
/// Within a slot, entries keep the order in which they were classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationBuckets {
    generations: BTreeMap<Generation, BTreeMap<u32, Vec<BackupEntry>>>,
}

impl Default for GenerationBuckets {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationBuckets {
    pub fn new() -> Self {
        Self {
            generations: Generation::ALL
                .iter()
                .map(|generation| (*generation, BTreeMap::new()))
                .collect(),
        }
    }

    pub fn push(&mut self, generation: Generation, slot: u32, entry: BackupEntry) {
        self.generations
            .entry(generation)
            .or_default()
            .entry(slot)
            .or_default()
            .push(entry);
    }

    /// All slots of one generation.
    pub fn generation(&self, generation: Generation) -> &BTreeMap<u32, Vec<BackupEntry>> {
        &self.generations[&generation]
    }

    pub fn slot(&self, generation: Generation, slot: u32) -> Option<&[BackupEntry]> {
        self.generations
            .get(&generation)
            .and_then(|slots| slots.get(&slot))
            .map(Vec::as_slice)
    }

    /// Every non-empty slot, ordered by generation then slot index.
    pub fn slots(&self) -> impl Iterator<Item = (Generation, u32, &[BackupEntry])> + '_ {
        self.generations.iter().flat_map(|(generation, slots)| {
            slots
                .iter()
                .map(move |(slot, entries)| (*generation, *slot, entries.as_slice()))
        })
    }

    /// Total number of classified entries.
    pub fn entry_count(&self) -> usize {
        self.slots().map(|(_, _, entries)| entries.len()).sum()
    }
}

/// Result of classifying one series.
#[derive(Debug, Clone)]
pub struct Classification {
    pub buckets: GenerationBuckets,
    /// Entries no day within [`MAX_SCAN_DAYS`] matched. They are neither kept
    /// nor pruned.
    pub unclassified: Vec<BackupEntry>,
}

/// Sort the entries of one series into generations and slots.
///
/// Walks back one day at a time from `now`. An entry is assigned on the first
/// (most recent) day it matches and is then taken out of the search, so every
/// entry is classified at most once. The walk stops when no entries are left
/// or after [`MAX_SCAN_DAYS`].
pub fn classify_by_retention(
    entries: Vec<BackupEntry>,
    policy: &RetentionPolicy,
    now: NaiveDateTime,
) -> Classification {
    let today = now.date();
    let mut remaining = entries;
    let mut buckets = GenerationBuckets::new();
    let mut days_ago: u32 = 0;

    while !remaining.is_empty() && days_ago < MAX_SCAN_DAYS {
        let Some(day) = today.checked_sub_days(Days::new(u64::from(days_ago))) else {
            break;
        };
        let stamp = day.format("%Y-%m-%d").to_string();

        if remaining.iter().any(|entry| entry.matches_day(&stamp)) {
            let (generation, slot) = policy.generation_for(days_ago);
            let (matched, rest): (Vec<_>, Vec<_>) = remaining
                .into_iter()
                .partition(|entry| entry.matches_day(&stamp));
            for entry in matched {
                debug!("{} is {} days old: {} #{}", entry, days_ago, generation, slot);
                buckets.push(generation, slot, entry);
            }
            remaining = rest;
        }
        days_ago += 1;
    }

    if !remaining.is_empty() {
        warn!(
            "There are {} files that cannot be sorted into time buckets!",
            remaining.len()
        );
        for entry in &remaining {
            warn!("  {}", entry.original_path().display());
        }
    }

    Classification {
        buckets,
        unclassified: remaining,
    }
}
