use chrono::{Local, NaiveDateTime};
use tracing::debug;

use crate::entry::BackupEntry;
use crate::error::Error;
use crate::retention::{classify_by_retention, Generation, GenerationBuckets, RetentionPolicy};
use crate::series::split_into_series;

/// The entry kept for one (series, generation, slot).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Survivor {
    pub series: String,
    pub generation: Generation,
    pub slot: u32,
    pub entry: BackupEntry,
}

#[derive(Debug, Clone, Default)]
pub struct PrunePlan {
    pub survivors: Vec<Survivor>,
    pub to_prune: Vec<BackupEntry>,
    /// Entries whose date could not be matched. They are left alone.
    pub unclassified: Vec<BackupEntry>,
}

/// Keep the first entry of every slot and return the rest for pruning.
pub fn select_survivors(
    series: &str,
    buckets: &GenerationBuckets,
) -> (Vec<Survivor>, Vec<BackupEntry>) {
    let mut survivors = Vec::new();
    let mut to_prune = Vec::new();

    for (generation, slot, entries) in buckets.slots() {
        let Some((keep, rest)) = entries.split_first() else {
            continue;
        };
        debug!("keep file {} ({} #{})", keep, generation, slot);
        survivors.push(Survivor {
            series: series.to_string(),
            generation,
            slot,
            entry: keep.clone(),
        });
        to_prune.extend(rest.iter().cloned());
    }

    (survivors, to_prune)
}

/// Work out which entries to keep and which to prune as of `now`.
///
/// The given slice is not modified. Fails with [`Error::EmptyInput`] when
/// `entries` is empty.
pub fn plan_prune(
    entries: &[BackupEntry],
    policy: &RetentionPolicy,
    now: NaiveDateTime,
) -> Result<PrunePlan, Error> {
    if entries.is_empty() {
        return Err(Error::EmptyInput);
    }

    let series = split_into_series(entries);
    debug!(
        "Sorted {} files into {} series with {} files in them.",
        entries.len(),
        series.len(),
        series
            .values()
            .map(|members| members.len().to_string())
            .collect::<Vec<_>>()
            .join("/")
    );

    let mut plan = PrunePlan::default();
    for (name, members) in series {
        debug!("Checking series {}", name);
        let classification = classify_by_retention(members, policy, now);
        let (survivors, to_prune) = select_survivors(&name, &classification.buckets);
        plan.survivors.extend(survivors);
        plan.to_prune.extend(to_prune);
        plan.unclassified.extend(classification.unclassified);
    }

    Ok(plan)
}

/// List the entries that are redundant under `policy` as of the current local time.
pub fn list_entries_to_prune(
    entries: &[BackupEntry],
    policy: &RetentionPolicy,
) -> Result<Vec<BackupEntry>, Error> {
    let plan = plan_prune(entries, policy, Local::now().naive_local())?;
    Ok(plan.to_prune)
}
