use super::IncidentRecord;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;

/// Group name that stands for "no attributed group"; never ranked
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Number of groups kept in the ranked aggregate
pub const TOP_GROUPS: usize = 10;

/// Key -> number of records carrying that key
pub type CountMap = HashMap<String, u32>;

/// One ranked entry of the group aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub group: String,
    pub count: u32,
}

/// Count records per key.
///
/// Counting is commutative, so workers fold their own partial maps and the
/// partials are summed; the result does not depend on record order.
pub fn count_by<'a, F>(records: &[&'a IncidentRecord], key: F) -> CountMap
where
    F: Fn(&'a IncidentRecord) -> &'a str + Sync,
{
    let borrowed: HashMap<&'a str, u32> = records
        .par_iter()
        .fold(HashMap::new, |mut acc, record| {
            *acc.entry(key(*record)).or_insert(0) += 1;
            acc
        })
        .reduce(HashMap::new, |mut acc, partial| {
            for (k, n) in partial {
                *acc.entry(k).or_insert(0) += n;
            }
            acc
        });

    borrowed
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect()
}

/// Incidents per country for an already year-filtered slice
pub fn country_aggregate(records: &[&IncidentRecord]) -> CountMap {
    count_by(records, |r| r.country_name.as_str())
}

/// Top groups for an already year-filtered slice.
///
/// `Unknown` is dropped, entries are ordered by count descending and then by
/// group name ascending, and only the first [`TOP_GROUPS`] are kept.
pub fn group_aggregate(records: &[&IncidentRecord]) -> Vec<GroupCount> {
    let mut counts = count_by(records, |r| r.group_name.as_str());
    counts.remove(UNKNOWN_GROUP);

    let mut ranked: Vec<GroupCount> = counts
        .into_iter()
        .map(|(group, count)| GroupCount { group, count })
        .collect();
    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.group.cmp(&b.group)));
    ranked.truncate(TOP_GROUPS);
    ranked
}
