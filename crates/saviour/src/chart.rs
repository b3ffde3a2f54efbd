//! Dashboard chart data.

use serde::Serialize;

use crate::donor::DonorRecord;

/// Bucket for donors without a blood group.
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Month labels of the activity chart.
pub const ACTIVITY_LABELS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

/// Historical new-donor counts; the current total is appended as the last point.
const ACTIVITY_HISTORY: [usize; 5] = [12, 19, 8, 15, 22];

/// Donor count for one blood group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    /// Blood group code, or [`UNKNOWN_BUCKET`].
    pub group: String,
    /// Number of donors in the group.
    pub count: usize,
}

/// Line chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivitySeries {
    /// X-axis labels.
    pub labels: Vec<&'static str>,
    /// Y values, one per label.
    pub values: Vec<usize>,
}

/// Data behind the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// Total number of donors.
    pub total_donors: usize,
    /// Blood group distribution.
    pub groups: Vec<GroupCount>,
    /// New donors per month.
    pub activity: ActivitySeries,
}

/// Count donors per blood group, in order of first appearance.
///
/// Missing or blank groups are counted under [`UNKNOWN_BUCKET`].
#[must_use]
pub fn group_counts(records: &[DonorRecord]) -> Vec<GroupCount> {
    let mut counts: Vec<GroupCount> = Vec::new();
    for donor in records {
        let group = donor
            .group
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(UNKNOWN_BUCKET);
        match counts.iter_mut().find(|c| c.group == group) {
            Some(entry) => entry.count += 1,
            None => counts.push(GroupCount {
                group: group.to_string(),
                count: 1,
            }),
        }
    }
    counts
}

/// Monthly activity ending with the current donor total.
#[must_use]
pub fn activity(total: usize) -> ActivitySeries {
    let mut values = ACTIVITY_HISTORY.to_vec();
    values.push(total);
    ActivitySeries {
        labels: ACTIVITY_LABELS.to_vec(),
        values,
    }
}

/// Build the dashboard for `records`.
#[must_use]
pub fn dashboard(records: &[DonorRecord]) -> Dashboard {
    Dashboard {
        total_donors: records.len(),
        groups: group_counts(records),
        activity: activity(records.len()),
    }
}
