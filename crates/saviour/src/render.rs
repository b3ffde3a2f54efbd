//! Donor search and HTML projection.
//!
//! [`filter`] is the one query every view shares. The `render_*` functions
//! turn donors into markup fragments; they never mutate a record, and every
//! text field goes through [`escape_html`](crate::sanitize::escape_html)
//! before it is embedded.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::donor::DonorRecord;
use crate::sanitize::{escape_html, escape_opt};

/// Fallback shown in place of an avatar image.
const AVATAR_PLACEHOLDER: &str = "<span>👤</span>";

/// Presentation variant for a donor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Full card with badge, footer and "Ask" button.
    #[default]
    Card,
    /// Compact list row with a "Contact" button.
    Light,
}

/// Donors whose name, blood group or city contains `query`.
///
/// Matching is a case-insensitive substring test on the trimmed query. An
/// empty query matches every donor. Order is preserved.
///
/// ```
/// use saviour::donor::DonorRecord;
/// use saviour::render::filter;
///
/// let donors = vec![DonorRecord::new(1, "Karim", "Dhaka", "A+")];
/// assert_eq!(filter(&donors, "DHAKA").len(), 1);
/// assert!(filter(&donors, "b+").is_empty());
/// ```
#[must_use]
pub fn filter<'a>(records: &'a [DonorRecord], query: &str) -> Vec<&'a DonorRecord> {
    let needle = query.trim().to_lowercase();
    records.iter().filter(|d| d.matches(&needle)).collect()
}

/// Full donor card.
#[must_use]
pub fn render_card(donor: &DonorRecord) -> String {
    let id = donor.id;
    let name = escape_html(donor.display_name());
    let city = escape_html(donor.display_city());
    let group = escape_html(donor.display_group());
    let last = escape_opt(donor.last_donation.as_deref());
    let avatar = avatar_img(donor, "");

    format!(
        r#"<article class="donor-card liquid-glass" data-id="{id}">
  <div class="card-body">
    <div class="avatar" aria-hidden="true">{avatar}</div>
    <div class="info">
      <div class="donor-name">{name}</div>
      <div class="donor-sub">{city}</div>
      <div class="text-xs text-slate-400 mt-2">Last: {last}</div>
    </div>
    <div class="right-side">
      <div class="blood-badge">{group}</div>
      <button class="btn-ask mt-4 btn-action" data-action="contact" data-id="{id}" aria-label="Ask {name}">Ask</button>
    </div>
  </div>
  <div class="donor-footer">Last date of donation {last}</div>
</article>"#
    )
}

/// Compact donor row.
#[must_use]
pub fn render_light(donor: &DonorRecord) -> String {
    let id = donor.id;
    let name = escape_html(donor.display_name());
    let city = escape_html(donor.display_city());
    let group = escape_opt(donor.group.as_deref());
    let last = escape_opt(donor.last_donation.as_deref());
    let avatar = avatar_img(donor, r#" style="width:100%;height:100%;object-fit:cover;""#);

    format!(
        r#"<div class="flex items-start gap-4 mb-4 light-donor" data-id="{id}">
  <div class="w-14 h-14 rounded-full overflow-hidden border-2 border-white shadow-sm">{avatar}</div>
  <div class="flex-1">
    <div class="font-bold">{name}</div>
    <div class="text-xs text-slate-500">{city} · <span class="font-semibold">{group}</span></div>
    <div class="text-xs text-slate-400 mt-1">Last: {last}</div>
  </div>
  <div class="flex flex-col items-end gap-2">
    <button class="btn-ask btn-action" data-action="contact" data-id="{id}" aria-label="Contact {name}">Contact</button>
  </div>
</div>"#
    )
}

fn avatar_img(donor: &DonorRecord, extra_attrs: &str) -> String {
    match donor.avatar_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Some(url) => format!(
            r#"<img loading="lazy" src="{}" alt="{}"{extra_attrs} />"#,
            escape_html(url),
            escape_html(donor.name.as_deref().unwrap_or("Donor")),
        ),
        None => AVATAR_PLACEHOLDER.to_string(),
    }
}

/// Render one donor in the given variant.
#[must_use]
pub fn render_donor(donor: &DonorRecord, view: View) -> String {
    match view {
        View::Card => render_card(donor),
        View::Light => render_light(donor),
    }
}

/// Render the donors matching `query`, one fragment per line.
#[must_use]
pub fn render_list(records: &[DonorRecord], query: &str, view: View) -> String {
    let mut out = String::new();
    for donor in filter(records, query) {
        let _ = writeln!(out, "{}", render_donor(donor, view));
    }
    out
}

/// Render the first `limit` donors as light rows, unfiltered.
#[must_use]
pub fn render_feed(records: &[DonorRecord], limit: usize) -> String {
    let mut out = String::new();
    for donor in records.iter().take(limit) {
        let _ = writeln!(out, "{}", render_light(donor));
    }
    out
}

/// One-line plain text summary of a donor.
#[must_use]
pub fn summary_line(donor: &DonorRecord) -> String {
    format!(
        "{:>14}  {:<4} {:<28} {:<22} {}",
        donor.id,
        donor.display_group(),
        donor.display_name(),
        donor.display_city(),
        donor.last_donation.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Vec<DonorRecord> {
        vec![
            DonorRecord::new(3, "Rupa", "Khulna", "B+"),
            DonorRecord::new(2, "Nila", "Sylhet", "O-"),
            DonorRecord::new(1, "Karim", "Dhaka", "A+"),
        ]
    }

    fn ids(found: &[&DonorRecord]) -> Vec<i64> {
        found.iter().map(|d| d.id).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let donors = registry();
        assert_eq!(ids(&filter(&donors, "")), vec![3, 2, 1]);
        assert_eq!(ids(&filter(&donors, "   ")), vec![3, 2, 1]);
    }

    #[test]
    fn test_filter_case_insensitive() {
        let donors = registry();
        assert_eq!(filter(&donors, "dhaka"), filter(&donors, "DHAKA"));
        assert_eq!(ids(&filter(&donors, "DhAkA")), vec![1]);
    }

    #[test]
    fn test_filter_scenario() {
        let donors = vec![DonorRecord::new(1, "Karim", "Dhaka", "A+")];

        assert_eq!(ids(&filter(&donors, "karim")), vec![1]);
        assert!(filter(&donors, "b+").is_empty());
    }

    #[test]
    fn test_filter_matches_group_and_city() {
        let donors = registry();
        assert_eq!(ids(&filter(&donors, "o-")), vec![2]);
        assert_eq!(ids(&filter(&donors, "hul")), vec![3]);
    }

    #[test]
    fn test_filter_skips_missing_fields() {
        let donors: Vec<DonorRecord> = vec![serde_json::from_str(r#"{"id":9}"#).unwrap()];
        assert_eq!(filter(&donors, "").len(), 1);
        assert!(filter(&donors, "unknown").is_empty());
    }

    #[test]
    fn test_card_escapes_fields() {
        let donor = DonorRecord::new(5, "<b>Evil</b>", "Dhaka\"", "A+");
        let html = render_card(&donor);

        assert!(html.contains("&lt;b&gt;Evil&lt;&#x2F;b&gt;"));
        assert!(html.contains("Dhaka&quot;"));
        assert!(!html.contains("<b>Evil"));
        assert!(html.contains(r#"data-action="contact" data-id="5""#));
    }

    #[test]
    fn test_card_placeholders_for_missing_fields() {
        let donor: DonorRecord = serde_json::from_str(r#"{"id":9}"#).unwrap();
        let html = render_card(&donor);

        assert!(html.contains(r#"<div class="donor-name">Unknown</div>"#));
        assert!(html.contains(r#"<div class="blood-badge">N&#x2F;A</div>"#));
        assert!(html.contains("<span>👤</span>"));
    }

    #[test]
    fn test_card_avatar_image() {
        let mut donor = DonorRecord::new(1, "Karim", "Dhaka", "A+");
        donor.avatar_url = Some("https://i.pravatar.cc/140?img=3".to_string());
        let html = render_card(&donor);

        assert!(html.contains(r#"src="https:&#x2F;&#x2F;i.pravatar.cc&#x2F;140?img&#x3D;3""#));
        assert!(html.contains(r#"alt="Karim""#));
    }

    #[test]
    fn test_light_row() {
        let mut donor = DonorRecord::new(2, "Nila", "Sylhet", "O-");
        donor.last_donation = Some("05 Mar 2024".to_string());
        let html = render_light(&donor);

        assert!(html.contains("light-donor"));
        assert!(html.contains(r#"<span class="font-semibold">O-</span>"#));
        assert!(html.contains("Last: 05 Mar 2024"));
        assert!(html.contains(">Contact</button>"));
    }

    #[test]
    fn test_render_does_not_mutate() {
        let donor = DonorRecord::new(2, "Nila", "Sylhet", "O-");
        let before = donor.clone();
        let _ = render_card(&donor);
        let _ = render_light(&donor);
        assert_eq!(donor, before);
    }

    #[test]
    fn test_render_list_filters() {
        let donors = registry();
        let html = render_list(&donors, "sylhet", View::Light);

        assert_eq!(html.lines().filter(|l| l.contains("light-donor")).count(), 1);
        assert!(html.contains("Nila"));
    }

    #[test]
    fn test_render_feed_limits() {
        let donors = registry();
        let html = render_feed(&donors, 2);

        assert!(html.contains("Rupa"));
        assert!(html.contains("Nila"));
        assert!(!html.contains("Karim"));
    }

    #[test]
    fn test_summary_line() {
        let line = summary_line(&DonorRecord::new(1, "Karim", "Dhaka", "A+"));
        assert!(line.contains("Karim"));
        assert!(line.contains("A+"));
        assert!(line.trim_end().ends_with('-'));
    }
}
