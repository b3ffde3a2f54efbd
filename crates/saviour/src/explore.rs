//! The explore page: its donor directory and the state other pages hand it.
//!
//! The directory is a fixed list of donors, separate from the registry, that
//! can be searched and asked for help. The find page leaves search criteria
//! under the filters key for the explore page to pick up exactly once, and
//! donation requests accumulate under the requests key for the badge on the
//! profile button.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::sanitize::escape_html;
use crate::storage::KeyValueStore;

/// Shown when a help request is sent without a message.
pub const EMPTY_REQUEST: &str = "Write a message first.";

/// Shown once a help request has been accepted.
pub const REQUEST_SENT: &str = "Request sent (demo).";

/// A donor listed in the explore directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Donor name.
    pub name: &'static str,
    /// Blood group code.
    pub bg: &'static str,
    /// Neighbourhood.
    pub area: &'static str,
    /// City.
    pub city: &'static str,
    /// Date of the last donation.
    pub last: &'static str,
    /// Avatar image URL.
    pub img: &'static str,
}

impl DirectoryEntry {
    const fn new(
        name: &'static str,
        bg: &'static str,
        area: &'static str,
        city: &'static str,
        last: &'static str,
        img: &'static str,
    ) -> Self {
        Self {
            name,
            bg,
            area,
            city,
            last,
            img,
        }
    }

    /// Whether `query` occurs, ignoring case, in the name, group, area and
    /// city run together.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let haystack = [self.name, self.bg, self.area, self.city].concat();
        haystack.to_lowercase().contains(&query.to_lowercase())
    }
}

/// The explore directory, in display order.
pub const DIRECTORY: [DirectoryEntry; 10] = [
    DirectoryEntry::new("Tashdid Rahman", "A+", "Bashundhara River View", "Dhaka", "23 Jan 2023", "https://i.pravatar.cc/100?u=tashdid"),
    DirectoryEntry::new("Maisha Himadri Khan", "O+", "South Azampur", "Dhaka", "06 Apr 2022", "https://i.pravatar.cc/100?u=maisha"),
    DirectoryEntry::new("Minhajul Islam Mukit", "AB+", "Majidee Bazar", "Chittagong", "19 Jul 2022", "https://i.pravatar.cc/100?u=minhajul"),
    DirectoryEntry::new("Alvy Rahman Niloy", "B+", "Mirpur-6", "Dhaka", "26 Feb 2023", "https://i.pravatar.cc/100?u=alvy"),
    DirectoryEntry::new("Sorifa Akter", "O-", "Banani", "Dhaka", "11 Mar 2022", "https://i.pravatar.cc/100?u=sorifa"),
    DirectoryEntry::new("Rashed Kibria", "A-", "Gulshan", "Dhaka", "02 Jan 2023", "https://i.pravatar.cc/100?u=rashed"),
    DirectoryEntry::new("Farzana Hossain", "B-", "Cox\u{2019}s Bazar", "Cox\u{2019}s Bazar", "15 Aug 2022", "https://i.pravatar.cc/100?u=farzana"),
    DirectoryEntry::new("Imran Chowdhury", "AB-", "Noakhali", "Noakhali", "04 May 2022", "https://i.pravatar.cc/100?u=imran"),
    DirectoryEntry::new("Sadia Noor", "O+", "Dhanmondi", "Dhaka", "30 Sep 2022", "https://i.pravatar.cc/100?u=sadia"),
    DirectoryEntry::new("Mizanur Rahman", "A+", "Khilgaon", "Dhaka", "12 Dec 2022", "https://i.pravatar.cc/100?u=mizanur"),
];

/// Directory entries matching `query`, with their directory index.
///
/// An empty query matches everything.
#[must_use]
pub fn search_directory(query: &str) -> Vec<(usize, &'static DirectoryEntry)> {
    DIRECTORY
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.matches(query))
        .collect()
}

/// Render a directory entry as an escaped HTML card.
#[must_use]
pub fn render_entry(index: usize, entry: &DirectoryEntry) -> String {
    let name = escape_html(entry.name);
    let area = escape_html(entry.area);
    let city = escape_html(entry.city);
    format!(
        r#"<div class="dcard">
  <div class="dcard-top">
    <div class="avatar-wrap"><div class="avatar"><img src="{img}" alt="{name}"></div></div>
    <div class="dinfo">
      <div class="dname">{name}</div>
      <div class="dmeta">📍 {area}, {city} <br> Division: {city} <br> District: {city}</div>
    </div>
    <div class="blood-box">
      <div class="blood-circle">{bg}</div>
      <div class="blood-label">Blood group</div>
    </div>
  </div>
  <button class="ask-btn" data-index="{index}">Ask for help</button>
  <div class="donation-ribbon">Last date of donation {last}</div>
</div>"#,
        img = escape_html(entry.img),
        bg = escape_html(entry.bg),
        last = escape_html(entry.last),
    )
}

/// Ask the directory donor at `index` for help.
///
/// Nothing is sent anywhere; an accepted request only yields the
/// confirmation text.
///
/// # Errors
///
/// Returns a validation error if `message` is blank, or a not-found error if
/// `index` is outside the directory.
pub fn ask(index: usize, message: &str) -> Result<&'static str> {
    let entry = DIRECTORY.get(index).ok_or(Error::DonorNotFound {
        id: i64::try_from(index).unwrap_or(i64::MAX),
    })?;
    if message.trim().is_empty() {
        return Err(Error::validation(EMPTY_REQUEST));
    }
    info!(to = entry.name, "Help request sent");
    Ok(REQUEST_SENT)
}

/// Search criteria saved by the find page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedSearch {
    /// Blood group.
    pub bg: Option<String>,
    /// Division.
    pub div: Option<String>,
    /// District.
    pub dist: Option<String>,
}

impl SavedSearch {
    /// The criteria as a single search query.
    #[must_use]
    pub fn query(&self) -> String {
        let parts = [&self.bg, &self.div, &self.dist].map(|p| p.as_deref().unwrap_or(""));
        parts.join(" ").trim().to_string()
    }
}

/// Read and remove the saved search under `key`.
///
/// Returns the combined query, or `None` when nothing usable was saved. The
/// key is removed whenever it was present, even if the payload was malformed.
pub fn take_saved_search(store: &impl KeyValueStore, key: &str) -> Option<String> {
    let raw = match store.get_item(key) {
        Ok(raw) => raw?,
        Err(e) => {
            warn!(key, error = %e, "Could not read saved search");
            return None;
        }
    };

    let query = match serde_json::from_str::<SavedSearch>(&raw) {
        Ok(search) => Some(search.query()),
        Err(e) => {
            error!(key, error = %e, "Invalid saved filters");
            None
        }
    };

    if let Err(e) = store.remove_item(key) {
        warn!(key, error = %e, "Could not clear saved search");
    }
    query
}

/// Number of pending donation requests stored under `key`.
///
/// Anything other than a JSON array counts as zero.
pub fn pending_request_count(store: &impl KeyValueStore, key: &str) -> usize {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return 0,
        Err(e) => {
            warn!(key, error = %e, "Could not read pending requests");
            return 0;
        }
    };

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(items)) => items.len(),
        Ok(_) => 0,
        Err(e) => {
            warn!(key, error = %e, "Pending requests are corrupt");
            0
        }
    }
}
