//! The donor registry.
//!
//! The registry is the ordered list of donors shown by every view. It is
//! hydrated once from the key-value store, topped up with demo donors when it
//! holds fewer than the configured target, and written back after every
//! mutation. Storage failures are logged and otherwise ignored: the registry
//! keeps working from memory.

use std::collections::HashSet;

use chrono::{Local, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::{RegistryConfig, SeedPlacement};
use crate::donor::DonorRecord;
use crate::error::{Error, Result, StorageResult};
use crate::generator::DemoGenerator;
use crate::render;
use crate::storage::KeyValueStore;

/// Total jitter span, in degrees, applied to a registrant's city coordinate.
const REGISTRATION_JITTER: f64 = 0.05;

/// Coordinate used for cities the donate form does not know.
pub const FALLBACK_COORDINATES: (f64, f64) = (23.8, 90.4);

/// Cities the donate form can place on the map. Any other city is placed at
/// [`FALLBACK_COORDINATES`].
const REGISTRATION_CITIES: [(&str, (f64, f64)); 5] = [
    ("Dhaka", (23.8103, 90.4125)),
    ("Chittagong", (22.3569, 91.7832)),
    ("Sylhet", (24.8949, 91.8687)),
    ("Rajshahi", (24.3636, 88.6241)),
    ("Khulna", (22.8456, 89.5403)),
];

/// Base coordinate for a city entered on the donate form.
#[must_use]
pub fn registration_coordinates(city: &str) -> Option<(f64, f64)> {
    REGISTRATION_CITIES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(city.trim()))
        .map(|(_, coords)| *coords)
}

/// Names of the cities the donate form can geocode.
pub fn registration_cities() -> impl Iterator<Item = &'static str> {
    REGISTRATION_CITIES.iter().map(|(name, _)| *name)
}

/// Message shown when a registration form is incomplete.
pub const INCOMPLETE_FORM: &str = "Please complete all fields";

/// Read the donor list stored under `key`.
///
/// A missing key, an unreadable store, or a value that is not a JSON array
/// all yield an empty list. Within an array each record is decoded on its
/// own: unreadable records are skipped, numeric string ids are accepted, and
/// records without a usable id are given one after the highest stored id.
pub fn load_donors(store: &impl KeyValueStore, key: &str) -> Vec<DonorRecord> {
    let raw = match store.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "No stored donors");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Could not read stored donors, starting empty");
            return Vec::new();
        }
    };

    let items = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            warn!(key, "Stored donors are not a list, starting empty");
            return Vec::new();
        }
        Err(e) => {
            warn!(key, error = %e, "Stored donors are corrupt, starting empty");
            return Vec::new();
        }
    };

    let mut donors = Vec::with_capacity(items.len());
    let mut unnumbered = Vec::new();
    let mut max_id = 0;
    for (index, item) in items.into_iter().enumerate() {
        match decode_donor(item) {
            Ok((donor, true)) => {
                max_id = max_id.max(donor.id);
                donors.push(donor);
            }
            Ok((donor, false)) => {
                unnumbered.push(donors.len());
                donors.push(donor);
            }
            Err(e) => warn!(key, index, error = %e, "Skipping unreadable stored donor"),
        }
    }

    if !unnumbered.is_empty() {
        warn!(key, count = unnumbered.len(), "Assigning ids to stored donors without one");
        let mut next = max_id.saturating_add(1);
        for i in unnumbered {
            donors[i].id = next;
            next = next.saturating_add(1);
        }
    }
    donors
}

/// Decode one stored record, reporting whether it carried a usable id.
fn decode_donor(item: Value) -> serde_json::Result<(DonorRecord, bool)> {
    let Value::Object(mut fields) = item else {
        return serde_json::from_value(item).map(|donor| (donor, true));
    };
    let id = fields.remove("id").and_then(|id| match id {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });
    fields.insert("id".to_string(), Value::from(id.unwrap_or(0)));
    let donor = serde_json::from_value(Value::Object(fields))?;
    Ok((donor, id.is_some()))
}

/// Serialize `donors` and store them under `key`.
///
/// # Errors
///
/// Returns an error if the store rejects the write.
pub fn persist_donors(
    store: &impl KeyValueStore,
    key: &str,
    donors: &[DonorRecord],
) -> StorageResult<()> {
    let json = serde_json::to_string(donors)?;
    store.set_item(key, &json)
}

/// A registration submitted through the donate form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    /// Donor name.
    pub name: String,
    /// Blood group code.
    pub group: String,
    /// City.
    pub city: String,
}

impl Registration {
    /// Check that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns a validation error naming the form as incomplete.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.group.trim().is_empty() || self.city.trim().is_empty()
        {
            return Err(Error::validation(INCOMPLETE_FORM));
        }
        Ok(())
    }
}

/// In-memory donor list mirrored to a key-value store.
#[derive(Debug)]
pub struct Registry<S> {
    store: S,
    key: String,
    donors: Vec<DonorRecord>,
}

impl<S: KeyValueStore> Registry<S> {
    /// Load the registry stored under `key` without seeding it.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let donors = load_donors(&store, &key);
        Self { store, key, donors }
    }

    /// Load the registry, fill in missing donation dates, and top it up with
    /// demo donors as configured.
    pub fn open(
        store: S,
        key: impl Into<String>,
        config: &RegistryConfig,
        generator: &mut DemoGenerator,
    ) -> Self {
        let mut registry = Self::load(store, key);
        let filled = registry.fill_missing_dates(generator);
        let seeded = registry.seed_if_needed(config.demo_target, config.seed_placement, generator);
        if filled > 0 && seeded == 0 {
            registry.persist_or_warn();
        }
        info!(
            donors = registry.len(),
            seeded,
            location = %registry.store.location(),
            "Registry ready"
        );
        registry
    }

    /// Top the registry up to `target` donors with synthetic ones.
    ///
    /// Demo donors go ahead of or after the stored ones depending on
    /// `placement`. Returns the number of donors added; when it is non-zero
    /// the registry has been persisted.
    pub fn seed_if_needed(
        &mut self,
        target: usize,
        placement: SeedPlacement,
        generator: &mut DemoGenerator,
    ) -> usize {
        let missing = target.saturating_sub(self.donors.len());
        if missing == 0 {
            return 0;
        }

        let mut demo = generator.generate(missing);
        let mut taken: HashSet<i64> = self.donors.iter().map(|d| d.id).collect();
        let mut next = self
            .donors
            .iter()
            .chain(&demo)
            .map(|d| d.id)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        for donor in &mut demo {
            if !taken.insert(donor.id) {
                donor.id = next;
                taken.insert(next);
                next = next.saturating_add(1);
            }
        }

        match placement {
            SeedPlacement::Prepend => {
                demo.append(&mut self.donors);
                self.donors = demo;
            }
            SeedPlacement::Append => self.donors.append(&mut demo),
        }

        info!(added = missing, total = self.donors.len(), "Seeded demo donors");
        self.persist_or_warn();
        missing
    }

    /// Insert `donor` at the front (newest first) and persist.
    ///
    /// No field is validated. An id already present in the registry is
    /// replaced with a fresh one. Returns the id the donor was stored under.
    pub fn add_donor(&mut self, mut donor: DonorRecord) -> i64 {
        if self.contains_id(donor.id) {
            let fresh = self.fresh_id(donor.id);
            debug!(old = donor.id, new = fresh, "Reassigned colliding donor id");
            donor.id = fresh;
        }
        let id = donor.id;
        self.donors.insert(0, donor);
        self.persist_or_warn();
        id
    }

    /// Build a donor from a registration form and add it.
    ///
    /// The city is geocoded from the donate form's five-city table (other
    /// cities land near Dhaka), and the avatar and donation date are generated.
    ///
    /// # Errors
    ///
    /// Returns a validation error, leaving the registry untouched, if any
    /// form field is blank.
    pub fn register(
        &mut self,
        form: &Registration,
        generator: &mut DemoGenerator,
    ) -> Result<i64> {
        form.validate()?;

        let city = form.city.trim();
        let base = registration_coordinates(city).unwrap_or(FALLBACK_COORDINATES);
        let (lat, lng) = generator.jitter(base, REGISTRATION_JITTER);

        let mut donor = DonorRecord::new(
            Utc::now().timestamp_millis(),
            form.name.trim(),
            city,
            form.group.trim(),
        );
        donor.lat = Some(lat);
        donor.lng = Some(lng);
        donor.avatar_url = Some(generator.avatar_url());
        donor.last_donation = Some(generator.past_date(Local::now().date_naive()));

        let id = self.add_donor(donor);
        info!(id, "Registered donor");
        Ok(id)
    }

    /// Write the full list to the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write. The in-memory list is
    /// unaffected.
    pub fn persist(&self) -> StorageResult<()> {
        persist_donors(&self.store, &self.key, &self.donors)
    }

    fn persist_or_warn(&self) {
        if let Err(e) = self.persist() {
            warn!(key = %self.key, error = %e, "Could not persist donors, continuing in memory");
        }
    }

    /// All donors, in display order.
    #[must_use]
    pub fn donors(&self) -> &[DonorRecord] {
        &self.donors
    }

    /// Donors whose name, group or city contains `query`.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&DonorRecord> {
        render::filter(&self.donors, query)
    }

    /// Look a donor up by id.
    #[must_use]
    pub fn find(&self, id: i64) -> Option<&DonorRecord> {
        self.donors.iter().find(|d| d.id == id)
    }

    /// Number of donors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.donors.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.donors.is_empty()
    }

    /// The store the registry persists to.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The storage key the registry persists under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    fn contains_id(&self, id: i64) -> bool {
        self.donors.iter().any(|d| d.id == id)
    }

    fn fresh_id(&self, candidate: i64) -> i64 {
        let max = self.donors.iter().map(|d| d.id).max().unwrap_or(candidate);
        candidate.max(max.saturating_add(1))
    }

    fn fill_missing_dates(&mut self, generator: &mut DemoGenerator) -> usize {
        let today = Local::now().date_naive();
        let mut filled = 0;
        for donor in self.donors.iter_mut().filter(|d| needs_date(d)) {
            donor.last_donation = Some(generator.past_date(today));
            filled += 1;
        }
        if filled > 0 {
            debug!(filled, "Generated missing donation dates");
        }
        filled
    }
}

fn needs_date(donor: &DonorRecord) -> bool {
    donor
        .last_donation
        .as_deref()
        .map_or(true, |date| date.trim().is_empty())
}
