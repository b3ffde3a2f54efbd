//! Synthetic donor generation.
//!
//! Demo donors fill the registry up to its target size so that a first-time
//! visitor never sees an empty list. Every generated field is populated.
//! Names, cities and blood groups cycle fixed pools by index; coordinates,
//! avatars and donation dates are random. Seeding the generator makes the
//! random parts reproducible.

use chrono::{Days, Local, NaiveDate, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::RegistryConfig;
use crate::donor::{BloodGroup, DonorRecord};

/// Names cycled through by index.
const SAMPLE_NAMES: [&str; 20] = [
    "Mahir Hasan",
    "Rahim Ahmed",
    "Karim Bhuiyan",
    "Sujon Khan",
    "Nusrat Jahan",
    "Farhana Akter",
    "Arif Shohag",
    "Mita Rahman",
    "Sabbir Karim",
    "Rita Laila",
    "Tanim S.",
    "Rashed M.",
    "Nabila H.",
    "Javed U.",
    "Anika R.",
    "Ibrahim K.",
    "Samiha A.",
    "Nazmul H.",
    "Rumana P.",
    "Fahim Z.",
];

/// Cities cycled through by index, with their base coordinates.
const SAMPLE_CITIES: [(&str, (f64, f64)); 9] = [
    ("Dhaka", (23.8103, 90.4125)),
    ("Mirpur DOHS, Dhaka", (23.8200, 90.3600)),
    ("Mohammadpur, Dhaka", (23.7500, 90.3560)),
    ("Chittagong", (22.3569, 91.7832)),
    ("Sylhet", (24.8949, 91.8687)),
    ("Rajshahi", (24.3636, 88.6241)),
    ("Khulna", (22.8456, 89.5403)),
    ("Comilla", (23.4591, 91.1809)),
    ("Gazipur", (24.0017, 90.4264)),
];

/// Division recorded on every generated donor.
const DEMO_DIVISION: &str = "Dhaka";

/// Offset added to the index to pick a blood group.
const GROUP_OFFSET: usize = 2;

/// Offset added to the index to pick a city.
const CITY_OFFSET: usize = 3;

/// First number appended to generated names.
const NAME_NUMBER_BASE: usize = 100;

/// Total jitter span, in degrees, for generated coordinates.
const DEMO_JITTER: f64 = 0.02;

/// Number of distinct avatar images.
const AVATAR_COUNT: u32 = 70;

/// Range of days before today for generated donation dates.
const PAST_DAYS: std::ops::Range<u64> = 10..310;

/// Spacing between ids in one batch; the random offset stays below it.
const ID_STRIDE: i64 = 1000;

/// Display format for donation dates.
pub const DATE_FORMAT: &str = "%d %b %Y";

/// Source of synthetic donor data.
#[derive(Debug, Clone)]
pub struct DemoGenerator {
    rng: ChaCha8Rng,
}

impl Default for DemoGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoGenerator {
    /// Create a generator seeded from the thread RNG.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: ChaCha8Rng::from_rng(&mut rand::rng()),
        }
    }

    /// Create a generator whose random choices are reproducible.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Create a generator honoring `registry.demo_seed`.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        config.demo_seed.map_or_else(Self::new, Self::seeded)
    }

    /// Generate `count` donors stamped with the current time.
    pub fn generate(&mut self, count: usize) -> Vec<DonorRecord> {
        self.generate_at(count, Utc::now().timestamp_millis(), Local::now().date_naive())
    }

    /// Generate `count` donors using explicit clock values.
    ///
    /// Ids are `now_ms + i * 1000 + r` with `r < 1000`, so no two ids in one
    /// batch are equal.
    pub fn generate_at(&mut self, count: usize, now_ms: i64, today: NaiveDate) -> Vec<DonorRecord> {
        (0..count)
            .map(|i| self.demo_donor(i, now_ms, today))
            .collect()
    }

    fn demo_donor(&mut self, i: usize, now_ms: i64, today: NaiveDate) -> DonorRecord {
        let name = format!(
            "{} {}",
            SAMPLE_NAMES[i % SAMPLE_NAMES.len()],
            NAME_NUMBER_BASE + i
        );
        let group = BloodGroup::ALL[(i + GROUP_OFFSET) % BloodGroup::ALL.len()];
        let (city, base) = SAMPLE_CITIES[(i + CITY_OFFSET) % SAMPLE_CITIES.len()];
        let (lat, lng) = self.jitter(base, DEMO_JITTER);

        let index = i64::try_from(i).unwrap_or(i64::MAX);
        let id = now_ms
            .saturating_add(index.saturating_mul(ID_STRIDE))
            .saturating_add(self.rng.random_range(0..ID_STRIDE));

        DonorRecord {
            id,
            name: Some(name),
            city: Some(city.to_string()),
            group: Some(group.code().to_string()),
            avatar_url: Some(self.avatar_url()),
            last_donation: Some(self.past_date(today)),
            lat: Some(lat),
            lng: Some(lng),
            division: Some(DEMO_DIVISION.to_string()),
            district: Some(city.split(',').next().unwrap_or(city).to_string()),
        }
    }

    /// A random avatar URL.
    pub fn avatar_url(&mut self) -> String {
        let img = self.rng.random_range(1..=AVATAR_COUNT);
        format!("https://i.pravatar.cc/140?img={img}")
    }

    /// A random donation date between 10 and 309 days before `today`.
    pub fn past_date(&mut self, today: NaiveDate) -> String {
        let days_ago = self.rng.random_range(PAST_DAYS);
        today
            .checked_sub_days(Days::new(days_ago))
            .unwrap_or(today)
            .format(DATE_FORMAT)
            .to_string()
    }

    /// `base` moved by up to half of `spread` degrees on each axis.
    pub fn jitter(&mut self, base: (f64, f64), spread: f64) -> (f64, f64) {
        let dlat = (self.rng.random::<f64>() - 0.5) * spread;
        let dlng = (self.rng.random::<f64>() - 0.5) * spread;
        (base.0 + dlat, base.1 + dlng)
    }
}
