//! Donor records and blood groups.
//!
//! [`DonorRecord`] mirrors the JSON objects the site keeps under its donor
//! key, so field names serialize in camelCase and every display field is
//! optional: records written by older pages may lack any of them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Placeholder shown when a donor has no name.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Placeholder shown when a donor has no blood group.
pub const UNKNOWN_GROUP: &str = "N/A";

/// A registered (or synthetic) blood donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorRecord {
    /// Identifier, unique within the registry. Millisecond timestamp based.
    pub id: i64,

    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// City or locality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Blood group code such as `AB+`. Older profile records call this `blood`.
    #[serde(default, alias = "blood", skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,

    /// Date of the last donation, formatted for display (`05 Mar 2024`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_donation: Option<String>,

    /// Latitude, present only for donors shown on the map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    /// Longitude, present only for donors shown on the map.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,

    /// Administrative division.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,

    /// District within the division.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}

impl DonorRecord {
    /// Create a record with the three core display fields set.
    #[must_use]
    pub fn new(
        id: i64,
        name: impl Into<String>,
        city: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: Some(name.into()),
            city: Some(city.into()),
            group: Some(group.into()),
            avatar_url: None,
            last_donation: None,
            lat: None,
            lng: None,
            division: None,
            district: None,
        }
    }

    /// Name for display, falling back to [`UNKNOWN_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or(UNKNOWN_NAME)
    }

    /// Blood group for display, falling back to [`UNKNOWN_GROUP`].
    #[must_use]
    pub fn display_group(&self) -> &str {
        non_blank(self.group.as_deref()).unwrap_or(UNKNOWN_GROUP)
    }

    /// City for display, empty when unknown.
    #[must_use]
    pub fn display_city(&self) -> &str {
        self.city.as_deref().unwrap_or_default()
    }

    /// The coordinate pair, if both halves are usable.
    ///
    /// Zero and non-finite values count as missing.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng))
                if lat.is_finite() && lng.is_finite() && lat != 0.0 && lng != 0.0 =>
            {
                Some((lat, lng))
            }
            _ => None,
        }
    }

    /// Whether `needle` (already lowercased) occurs in the name, group or city.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        [&self.name, &self.group, &self.city]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The eight ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    /// A positive.
    #[serde(rename = "A+")]
    APos,
    /// A negative.
    #[serde(rename = "A-")]
    ANeg,
    /// B positive.
    #[serde(rename = "B+")]
    BPos,
    /// B negative.
    #[serde(rename = "B-")]
    BNeg,
    /// O positive.
    #[serde(rename = "O+")]
    OPos,
    /// O negative.
    #[serde(rename = "O-")]
    ONeg,
    /// AB positive.
    #[serde(rename = "AB+")]
    AbPos,
    /// AB negative.
    #[serde(rename = "AB-")]
    AbNeg,
}

impl BloodGroup {
    /// All groups, in the order the demo generator cycles through them.
    pub const ALL: [Self; 8] = [
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::OPos,
        Self::ONeg,
        Self::AbPos,
        Self::AbNeg,
    ];

    /// The display code, e.g. `AB+`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::OPos => "O+",
            Self::ONeg => "O-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for BloodGroup {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|g| g.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::validation(format!("unknown blood group: {wanted}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{"id":1,"name":"Karim","city":"Dhaka","group":"A+","avatarUrl":"a.png","lastDonation":"05 Mar 2024","lat":23.8,"lng":90.4}"#;
        let donor: DonorRecord = serde_json::from_str(json).unwrap();

        assert_eq!(donor.id, 1);
        assert_eq!(donor.avatar_url.as_deref(), Some("a.png"));
        assert_eq!(donor.last_donation.as_deref(), Some("05 Mar 2024"));
        assert_eq!(donor.coordinates(), Some((23.8, 90.4)));
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let donor: DonorRecord = serde_json::from_str(r#"{"id":7}"#).unwrap();

        assert_eq!(donor.display_name(), "Unknown");
        assert_eq!(donor.display_group(), "N/A");
        assert_eq!(donor.display_city(), "");
        assert!(donor.coordinates().is_none());
    }

    #[test]
    fn test_blood_alias() {
        let donor: DonorRecord = serde_json::from_str(r#"{"id":3,"blood":"O-"}"#).unwrap();
        assert_eq!(donor.group.as_deref(), Some("O-"));
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let donor = DonorRecord::new(2, "Nila", "Sylhet", "O-");
        let json = serde_json::to_string(&donor).unwrap();

        assert_eq!(json, r#"{"id":2,"name":"Nila","city":"Sylhet","group":"O-"}"#);
    }

    #[test]
    fn test_coordinates_need_both_halves() {
        let mut donor = DonorRecord::new(1, "Karim", "Dhaka", "A+");
        donor.lat = Some(23.8);
        assert!(donor.coordinates().is_none());

        donor.lng = Some(0.0);
        assert!(donor.coordinates().is_none());

        donor.lng = Some(f64::NAN);
        assert!(donor.coordinates().is_none());

        donor.lng = Some(90.4);
        assert_eq!(donor.coordinates(), Some((23.8, 90.4)));
    }

    #[test]
    fn test_matches_fields() {
        let donor = DonorRecord::new(1, "Karim", "Dhaka", "A+");

        assert!(donor.matches(""));
        assert!(donor.matches("kar"));
        assert!(donor.matches("dhaka"));
        assert!(donor.matches("a+"));
        assert!(!donor.matches("b+"));
    }

    #[test]
    fn test_blank_name_uses_placeholder() {
        let mut donor = DonorRecord::new(1, "  ", "Dhaka", "");
        assert_eq!(donor.display_name(), "Unknown");
        assert_eq!(donor.display_group(), "N/A");

        donor.name = None;
        assert_eq!(donor.display_name(), "Unknown");
    }

    #[test]
    fn test_blood_group_parse() {
        assert_eq!("ab+".parse::<BloodGroup>().unwrap(), BloodGroup::AbPos);
        assert_eq!(" O- ".parse::<BloodGroup>().unwrap(), BloodGroup::ONeg);
        assert!("C+".parse::<BloodGroup>().is_err());
    }

    #[test]
    fn test_blood_group_display_and_serde() {
        assert_eq!(BloodGroup::BNeg.to_string(), "B-");
        assert_eq!(serde_json::to_string(&BloodGroup::AbNeg).unwrap(), "\"AB-\"");
    }

    #[test]
    fn test_blood_group_order() {
        let codes: Vec<_> = BloodGroup::ALL.iter().map(|g| g.code()).collect();
        assert_eq!(codes, ["A+", "A-", "B+", "B-", "O+", "O-", "AB+", "AB-"]);
    }
}
