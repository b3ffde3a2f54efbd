//! Map markers for the donor map view.
//!
//! The map widget itself lives in the page. This adapter only decides which
//! donors get a marker and what their popups say.

use serde::Serialize;

use crate::donor::DonorRecord;
use crate::sanitize::escape_opt;

/// Initial map center (Bangladesh).
pub const DEFAULT_CENTER: (f64, f64) = (23.6850, 90.3563);

/// Initial map zoom level.
pub const DEFAULT_ZOOM: u8 = 7;

/// Tile layer URL template.
pub const TILE_URL: &str =
    "https://{s}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png";

/// Tile layer attribution.
pub const TILE_ATTRIBUTION: &str = "&copy; OpenStreetMap & CartoDB";

/// One donor marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Donor id.
    pub id: i64,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Popup markup.
    pub popup: String,
}

/// Everything the page needs to draw the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    /// Initial center.
    pub center: (f64, f64),
    /// Initial zoom.
    pub zoom: u8,
    /// Tile URL template.
    pub tile_url: &'static str,
    /// Tile attribution.
    pub attribution: &'static str,
    /// Donor markers.
    pub markers: Vec<MapMarker>,
}

/// Markers for every donor with a usable coordinate pair.
#[must_use]
pub fn markers(records: &[DonorRecord]) -> Vec<MapMarker> {
    records
        .iter()
        .filter_map(|donor| {
            let (lat, lng) = donor.coordinates()?;
            Some(MapMarker {
                id: donor.id,
                lat,
                lng,
                popup: popup(donor),
            })
        })
        .collect()
}

/// The full map description for `records`.
#[must_use]
pub fn map_view(records: &[DonorRecord]) -> MapView {
    MapView {
        center: DEFAULT_CENTER,
        zoom: DEFAULT_ZOOM,
        tile_url: TILE_URL,
        attribution: TILE_ATTRIBUTION,
        markers: markers(records),
    }
}

fn popup(donor: &DonorRecord) -> String {
    format!(
        r#"<div class="text-center"><h4 class="font-bold text-slate-800 text-base">{}</h4><span class="inline-block bg-brand-100 text-brand-600 px-2 py-1 rounded text-xs font-bold mt-1">{}</span><p class="text-xs text-slate-500 mt-1">{}</p></div>"#,
        escape_opt(donor.name.as_deref()),
        escape_opt(donor.group.as_deref()),
        escape_opt(donor.city.as_deref()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn located(id: i64, lat: f64, lng: f64) -> DonorRecord {
        let mut donor = DonorRecord::new(id, "Karim", "Dhaka", "A+");
        donor.lat = Some(lat);
        donor.lng = Some(lng);
        donor
    }

    #[test]
    fn test_markers_skip_unlocated() {
        let mut half = DonorRecord::new(2, "Nila", "Sylhet", "O-");
        half.lat = Some(24.89);
        let donors = vec![
            located(1, 23.81, 90.41),
            half,
            DonorRecord::new(3, "Rupa", "Khulna", "B+"),
            located(4, 0.0, 0.0),
        ];

        let found = markers(&donors);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
        assert!((found[0].lat - 23.81).abs() < f64::EPSILON);
    }

    #[test]
    fn test_popup_escaped() {
        let mut donor = located(1, 23.81, 90.41);
        donor.name = Some("<img src=x>".to_string());

        let found = markers(&[donor]);
        assert!(found[0].popup.contains("&lt;img src&#x3D;x&gt;"));
        assert!(found[0].popup.contains(">A+</span>"));
    }

    #[test]
    fn test_map_view_defaults() {
        let view = map_view(&[]);
        assert_eq!(view.zoom, 7);
        assert_eq!(view.center, (23.6850, 90.3563));
        assert!(view.markers.is_empty());
    }

    #[test]
    fn test_map_view_serializes() {
        let view = map_view(&[located(1, 23.81, 90.41)]);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["markers"][0]["id"], 1);
        assert_eq!(json["zoom"], 7);
    }
}
