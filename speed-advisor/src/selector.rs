//! Signal selection
//!
//! Classifies the vehicle's approach direction from its heading and picks the
//! nearest catalogued signal.

use crate::catalog::SignalCatalog;
use crate::geodesy::normalize_degrees;
use crate::types::{AdvisorError, ApproachDirection, Result, SignalRecord};

/// The signal chosen for this iteration and the direction it is approached from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub signal: SignalRecord,
    pub approach: ApproachDirection,
}

/// Classify a heading (degrees) as north-south or east-west traffic
///
/// North-south covers headings under 45 or over 315 and the open band
/// `(135, 225)`; everything else, including exactly 45/135/225/315, is
/// east-west.
pub fn classify_approach(heading_deg: f64) -> ApproachDirection {
    let heading = normalize_degrees(heading_deg);
    if heading < 45.0 || heading > 315.0 || (135.0 < heading && heading < 225.0) {
        ApproachDirection::NorthSouth
    } else {
        ApproachDirection::EastWest
    }
}

/// The catalogued signal with the smallest distance from the vehicle
///
/// Ties go to the signal that entered the catalog first.
pub fn nearest_signal(catalog: &SignalCatalog) -> Result<SignalRecord> {
    catalog
        .all()
        .iter()
        .min_by(|a, b| a.distance_from_vehicle.total_cmp(&b.distance_from_vehicle))
        .copied()
        .ok_or(AdvisorError::NoSignalAvailable)
}

/// Select the relevant signal for a vehicle heading
pub fn select(catalog: &SignalCatalog, heading_deg: f64) -> Result<Selection> {
    let signal = nearest_signal(catalog)?;
    let approach = classify_approach(heading_deg);

    log::debug!(
        "Selected signal at ({:.6}, {:.6}), {:.1}m away, approach {}",
        signal.latitude_deg,
        signal.longitude_deg,
        signal.distance_from_vehicle,
        approach
    );

    Ok(Selection { signal, approach })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoPoint;

    fn signal(lat: f64, lon: f64) -> SignalRecord {
        SignalRecord {
            latitude_deg: lat,
            longitude_deg: lon,
            north_south_green: 20.0,
            east_west_green: 40.0,
            phase_offset: 0.0,
            bearing_from_vehicle: 0.0,
            distance_from_vehicle: 0.0,
        }
    }

    #[test]
    fn test_classify_north_south() {
        for heading in [0.0, 10.0, 44.9, 315.1, 359.9, 135.1, 180.0, 224.9, 360.0, -10.0] {
            assert_eq!(
                classify_approach(heading),
                ApproachDirection::NorthSouth,
                "heading {}",
                heading
            );
        }
    }

    #[test]
    fn test_classify_east_west() {
        for heading in [45.0, 90.0, 135.0, 225.0, 270.0, 315.0, 100.0, 300.0] {
            assert_eq!(
                classify_approach(heading),
                ApproachDirection::EastWest,
                "heading {}",
                heading
            );
        }
    }

    #[test]
    fn test_empty_catalog_has_no_signal() {
        let catalog = SignalCatalog::new();
        assert!(matches!(
            select(&catalog, 0.0),
            Err(AdvisorError::NoSignalAvailable)
        ));
    }

    #[test]
    fn test_selects_nearest() {
        let mut catalog = SignalCatalog::new();
        catalog.upsert(signal(0.01, 0.0));
        catalog.upsert(signal(0.0, 0.002));
        catalog.upsert(signal(-0.005, 0.0));
        catalog.refresh_geometry(GeoPoint::new(0.0, 0.0));

        let selection = select(&catalog, 90.0).unwrap();
        assert_eq!(selection.signal.longitude_deg, 0.002);
        assert_eq!(selection.approach, ApproachDirection::EastWest);
    }

    #[test]
    fn test_tie_selects_first_inserted() {
        let mut catalog = SignalCatalog::new();
        catalog.upsert(signal(0.01, 0.0));
        catalog.upsert(signal(-0.01, 0.0));
        catalog.refresh_geometry(GeoPoint::new(0.0, 0.0));

        assert_eq!(nearest_signal(&catalog).unwrap().latitude_deg, 0.01);
    }
}
