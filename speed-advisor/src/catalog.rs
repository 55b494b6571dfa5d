//! Catalog of known nearby signals
//!
//! Holds at most `capacity` signals keyed by position. Timing fields change
//! only when a broadcast row for the signal arrives; bearing and distance are
//! re-derived against the vehicle on every `refresh_geometry`.

use crate::geodesy::{bearing_deg, distance_meters};
use crate::types::{GeoPoint, SignalRecord};

/// Default number of signals kept
pub const DEFAULT_CAPACITY: usize = 10;

/// Default same-signal tolerance, degrees per axis
pub const DEFAULT_TOLERANCE_DEG: f64 = 1e-5;

/// The bounded set of signals near the vehicle
///
/// Records are kept in insertion order; a replacement keeps its slot.
#[derive(Debug, Clone)]
pub struct SignalCatalog {
    records: Vec<SignalRecord>,
    capacity: usize,
    tolerance_deg: f64,
    /// Vehicle position of the last geometry refresh
    reference: Option<GeoPoint>,
}

impl SignalCatalog {
    /// Create an empty catalog with the default capacity and tolerance
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_TOLERANCE_DEG)
    }

    /// Create an empty catalog; a capacity of zero is raised to one
    pub fn with_limits(capacity: usize, tolerance_deg: f64) -> Self {
        Self {
            records: Vec::with_capacity(capacity.max(1) + 1),
            capacity: capacity.max(1),
            tolerance_deg,
            reference: None,
        }
    }

    /// Insert a signal, or replace the one at the same position
    ///
    /// Geometry of the incoming record is derived against the last refreshed
    /// vehicle position when there is one. On overflow the farthest signal is
    /// evicted, the oldest one winning ties. Returns the evicted record.
    pub fn upsert(&mut self, record: SignalRecord) -> Option<SignalRecord> {
        let mut record = record;
        if let Some(origin) = self.reference {
            derive_geometry(&mut record, origin);
        }

        if let Some(existing) = self.find_mut(record.point()) {
            *existing = record;
            return None;
        }

        self.records.push(record);
        if self.records.len() <= self.capacity {
            return None;
        }

        let farthest = self.farthest_index()?;
        let evicted = self.records.remove(farthest);
        log::debug!(
            "Catalog full, evicted signal at ({:.6}, {:.6}) {:.1}m away",
            evicted.latitude_deg,
            evicted.longitude_deg,
            evicted.distance_from_vehicle
        );
        Some(evicted)
    }

    /// Recompute bearing and distance of every record against `position`
    pub fn refresh_geometry(&mut self, position: GeoPoint) {
        self.reference = Some(position);
        for record in &mut self.records {
            derive_geometry(record, position);
        }
    }

    /// All records, in insertion order
    pub fn all(&self) -> &[SignalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn find_mut(&mut self, point: GeoPoint) -> Option<&mut SignalRecord> {
        let tolerance = self.tolerance_deg;
        self.records.iter_mut().find(|existing| {
            (existing.latitude_deg - point.latitude_deg).abs() <= tolerance
                && (existing.longitude_deg - point.longitude_deg).abs() <= tolerance
        })
    }

    /// Index of the farthest record; the earliest index wins ties
    fn farthest_index(&self) -> Option<usize> {
        let mut farthest: Option<(usize, f64)> = None;
        for (idx, record) in self.records.iter().enumerate() {
            match farthest {
                Some((_, max)) if record.distance_from_vehicle <= max => {}
                _ => farthest = Some((idx, record.distance_from_vehicle)),
            }
        }
        farthest.map(|(idx, _)| idx)
    }
}

impl Default for SignalCatalog {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_geometry(record: &mut SignalRecord, origin: GeoPoint) {
    let target = record.point();
    record.bearing_from_vehicle = bearing_deg(origin, target);
    record.distance_from_vehicle = distance_meters(origin, target);
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn test_empty_catalog() {
        let catalog = SignalCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.capacity(), 10);
    }

    #[test]
    fn test_upsert_replaces_within_tolerance() {
        let mut catalog = SignalCatalog::new();
        catalog.upsert(signal(40.5, -73.25));
        catalog.upsert(signal(40.6, -73.25));

        let mut updated = signal(40.500004, -73.250004);
        updated.phase_offset = 12.0;
        catalog.upsert(updated);

        assert_eq!(catalog.len(), 2);
        // Replacement keeps its slot
        assert_eq!(catalog.all()[0].phase_offset, 12.0);
        assert_eq!(catalog.all()[1].latitude_deg, 40.6);
    }

    #[test]
    fn test_refresh_geometry() {
        let mut catalog = SignalCatalog::new();
        catalog.upsert(signal(36.0, 139.0));
        catalog.upsert(signal(35.0, 140.0));

        catalog.refresh_geometry(GeoPoint::new(35.0, 139.0));

        let north = catalog.all()[0];
        assert!((north.distance_from_vehicle - 111_195.0).abs() < 1.0);
        assert!(north.bearing_from_vehicle.abs() < 1e-9);

        let east = catalog.all()[1];
        assert!((east.bearing_from_vehicle - 90.0).abs() < 1.0);
    }

    #[test]
    fn test_upsert_after_refresh_derives_geometry() {
        let mut catalog = SignalCatalog::new();
        catalog.refresh_geometry(GeoPoint::new(35.0, 139.0));
        catalog.upsert(signal(36.0, 139.0));

        assert!(catalog.all()[0].distance_from_vehicle > 100_000.0);
    }

    #[test]
    fn test_capacity_never_exceeded() {
        let mut catalog = SignalCatalog::new();
        catalog.refresh_geometry(GeoPoint::new(0.0, 0.0));

        for i in 0..25 {
            catalog.upsert(signal(0.001 * (i % 13) as f64, 0.002 * i as f64));
            assert!(catalog.len() <= 10);
        }
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_eviction_removes_farthest() {
        let mut catalog = SignalCatalog::new();
        catalog.refresh_geometry(GeoPoint::new(0.0, 0.0));

        for i in 1..=10 {
            catalog.upsert(signal(0.001 * i as f64, 0.0));
        }
        let evicted = catalog.upsert(signal(0.0005, 0.0)).unwrap();

        assert_eq!(evicted.latitude_deg, 0.01);
        let max_remaining = catalog
            .all()
            .iter()
            .map(|r| r.distance_from_vehicle)
            .fold(0.0, f64::max);
        assert!(max_remaining < evicted.distance_from_vehicle);
    }

    #[test]
    fn test_incoming_farthest_is_evicted() {
        let mut catalog = SignalCatalog::with_limits(2, DEFAULT_TOLERANCE_DEG);
        catalog.refresh_geometry(GeoPoint::new(0.0, 0.0));

        catalog.upsert(signal(0.001, 0.0));
        catalog.upsert(signal(0.002, 0.0));
        let evicted = catalog.upsert(signal(0.5, 0.0)).unwrap();

        assert_eq!(evicted.latitude_deg, 0.5);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_eviction_tie_removes_oldest() {
        let mut catalog = SignalCatalog::with_limits(2, DEFAULT_TOLERANCE_DEG);
        catalog.refresh_geometry(GeoPoint::new(0.0, 0.0));

        // North and south of the origin, equally far
        catalog.upsert(signal(0.01, 0.0));
        catalog.upsert(signal(-0.01, 0.0));
        let evicted = catalog.upsert(signal(0.001, 0.0)).unwrap();

        assert_eq!(evicted.latitude_deg, 0.01);
        assert_eq!(catalog.all()[0].latitude_deg, -0.01);
        assert_eq!(catalog.all()[1].latitude_deg, 0.001);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut catalog = SignalCatalog::with_limits(0, DEFAULT_TOLERANCE_DEG);
        catalog.upsert(signal(1.0, 1.0));
        catalog.upsert(signal(2.0, 2.0));
        assert_eq!(catalog.len(), 1);
    }
}
