//! GPS coordinates in raw wire units and decimal degrees.

use crate::error::FieldError;

/// Scale between raw wire units and decimal degrees.
const DEGREE_SCALE: f64 = 1_800_000.0;

/// Decoded latitude/longitude in signed decimal degrees.
///
/// The wire carries each axis as an unsigned u32 of `degrees * 1_800_000`;
/// hemispheres come from the course/status bits, not from the coordinate
/// words themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Combine raw axis words with hemisphere flags.
    pub fn from_raw(lat_raw: u32, lon_raw: u32, north: bool, east: bool) -> Result<Self, FieldError> {
        let mut latitude = lat_raw as f64 / DEGREE_SCALE;
        let mut longitude = lon_raw as f64 / DEGREE_SCALE;
        if !north {
            latitude = -latitude;
        }
        if !east {
            longitude = -longitude;
        }
        if latitude.abs() > 90.0 {
            return Err(FieldError::LatitudeRange { value: latitude });
        }
        if longitude.abs() > 180.0 {
            return Err(FieldError::LongitudeRange { value: longitude });
        }
        Ok(Coordinates {
            latitude,
            longitude,
        })
    }

    /// Back to raw unsigned axis words. Hemisphere signs are dropped; the
    /// caller re-encodes them into the course/status byte.
    pub fn to_raw(self) -> (u32, u32) {
        let lat = (self.latitude.abs() * DEGREE_SCALE).round() as u32;
        let lon = (self.longitude.abs() * DEGREE_SCALE).round() as u32;
        (lat, lon)
    }

    pub fn is_north(self) -> bool {
        self.latitude >= 0.0
    }

    pub fn is_east(self) -> bool {
        self.longitude >= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_scale() {
        let c = Coordinates::from_raw(40_582_800, 205_304_040, true, true).unwrap();
        assert!((c.latitude - 22.546).abs() < 1e-9);
        assert!((c.longitude - 114.0578).abs() < 1e-9);
    }

    #[test]
    fn test_hemispheres() {
        let c = Coordinates::from_raw(40_582_800, 205_304_040, false, false).unwrap();
        assert!(c.latitude < 0.0);
        assert!(c.longitude < 0.0);
        assert!(!c.is_north());
        assert!(!c.is_east());
    }

    #[test]
    fn test_raw_roundtrip() {
        for &(lat, lon) in &[
            (0u32, 0u32),
            (40_582_800, 205_304_040),
            (162_000_000, 324_000_000),
            (1, 1),
        ] {
            let c = Coordinates::from_raw(lat, lon, true, true).unwrap();
            assert_eq!(c.to_raw(), (lat, lon));
            let c = Coordinates::from_raw(lat, lon, false, false).unwrap();
            assert_eq!(c.to_raw(), (lat, lon));
        }
    }

    #[test]
    fn test_latitude_range() {
        // 90 degrees is the last valid raw value.
        assert!(Coordinates::from_raw(162_000_000, 0, true, true).is_ok());
        assert!(matches!(
            Coordinates::from_raw(162_000_001, 0, true, true),
            Err(FieldError::LatitudeRange { .. })
        ));
    }

    #[test]
    fn test_longitude_range() {
        assert!(Coordinates::from_raw(0, 324_000_000, true, false).is_ok());
        assert!(matches!(
            Coordinates::from_raw(0, 324_000_001, true, true),
            Err(FieldError::LongitudeRange { .. })
        ));
    }
}
