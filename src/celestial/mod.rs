//! Celestial object abstraction

use crate::coordinates::RaDec;
use crate::Result;
use chrono::{DateTime, Utc};

/// A trait for objects that have a position in the sky
pub trait CelestialObject {
    /// Get the geocentric position of the object at a specific time
    fn position_at(&self, time: &DateTime<Utc>) -> Result<RaDec>;
}

/// An object fixed on the celestial sphere, such as a star or a marker
#[derive(Debug, Clone, PartialEq)]
pub struct FixedObject {
    /// Name of the object
    pub name: String,
    /// Position on the sky
    pub position: RaDec,
}

impl FixedObject {
    /// Create a new fixed object
    pub fn new(name: &str, position: RaDec) -> Self {
        Self {
            name: name.to_string(),
            position,
        }
    }
}

impl CelestialObject for FixedObject {
    fn position_at(&self, _time: &DateTime<Utc>) -> Result<RaDec> {
        Ok(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_object() {
        let polaris = FixedObject::new(
            "Polaris",
            RaDec::from_hms_dms(2.0, 31.0, 49.1, 89.0, 15.0, 51.0),
        );
        assert_eq!(polaris.name, "Polaris");

        let t1 = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(polaris.position_at(&t1).unwrap(), polaris.position_at(&t2).unwrap());
    }
}
