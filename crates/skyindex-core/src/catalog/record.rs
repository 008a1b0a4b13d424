//! Catalog attributes of a single astronomical object

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkyError};

/// Catalog attributes of one object, immutable once loaded.
///
/// Identity is the primary `identifier`. Ranges are not enforced by the type;
/// [`CelestialObjectRecord::validate`] checks the positional invariants and is
/// called before a record is attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CelestialObjectRecord {
    /// Catalog row id
    pub id: String,
    /// Primary catalog identifier (the entry name this record belongs to)
    pub identifier: String,
    /// Messier identifier, if any
    pub m_identifier: String,
    pub extension_name: String,
    pub component: String,
    pub class_name: String,
    /// Observer difficulty ranking
    pub amateur_rank: String,
    pub chinese_name: String,
    /// Object type ("Galaxy", "Nebula", "Open Cluster", ...)
    #[serde(rename = "type")]
    pub object_type: String,
    /// Type including duplicate classifications
    pub duplicate_type: String,
    /// Morphological classification ("Sb", "E5", ...)
    pub morphology: String,
    pub constellation_zh: String,
    pub constellation_en: String,
    /// Right ascension (J2000), human-readable
    pub ra_j2000: String,
    /// Right ascension (J2000) in decimal degrees
    pub ra_deg: f64,
    /// Declination (J2000), human-readable
    pub dec_j2000: String,
    /// Declination (J2000) in decimal degrees
    pub dec_deg: f64,
    /// Visual magnitude (V band)
    pub visual_magnitude: f64,
    /// Photographic magnitude (B band)
    pub photographic_magnitude: f64,
    /// B-V color index
    pub b_minus_v: f64,
    /// Surface brightness in mag/arcmin²
    pub surface_brightness: f64,
    /// Major axis in arcmin
    pub major_axis: f64,
    /// Minor axis in arcmin
    pub minor_axis: f64,
    /// Position angle in degrees
    pub position_angle: i32,
    pub detailed_description: String,
    pub brief_description: String,
}

impl CelestialObjectRecord {
    /// Create an empty record for the given identifier
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..Default::default()
        }
    }

    /// Set the object type
    pub fn with_type(mut self, object_type: impl Into<String>) -> Self {
        self.object_type = object_type.into();
        self
    }

    /// Set the morphological classification
    pub fn with_morphology(mut self, morphology: impl Into<String>) -> Self {
        self.morphology = morphology.into();
        self
    }

    /// Set the visual magnitude
    pub fn with_magnitude(mut self, visual_magnitude: f64) -> Self {
        self.visual_magnitude = visual_magnitude;
        self
    }

    /// Set the decimal J2000 position, filling the human-readable forms
    pub fn with_position(mut self, ra_deg: f64, dec_deg: f64) -> Self {
        self.ra_deg = ra_deg;
        self.dec_deg = dec_deg;
        self.ra_j2000 = super::coords::format_ra(ra_deg);
        self.dec_j2000 = super::coords::format_dec(dec_deg);
        self
    }

    /// Set the English constellation name
    pub fn with_constellation(mut self, constellation: impl Into<String>) -> Self {
        self.constellation_en = constellation.into();
        self
    }

    /// Set the detailed description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.detailed_description = description.into();
        self
    }

    /// The entry name this record attaches to
    pub fn name(&self) -> &str {
        &self.identifier
    }

    /// Check RA ∈ [0°, 360°) (i.e. [0h, 24h)) and Dec ∈ [-90°, 90°]
    pub fn validate(&self) -> Result<()> {
        if self.identifier.trim().is_empty() {
            crate::bail_empty!("record");
        }
        if !(0.0..360.0).contains(&self.ra_deg) {
            return Err(SkyError::InvalidCoordinate {
                axis: "right ascension".to_string(),
                value: self.ra_deg,
                range: "[0, 360) degrees".to_string(),
            });
        }
        if !(-90.0..=90.0).contains(&self.dec_deg) {
            return Err(SkyError::InvalidCoordinate {
                axis: "declination".to_string(),
                value: self.dec_deg,
                range: "[-90, 90] degrees".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_validate() {
        let record = CelestialObjectRecord::new("M31")
            .with_type("Galaxy")
            .with_morphology("Sb")
            .with_magnitude(3.44)
            .with_position(10.6847, 41.2687);

        assert_eq!(record.name(), "M31");
        assert_eq!(record.object_type, "Galaxy");
        assert_eq!(record.ra_j2000, "00h42m44.3s");
        assert!(record.dec_j2000.starts_with("+41°16'"));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_positions() {
        let ra = CelestialObjectRecord::new("X").with_position(360.0, 0.0);
        assert!(matches!(
            ra.validate(),
            Err(SkyError::InvalidCoordinate { .. })
        ));

        let dec = CelestialObjectRecord::new("X").with_position(10.0, -90.5);
        assert!(dec.validate().is_err());

        let pole = CelestialObjectRecord::new("X").with_position(0.0, -90.0);
        assert!(pole.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_identifier() {
        let record = CelestialObjectRecord::new("  ");
        assert!(matches!(
            record.validate(),
            Err(SkyError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn test_serde_uses_type_key() {
        let record = CelestialObjectRecord::new("M42").with_type("Nebula");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Nebula");

        let parsed: CelestialObjectRecord =
            serde_json::from_str(r#"{"identifier": "M42", "type": "Nebula"}"#).unwrap();
        assert_eq!(parsed.object_type, "Nebula");
        assert_eq!(parsed.visual_magnitude, 0.0);
    }
}
