//! Attribute filtering for catalog entries

use crate::catalog::CatalogEntry;

/// Filter configuration for catalog entries.
///
/// Blank or `None` classification fields are unconstrained. Magnitude bounds
/// are inclusive. Entries without a record behave as magnitude 0 with an
/// empty type and morphology.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeFilter {
    /// Required object type (exact match)
    pub object_type: Option<String>,
    /// Required morphology (exact match)
    pub morphology: Option<String>,
    /// Brightest visual magnitude allowed (numerically smallest)
    pub min_magnitude: Option<f64>,
    /// Faintest visual magnitude allowed (numerically largest)
    pub max_magnitude: Option<f64>,
}

impl AttributeFilter {
    /// Create a filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the type filter
    pub fn with_type(mut self, object_type: Option<&str>) -> Self {
        self.object_type = object_type.map(str::to_string);
        self
    }

    /// Set the morphology filter
    pub fn with_morphology(mut self, morphology: Option<&str>) -> Self {
        self.morphology = morphology.map(str::to_string);
        self
    }

    /// Set the inclusive magnitude range
    pub fn with_magnitude_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_magnitude = min;
        self.max_magnitude = max;
        self
    }

    /// Check if an entry matches all configured constraints
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        self.matches_type(entry) && self.matches_morphology(entry) && self.matches_magnitude(entry)
    }

    fn matches_type(&self, entry: &CatalogEntry) -> bool {
        match self.object_type.as_deref() {
            Some(t) if !t.is_empty() => entry.object_type() == t,
            _ => true,
        }
    }

    fn matches_morphology(&self, entry: &CatalogEntry) -> bool {
        match self.morphology.as_deref() {
            Some(m) if !m.is_empty() => entry.morphology() == m,
            _ => true,
        }
    }

    fn matches_magnitude(&self, entry: &CatalogEntry) -> bool {
        let magnitude = entry.magnitude();
        if let Some(min) = self.min_magnitude {
            if magnitude < min {
                return false;
            }
        }
        if let Some(max) = self.max_magnitude {
            if magnitude > max {
                return false;
            }
        }
        true
    }

    /// Whether no constraint is set
    pub fn is_unconstrained(&self) -> bool {
        let blank = |v: &Option<String>| matches!(v.as_deref(), None | Some(""));
        blank(&self.object_type)
            && blank(&self.morphology)
            && self.min_magnitude.is_none()
            && self.max_magnitude.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CelestialObjectRecord;

    fn galaxy(name: &str, magnitude: f64) -> CatalogEntry {
        let mut entry = CatalogEntry::new(name, vec![], 0);
        entry.record = Some(
            CelestialObjectRecord::new(name)
                .with_type("Galaxy")
                .with_morphology("Sb")
                .with_magnitude(magnitude),
        );
        entry
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = AttributeFilter::new();
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&galaxy("M31", 3.4)));
        assert!(filter.matches(&CatalogEntry::new("bare", vec![], 0)));
    }

    #[test]
    fn test_blank_strings_are_unconstrained() {
        let filter = AttributeFilter::new()
            .with_type(Some(""))
            .with_morphology(Some(""));
        assert!(filter.is_unconstrained());
        assert!(filter.matches(&galaxy("M31", 3.4)));
    }

    #[test]
    fn test_type_and_morphology() {
        let m31 = galaxy("M31", 3.4);
        assert!(AttributeFilter::new().with_type(Some("Galaxy")).matches(&m31));
        assert!(!AttributeFilter::new().with_type(Some("Nebula")).matches(&m31));
        assert!(!AttributeFilter::new()
            .with_morphology(Some("E5"))
            .matches(&m31));
    }

    #[test]
    fn test_magnitude_bounds_inclusive() {
        let m31 = galaxy("M31", 3.5);
        assert!(AttributeFilter::new()
            .with_magnitude_range(Some(3.5), Some(3.5))
            .matches(&m31));
        assert!(!AttributeFilter::new()
            .with_magnitude_range(Some(3.6), None)
            .matches(&m31));
        assert!(!AttributeFilter::new()
            .with_magnitude_range(None, Some(3.4))
            .matches(&m31));
    }

    #[test]
    fn test_record_less_entry_is_magnitude_zero() {
        let bare = CatalogEntry::new("bare", vec![], 0);
        assert!(AttributeFilter::new()
            .with_magnitude_range(Some(-1.0), Some(0.0))
            .matches(&bare));
        assert!(!AttributeFilter::new()
            .with_type(Some("Galaxy"))
            .matches(&bare));
    }
}
