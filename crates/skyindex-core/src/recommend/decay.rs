//! Temporal down-weighting of old ratings

use chrono::{DateTime, Utc};

const HOURS_PER_YEAR: f64 = 24.0 * 365.0;

/// Exponential per-year decay: `exp(-factor * age_in_years)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalDecay {
    factor: f64,
}

impl TemporalDecay {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }

    /// Weight in (0, 1] for a rating made at `timestamp`, as seen from `now`.
    ///
    /// Ratings stamped in the future count as brand new.
    pub fn weight(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
        let hours = (now - timestamp).num_seconds().max(0) as f64 / 3600.0;
        (-self.factor * hours / HOURS_PER_YEAR).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_rating_has_full_weight() {
        let decay = TemporalDecay::new(0.1);
        let now = Utc::now();
        assert_eq!(decay.weight(now, now), 1.0);
        assert_eq!(decay.weight(now + Duration::days(3), now), 1.0);
    }

    #[test]
    fn test_one_year_old_rating() {
        let decay = TemporalDecay::new(0.1);
        let now = Utc::now();
        let weight = decay.weight(now - Duration::days(365), now);
        assert!((weight - (-0.1f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_zero_factor_disables_decay() {
        let decay = TemporalDecay::new(0.0);
        let now = Utc::now();
        assert_eq!(decay.weight(now - Duration::days(3650), now), 1.0);
    }
}
