use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Integral of a positive lobe must be at least this ratio of the largest
/// negative lobe integral.
pub const RATIO_TO_NEGATIVE_LOBE_INTEGRAL_DEFAULT: f32 = 0.0;
/// Peak of a positive lobe must exceed this ratio of the mean negative peak.
pub const RATIO_TO_NEGATIVE_LOBE_MEAN_PEAK_DEFAULT: f32 = 1.0;
/// Absolute floor on a retained lobe's peak amplitude.
pub const PEAK_VALUE_THRESHOLD_DEFAULT: f32 = 0.1;
/// With the default ratio distinct peaks are never merged.
pub const MERGE_RATIO_DEFAULT: f32 = 1.0;

/// Segmentation thresholds and output switches.
///
/// The three switches interact: a null lobe and a dilated lookup table are
/// mutually exclusive, and dilation requires the lookup table. Their setters
/// reject an invalid combination before changing anything, and
/// [`SegmenterOptions::validate`] re-checks values that were deserialized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterOptions {
    /// Minimum ratio of a positive lobe's integral to the largest negative
    /// lobe integral.
    pub min_integral_ratio_to_negative: f32,
    /// Minimum ratio of a positive lobe's peak to the mean negative peak.
    pub min_peak_ratio_to_negative_mean: f32,
    /// Absolute amplitude floor for a retained lobe's peak.
    pub peak_value_threshold: f32,
    /// Two lobes meeting at a direction merge when its amplitude is at least
    /// this ratio of the smaller of their peaks. `0` merges every touching
    /// pair; `inf` never merges.
    pub merge_ratio: f32,
    create_null_lobe: bool,
    create_lookup_table: bool,
    dilate_lookup_table: bool,
}

impl Default for SegmenterOptions {
    fn default() -> Self {
        Self {
            min_integral_ratio_to_negative: RATIO_TO_NEGATIVE_LOBE_INTEGRAL_DEFAULT,
            min_peak_ratio_to_negative_mean: RATIO_TO_NEGATIVE_LOBE_MEAN_PEAK_DEFAULT,
            peak_value_threshold: PEAK_VALUE_THRESHOLD_DEFAULT,
            merge_ratio: MERGE_RATIO_DEFAULT,
            create_null_lobe: false,
            create_lookup_table: false,
            dilate_lookup_table: false,
        }
    }
}

impl SegmenterOptions {
    pub fn create_null_lobe(&self) -> bool {
        self.create_null_lobe
    }

    pub fn create_lookup_table(&self) -> bool {
        self.create_lookup_table
    }

    pub fn dilate_lookup_table(&self) -> bool {
        self.dilate_lookup_table
    }

    pub fn set_create_null_lobe(&mut self, value: bool) -> Result<(), ConfigError> {
        self.apply(|o| o.create_null_lobe = value)
    }

    pub fn set_create_lookup_table(&mut self, value: bool) -> Result<(), ConfigError> {
        self.apply(|o| o.create_lookup_table = value)
    }

    pub fn set_dilate_lookup_table(&mut self, value: bool) -> Result<(), ConfigError> {
        self.apply(|o| o.dilate_lookup_table = value)
    }

    /// Check switch compatibility and numeric ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_switches()?;
        for (name, value) in [
            (
                "min_integral_ratio_to_negative",
                self.min_integral_ratio_to_negative,
            ),
            (
                "min_peak_ratio_to_negative_mean",
                self.min_peak_ratio_to_negative_mean,
            ),
            ("peak_value_threshold", self.peak_value_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        // +inf is meaningful here (never merge)
        if self.merge_ratio.is_nan() || self.merge_ratio < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "merge_ratio",
                value: self.merge_ratio,
            });
        }
        Ok(())
    }

    fn check_switches(&self) -> Result<(), ConfigError> {
        if self.create_null_lobe && self.dilate_lookup_table {
            return Err(ConfigError::NullLobeWithDilation);
        }
        if !self.create_lookup_table && self.dilate_lookup_table {
            return Err(ConfigError::DilationWithoutLookup);
        }
        Ok(())
    }

    fn apply(&mut self, change: impl FnOnce(&mut Self)) -> Result<(), ConfigError> {
        let mut next = *self;
        change(&mut next);
        next.check_switches()?;
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let o = SegmenterOptions::default();
        assert_eq!(o.min_integral_ratio_to_negative, 0.0);
        assert_eq!(o.min_peak_ratio_to_negative_mean, 1.0);
        assert_eq!(o.peak_value_threshold, 0.1);
        assert_eq!(o.merge_ratio, 1.0);
        assert!(!o.create_null_lobe() && !o.create_lookup_table() && !o.dilate_lookup_table());
        assert!(o.validate().is_ok());
    }

    #[test]
    fn dilation_requires_lookup_table() {
        let mut o = SegmenterOptions::default();
        assert_eq!(
            o.set_dilate_lookup_table(true),
            Err(ConfigError::DilationWithoutLookup)
        );
        assert!(!o.dilate_lookup_table());
        o.set_create_lookup_table(true).unwrap();
        o.set_dilate_lookup_table(true).unwrap();
        assert_eq!(
            o.set_create_lookup_table(false),
            Err(ConfigError::DilationWithoutLookup)
        );
        assert!(o.create_lookup_table());
    }

    #[test]
    fn null_lobe_excludes_dilation() {
        let mut o = SegmenterOptions::default();
        o.set_create_lookup_table(true).unwrap();
        o.set_dilate_lookup_table(true).unwrap();
        assert_eq!(
            o.set_create_null_lobe(true),
            Err(ConfigError::NullLobeWithDilation)
        );

        let mut o = SegmenterOptions::default();
        o.set_create_lookup_table(true).unwrap();
        o.set_create_null_lobe(true).unwrap();
        assert_eq!(
            o.set_dilate_lookup_table(true),
            Err(ConfigError::NullLobeWithDilation)
        );
    }

    #[test]
    fn deserialized_options_are_validated() {
        let o: SegmenterOptions =
            serde_json::from_str(r#"{"dilate_lookup_table": true}"#).unwrap();
        assert_eq!(o.validate(), Err(ConfigError::DilationWithoutLookup));

        let o: SegmenterOptions = serde_json::from_str(r#"{"peak_value_threshold": -1.0}"#).unwrap();
        assert!(matches!(
            o.validate(),
            Err(ConfigError::InvalidParameter {
                name: "peak_value_threshold",
                ..
            })
        ));

        let o = SegmenterOptions {
            merge_ratio: f32::INFINITY,
            ..Default::default()
        };
        assert!(o.validate().is_ok());
    }
}
