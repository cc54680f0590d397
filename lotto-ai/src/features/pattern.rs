use serde::{Deserialize, Serialize};

/// Poids des trois granularités de motifs (paquets de 10, 7 et 5 numéros).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternWeights {
    pub w10: f64,
    pub w7: f64,
    pub w5: f64,
}

impl PatternWeights {
    pub const fn new(w10: f64, w7: f64, w5: f64) -> Self {
        Self { w10, w7, w5 }
    }

    pub fn sum(&self) -> f64 {
        self.w10 + self.w7 + self.w5
    }
}

/// Bandes de sélection par seuil, sans interpolation.
/// Constantes réglées à la main : à confirmer avant toute modification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternBands {
    pub wide_from: i64,
    pub medium_from: i64,
    pub wide: PatternWeights,
    pub medium: PatternWeights,
    pub narrow: PatternWeights,
}

impl Default for PatternBands {
    fn default() -> Self {
        Self {
            wide_from: 9,
            medium_from: 7,
            wide: PatternWeights::new(0.6, 0.3, 0.1),
            medium: PatternWeights::new(0.3, 0.5, 0.2),
            narrow: PatternWeights::new(0.2, 0.3, 0.5),
        }
    }
}

impl PatternBands {
    pub fn select(&self, cluster_unit: i64) -> PatternWeights {
        if cluster_unit >= self.wide_from {
            self.wide
        } else if cluster_unit >= self.medium_from {
            self.medium
        } else {
            self.narrow
        }
    }
}

pub fn pattern_weights(cluster_unit: i64) -> PatternWeights {
    PatternBands::default().select(cluster_unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_sum_to_one_for_any_unit() {
        for unit in -50..=50 {
            let w = pattern_weights(unit);
            assert!(w.w10 >= 0.0 && w.w7 >= 0.0 && w.w5 >= 0.0);
            assert!((w.sum() - 1.0).abs() < 1e-12, "unit={unit} sum={}", w.sum());
        }
        for unit in [i64::MIN, i64::MAX] {
            assert!((pattern_weights(unit).sum() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(pattern_weights(10), PatternWeights::new(0.6, 0.3, 0.1));
        assert_eq!(pattern_weights(9), PatternWeights::new(0.6, 0.3, 0.1));
        assert_eq!(pattern_weights(8), PatternWeights::new(0.3, 0.5, 0.2));
        assert_eq!(pattern_weights(7), PatternWeights::new(0.3, 0.5, 0.2));
        assert_eq!(pattern_weights(6), PatternWeights::new(0.2, 0.3, 0.5));
        assert_eq!(pattern_weights(5), PatternWeights::new(0.2, 0.3, 0.5));
        assert_eq!(pattern_weights(0), PatternWeights::new(0.2, 0.3, 0.5));
    }

    #[test]
    fn test_preferred_granularity_is_largest() {
        let w = pattern_weights(10);
        assert!(w.w10 > w.w7 && w.w10 > w.w5);
        let w = pattern_weights(7);
        assert!(w.w7 > w.w10 && w.w7 > w.w5);
        let w = pattern_weights(5);
        assert!(w.w5 > w.w10 && w.w5 > w.w7);
    }
}
