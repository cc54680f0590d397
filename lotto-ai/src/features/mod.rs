pub mod blend;
pub mod pattern;

use serde::{Deserialize, Serialize};

pub use blend::{BlendResult, FeatureBlender, KMatchWeights, NumberFeatures};
pub use pattern::{pattern_weights, PatternBands, PatternWeights};

/// Ordre canonique des 7 features, tel qu'écrit dans les jeux d'entraînement.
pub const FEATURE_NAMES: &[&str] = &[
    "perNumber",
    "kMatch",
    "pattern",
    "recent",
    "oddEven",
    "sumRange",
    "zone",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    PerNumber,
    KMatch,
    Pattern,
    Recent,
    OddEven,
    SumRange,
    Zone,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::PerNumber,
        Feature::KMatch,
        Feature::Pattern,
        Feature::Recent,
        Feature::OddEven,
        Feature::SumRange,
        Feature::Zone,
    ];

    pub fn name(&self) -> &'static str {
        FEATURE_NAMES[*self as usize]
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Les 7 scores d'un numéro. Aucune clé ne peut manquer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureMap {
    pub per_number: f64,
    pub k_match: f64,
    pub pattern: f64,
    pub recent: f64,
    pub odd_even: f64,
    pub sum_range: f64,
    pub zone: f64,
}

impl FeatureMap {
    /// Valeurs de repli appliquées quand l'analyse ne fournit rien.
    pub const NEUTRAL: FeatureMap = FeatureMap {
        per_number: 0.0,
        k_match: 0.0,
        pattern: 0.0,
        recent: 0.0,
        odd_even: 0.5,
        sum_range: 0.0,
        zone: 0.0,
    };

    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::PerNumber => self.per_number,
            Feature::KMatch => self.k_match,
            Feature::Pattern => self.pattern,
            Feature::Recent => self.recent,
            Feature::OddEven => self.odd_even,
            Feature::SumRange => self.sum_range,
            Feature::Zone => self.zone,
        }
    }

    pub fn from_fn(mut value: impl FnMut(Feature) -> f64) -> Self {
        Self {
            per_number: value(Feature::PerNumber),
            k_match: value(Feature::KMatch),
            pattern: value(Feature::Pattern),
            recent: value(Feature::Recent),
            odd_even: value(Feature::OddEven),
            sum_range: value(Feature::SumRange),
            zone: value(Feature::Zone),
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        Feature::ALL.iter().map(|&f| self.get(f)).collect()
    }
}

impl Default for FeatureMap {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_names_match_serde_keys() {
        let json = serde_json::to_value(FeatureMap::NEUTRAL).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 7);
        for feature in Feature::ALL {
            assert!(obj.contains_key(feature.name()), "clé manquante : {feature}");
        }
    }

    #[test]
    fn test_neutral_values() {
        let neutral = FeatureMap::default();
        assert_eq!(neutral.odd_even, 0.5);
        for feature in Feature::ALL.iter().filter(|&&f| f != Feature::OddEven) {
            assert_eq!(neutral.get(*feature), 0.0);
        }
    }

    #[test]
    fn test_to_vec_order() {
        let map = FeatureMap {
            per_number: 1.0,
            k_match: 2.0,
            pattern: 3.0,
            recent: 4.0,
            odd_even: 5.0,
            sum_range: 6.0,
            zone: 7.0,
        };
        assert_eq!(map.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(FeatureMap::from_fn(|f| map.get(f)), map);
    }
}
