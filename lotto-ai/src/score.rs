use serde::{Deserialize, Serialize};

use crate::features::{BlendResult, Feature, FeatureMap};
use crate::weights::FeatureWeights;

/// Détail du score d'un numéro : contribution pondérée de chaque feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub num: u8,
    pub contributions: FeatureMap,
    pub total: f64,
}

/// Maximum de chaque feature sur les 45 numéros, 1.0 si le maximum est nul.
fn feature_scales(blend: &BlendResult) -> [f64; 7] {
    let mut scales = [0.0f64; 7];
    for nf in &blend.features_by_number {
        for (i, &f) in Feature::ALL.iter().enumerate() {
            scales[i] = scales[i].max(nf.features.get(f));
        }
    }
    for s in &mut scales {
        if *s <= 0.0 {
            *s = 1.0;
        }
    }
    scales
}

/// Les features sont ramenées sur [0, 1] par leur maximum avant pondération,
/// `recent` et `sumRange` n'étant pas normalisées en amont.
pub fn score_numbers(blend: &BlendResult, weights: &FeatureWeights) -> Vec<ScoreBreakdown> {
    let scales = feature_scales(blend);

    blend
        .features_by_number
        .iter()
        .map(|nf| {
            let scaled = FeatureMap::from_fn(|f| nf.features.get(f) / scales[f as usize]);
            ScoreBreakdown {
                num: nf.num,
                contributions: FeatureMap::from_fn(|f| weights.get(f) * scaled.get(f)),
                total: weights.dot(&scaled),
            }
        })
        .collect()
}

/// Tri par score décroissant, à égalité par numéro croissant.
pub fn rank(scores: &[ScoreBreakdown]) -> Vec<ScoreBreakdown> {
    let mut sorted = scores.to_vec();
    sorted.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.num.cmp(&b.num))
    });
    sorted
}
