use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lotto_db::models::{Zone, POOL_SIZE};

use super::pattern::{PatternBands, PatternWeights};
use super::FeatureMap;
use crate::analysis::{AnalysisProvider, AnalysisSnapshot, NumberTable};

/// Poids des quatre paquets k-match. Leur somme vaut 1.05 : mélange non normalisé,
/// pas une probabilité.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KMatchWeights {
    pub one: f64,
    pub two: f64,
    pub three: f64,
    pub four_plus: f64,
}

impl Default for KMatchWeights {
    fn default() -> Self {
        Self {
            one: 0.7,
            two: 0.2,
            three: 0.1,
            four_plus: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberFeatures {
    pub num: u8,
    pub features: FeatureMap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendResult {
    pub round: u32,
    pub features_by_number: Vec<NumberFeatures>,
}

impl BlendResult {
    pub fn features_of(&self, num: u8) -> Option<&FeatureMap> {
        self.features_by_number
            .iter()
            .find(|nf| nf.num == num)
            .map(|nf| &nf.features)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureBlender {
    pub k_match: KMatchWeights,
    pub bands: PatternBands,
}

fn lookup(table: &NumberTable, num: u8, fallback: f64) -> f64 {
    table.get(&num).copied().unwrap_or(fallback)
}

impl FeatureBlender {
    pub fn new(k_match: KMatchWeights, bands: PatternBands) -> Self {
        Self { k_match, bands }
    }

    /// Un seul appel au fournisseur, puis mélange pur. Les erreurs du fournisseur
    /// remontent telles quelles.
    pub fn blend<P: AnalysisProvider + ?Sized>(
        &self,
        provider: &P,
        round: u32,
        cluster_unit: i64,
        recent_count: u32,
    ) -> Result<BlendResult> {
        let snapshot = provider
            .analyze_round(round, false, recent_count)
            .with_context(|| format!("Analyse du tirage {round} impossible"))?;
        Ok(self.blend_snapshot(&snapshot, cluster_unit))
    }

    /// Toujours 45 entrées, numéros 1..=45 dans l'ordre.
    pub fn blend_snapshot(&self, snapshot: &AnalysisSnapshot, cluster_unit: i64) -> BlendResult {
        let weights = self.bands.select(cluster_unit);
        let features_by_number = (1..=POOL_SIZE)
            .map(|num| NumberFeatures {
                num,
                features: self.features_for(snapshot, num, weights),
            })
            .collect();

        BlendResult {
            round: snapshot.round,
            features_by_number,
        }
    }

    fn features_for(&self, snap: &AnalysisSnapshot, num: u8, pw: PatternWeights) -> FeatureMap {
        let d = FeatureMap::NEUTRAL;

        let selected = snap.per_number_next.len();
        let per_number = if selected == 0 {
            d.per_number
        } else {
            let total: f64 = snap
                .per_number_next
                .values()
                .map(|table| lookup(table, num, 0.0))
                .sum();
            total / selected as f64
        };

        let km = &snap.k_match_next;
        let k_match = self.k_match.one * lookup(&km.one, num, d.k_match)
            + self.k_match.two * lookup(&km.two, num, d.k_match)
            + self.k_match.three * lookup(&km.three, num, d.k_match)
            + self.k_match.four_plus * lookup(&km.four_plus, num, d.k_match);

        let pn = &snap.pattern_next;
        let pattern = pw.w10 * lookup(&pn.unit10, num, d.pattern)
            + pw.w7 * lookup(&pn.unit7, num, d.pattern)
            + pw.w5 * lookup(&pn.unit5, num, d.pattern);

        let recent = lookup(&snap.recent, num, d.recent);

        let odd_even = match snap.odd_even_ratio {
            Some(ratio) if num % 2 == 1 => ratio,
            Some(ratio) => 1.0 - ratio,
            None => d.odd_even,
        };

        let sum_range = match &snap.sum_range {
            Some(s) => {
                lookup(&s.low, num, 0.0) + lookup(&s.mid, num, 0.0) + lookup(&s.high, num, 0.0)
            }
            None => d.sum_range,
        };

        let zone = match &snap.zone {
            Some(z) => lookup(z.for_zone(Zone::of(num)), num, d.zone),
            None => d.zone,
        };

        FeatureMap {
            per_number,
            k_match,
            pattern,
            recent,
            odd_even,
            sum_range,
            zone,
        }
    }
}
