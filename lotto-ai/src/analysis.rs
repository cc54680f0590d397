use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use lotto_db::models::{Draw, Zone, POOL_SIZE};

/// Table creuse numéro → valeur. Une entrée absente vaut la valeur par défaut de la feature.
pub type NumberTable = BTreeMap<u8, f64>;

/// Seuils de somme (6 numéros principaux) : low ≤ 125 < mid ≤ 151 < high.
pub const SUM_LOW_MAX: u32 = 125;
pub const SUM_MID_MAX: u32 = 151;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KMatchNext {
    #[serde(rename = "1", default)]
    pub one: NumberTable,
    #[serde(rename = "2", default)]
    pub two: NumberTable,
    #[serde(rename = "3", default)]
    pub three: NumberTable,
    #[serde(rename = "4+", default)]
    pub four_plus: NumberTable,
}

impl KMatchNext {
    fn bucket_mut(&mut self, k: usize) -> Option<&mut NumberTable> {
        match k {
            0 => None,
            1 => Some(&mut self.one),
            2 => Some(&mut self.two),
            3 => Some(&mut self.three),
            _ => Some(&mut self.four_plus),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternNext {
    #[serde(default)]
    pub unit5: NumberTable,
    #[serde(default)]
    pub unit7: NumberTable,
    #[serde(default)]
    pub unit10: NumberTable,
}

/// Trois tables low / mid / high, utilisées pour les sommes comme pour les zones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeTables {
    #[serde(default)]
    pub low: NumberTable,
    #[serde(default)]
    pub mid: NumberTable,
    #[serde(default)]
    pub high: NumberTable,
}

impl RangeTables {
    pub fn for_zone(&self, zone: Zone) -> &NumberTable {
        match zone {
            Zone::Low => &self.low,
            Zone::Mid => &self.mid,
            Zone::High => &self.high,
        }
    }

    fn for_zone_mut(&mut self, zone: Zone) -> &mut NumberTable {
        match zone {
            Zone::Low => &mut self.low,
            Zone::Mid => &mut self.mid,
            Zone::High => &mut self.high,
        }
    }
}

/// Statistiques précalculées pour un tirage de référence. Immuable une fois produit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub round: u32,
    /// Numéro sélectionné → fréquence d'apparition de chaque numéro au tirage suivant.
    #[serde(default)]
    pub per_number_next: BTreeMap<u8, NumberTable>,
    #[serde(default)]
    pub k_match_next: KMatchNext,
    #[serde(default)]
    pub pattern_next: PatternNext,
    #[serde(default)]
    pub recent: NumberTable,
    #[serde(default)]
    pub odd_even_ratio: Option<f64>,
    #[serde(default)]
    pub sum_range: Option<RangeTables>,
    #[serde(default)]
    pub zone: Option<RangeTables>,
}

pub trait AnalysisProvider {
    fn analyze_round(
        &self,
        round: u32,
        include_bonus: bool,
        recent_count: u32,
    ) -> Result<AnalysisSnapshot>;
}

/// Accès aux numéros gagnants d'un tirage, `None` si le tirage n'est pas encore connu.
pub trait DrawSource {
    fn winning_numbers(&self, round: u32) -> Result<Option<[u8; 6]>>;
}

impl AnalysisProvider for BTreeMap<u32, AnalysisSnapshot> {
    fn analyze_round(
        &self,
        round: u32,
        _include_bonus: bool,
        _recent_count: u32,
    ) -> Result<AnalysisSnapshot> {
        self.get(&round)
            .cloned()
            .ok_or_else(|| anyhow!("Aucune analyse disponible pour le tirage {round}"))
    }
}

impl DrawSource for BTreeMap<u32, [u8; 6]> {
    fn winning_numbers(&self, round: u32) -> Result<Option<[u8; 6]>> {
        Ok(self.get(&round).copied())
    }
}

/// Motif d'occupation : nombre de numéros tirés dans chaque paquet de `unit` numéros.
pub fn bucket_pattern(numbers: &[u8], unit: u8) -> Vec<u8> {
    let buckets = (POOL_SIZE as usize).div_ceil(unit as usize);
    let mut pattern = vec![0u8; buckets];
    for &n in numbers {
        pattern[((n - 1) / unit) as usize] += 1;
    }
    pattern
}

fn sum_bucket(sum: u32) -> Zone {
    if sum <= SUM_LOW_MAX {
        Zone::Low
    } else if sum <= SUM_MID_MAX {
        Zone::Mid
    } else {
        Zone::High
    }
}

/// Compte les apparitions au tirage suivant puis normalise par le nombre de transitions.
#[derive(Default)]
struct NextCounter {
    transitions: u32,
    hits: BTreeMap<u8, u32>,
}

impl NextCounter {
    fn record(&mut self, next: &[u8]) {
        self.transitions += 1;
        for &n in next {
            *self.hits.entry(n).or_insert(0) += 1;
        }
    }

    fn into_table(self) -> NumberTable {
        if self.transitions == 0 {
            return NumberTable::new();
        }
        let total = self.transitions as f64;
        self.hits
            .into_iter()
            .map(|(n, c)| (n, c as f64 / total))
            .collect()
    }
}

/// Calcule un `AnalysisSnapshot` à partir de l'historique des tirages.
pub struct HistoryAnalyzer;

impl HistoryAnalyzer {
    /// `history` : tirages triés par round croissant, le dernier étant `round`.
    pub fn analyze(
        history: &[Draw],
        round: u32,
        include_bonus: bool,
        recent_count: u32,
    ) -> Result<AnalysisSnapshot> {
        let reference = match history.last() {
            Some(d) if d.round == round => d,
            _ => bail!("Tirage {round} introuvable dans l'historique"),
        };
        if history.windows(2).any(|w| w[0].round >= w[1].round) {
            bail!("Historique non trié par round croissant");
        }

        let ref_numbers = reference.drawn(include_bonus);

        // Transitions (t, t+1) entre tirages consécutifs uniquement
        let transitions: Vec<(&Draw, Vec<u8>)> = history
            .windows(2)
            .filter(|w| w[1].round == w[0].round + 1)
            .map(|w| (&w[0], w[1].drawn(include_bonus)))
            .collect();

        let mut per_number: BTreeMap<u8, NextCounter> =
            ref_numbers.iter().map(|&s| (s, NextCounter::default())).collect();
        let mut k_match: [NextCounter; 4] = Default::default();
        let mut patterns: [NextCounter; 3] = Default::default();
        let mut sums: [NextCounter; 3] = Default::default();

        let units = [5u8, 7, 10];
        let ref_patterns: Vec<Vec<u8>> = units
            .iter()
            .map(|&u| bucket_pattern(&ref_numbers, u))
            .collect();

        for (start, next) in &transitions {
            let start_numbers = start.drawn(include_bonus);

            for &s in &start_numbers {
                if let Some(counter) = per_number.get_mut(&s) {
                    counter.record(next);
                }
            }

            let k = start_numbers.iter().filter(|n| ref_numbers.contains(n)).count();
            if k > 0 {
                k_match[k.min(4) - 1].record(next);
            }

            for (i, &u) in units.iter().enumerate() {
                if bucket_pattern(&start_numbers, u) == ref_patterns[i] {
                    patterns[i].record(next);
                }
            }

            sums[sum_bucket(start.sum()) as usize].record(next);
        }

        let mut k_match_next = KMatchNext::default();
        for (i, counter) in k_match.into_iter().enumerate() {
            if let Some(table) = k_match_next.bucket_mut(i + 1) {
                *table = counter.into_table();
            }
        }

        let [p5, p7, p10] = patterns;
        let pattern_next = PatternNext {
            unit5: p5.into_table(),
            unit7: p7.into_table(),
            unit10: p10.into_table(),
        };

        let [s_low, s_mid, s_high] = sums;
        let sum_range = RangeTables {
            low: s_low.into_table(),
            mid: s_mid.into_table(),
            high: s_high.into_table(),
        };

        let window = (recent_count as usize).min(history.len());
        let mut recent = NumberTable::new();
        let mut odd = 0u32;
        let mut total = 0u32;
        for draw in &history[history.len() - window..] {
            for n in draw.drawn(include_bonus) {
                *recent.entry(n).or_insert(0.0) += 1.0;
                total += 1;
                if n % 2 == 1 {
                    odd += 1;
                }
            }
        }
        let odd_even_ratio = if total > 0 { Some(odd as f64 / total as f64) } else { None };

        let mut zone = RangeTables::default();
        let draws = history.len() as f64;
        for n in 1..=POOL_SIZE {
            let hits = history.iter().filter(|d| d.drawn(include_bonus).contains(&n)).count();
            if hits > 0 {
                zone.for_zone_mut(Zone::of(n)).insert(n, hits as f64 / draws);
            }
        }

        Ok(AnalysisSnapshot {
            round,
            per_number_next: per_number
                .into_iter()
                .map(|(s, counter)| (s, counter.into_table()))
                .collect(),
            k_match_next,
            pattern_next,
            recent,
            odd_even_ratio,
            sum_range: Some(sum_range),
            zone: Some(zone),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto_db::models::make_test_draws;

    fn draw(round: u32, numbers: [u8; 6], bonus: u8) -> Draw {
        Draw {
            round,
            date: format!("2024-01-{:02}", round),
            numbers,
            bonus,
            first_winners: 0,
            first_prize: 0.0,
        }
    }

    #[test]
    fn test_bucket_pattern() {
        assert_eq!(bucket_pattern(&[1, 2, 11, 21, 31, 45], 10), vec![2, 1, 1, 1, 1]);
        assert_eq!(bucket_pattern(&[1, 2, 3, 4, 5, 6], 5).len(), 9);
        assert_eq!(bucket_pattern(&[1, 2, 3, 4, 5, 6], 7).len(), 7);
        assert_eq!(bucket_pattern(&[43, 44, 45], 7)[6], 3);
    }

    #[test]
    fn test_sum_bucket_boundaries() {
        assert_eq!(sum_bucket(125), Zone::Low);
        assert_eq!(sum_bucket(126), Zone::Mid);
        assert_eq!(sum_bucket(151), Zone::Mid);
        assert_eq!(sum_bucket(152), Zone::High);
    }

    #[test]
    fn test_analyze_requires_reference_last() {
        let draws = make_test_draws(10);
        assert!(HistoryAnalyzer::analyze(&draws, 10, false, 5).is_ok());
        assert!(HistoryAnalyzer::analyze(&draws, 9, false, 5).is_err());
        assert!(HistoryAnalyzer::analyze(&[], 1, false, 5).is_err());
    }

    #[test]
    fn test_per_number_next() {
        let history = vec![
            draw(1, [1, 2, 3, 4, 5, 6], 7),
            draw(2, [1, 10, 20, 30, 40, 45], 8),
            draw(3, [1, 2, 3, 4, 5, 6], 9),
        ];
        let snap = HistoryAnalyzer::analyze(&history, 3, false, 10).unwrap();

        // Les numéros sélectionnés sont ceux du tirage de référence
        let keys: Vec<u8> = snap.per_number_next.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5, 6]);

        // 1 apparaît en 1 et 2 → suivants : tirage 2 et tirage 3
        let one = &snap.per_number_next[&1];
        assert_eq!(one[&45], 0.5);
        assert_eq!(one[&2], 0.5);
        assert_eq!(one[&1], 1.0);

        // 2 n'apparaît qu'en 1 → suivant : tirage 2
        assert_eq!(snap.per_number_next[&2][&10], 1.0);
        assert!(!snap.per_number_next[&2].contains_key(&3));
    }

    #[test]
    fn test_k_match_buckets() {
        let history = vec![
            draw(1, [1, 2, 3, 4, 5, 6], 7),
            draw(2, [1, 10, 20, 30, 40, 45], 8),
            draw(3, [1, 2, 3, 4, 5, 6], 9),
        ];
        let snap = HistoryAnalyzer::analyze(&history, 3, false, 10).unwrap();
        // tirage 1 partage 6 numéros → 4+, tirage 2 partage 1 numéro → 1
        assert_eq!(snap.k_match_next.four_plus[&10], 1.0);
        assert_eq!(snap.k_match_next.one[&3], 1.0);
        assert!(snap.k_match_next.two.is_empty());
        assert!(snap.k_match_next.three.is_empty());
    }

    #[test]
    fn test_gaps_break_transitions() {
        let history = vec![
            draw(1, [1, 2, 3, 4, 5, 6], 7),
            draw(3, [11, 12, 13, 14, 15, 16], 8),
            draw(4, [1, 2, 3, 4, 5, 6], 9),
        ];
        let snap = HistoryAnalyzer::analyze(&history, 4, false, 10).unwrap();
        // seule la transition 3 → 4 compte ; 1 n'apparaît pas en 3
        assert!(snap.per_number_next[&1].is_empty());
    }

    #[test]
    fn test_recent_and_odd_even() {
        let history = vec![
            draw(1, [1, 2, 3, 4, 5, 6], 7),
            draw(2, [1, 3, 5, 7, 9, 11], 8),
        ];
        let snap = HistoryAnalyzer::analyze(&history, 2, false, 1).unwrap();
        assert_eq!(snap.recent[&1], 1.0);
        assert!(!snap.recent.contains_key(&2));
        assert_eq!(snap.odd_even_ratio, Some(1.0));

        let snap = HistoryAnalyzer::analyze(&history, 2, false, 10).unwrap();
        assert_eq!(snap.recent[&1], 2.0);
        assert_eq!(snap.odd_even_ratio, Some(9.0 / 12.0));

        let snap = HistoryAnalyzer::analyze(&history, 2, false, 0).unwrap();
        assert!(snap.recent.is_empty());
        assert_eq!(snap.odd_even_ratio, None);
    }

    #[test]
    fn test_include_bonus() {
        let history = vec![
            draw(1, [1, 2, 3, 4, 5, 6], 7),
            draw(2, [10, 11, 12, 13, 14, 15], 16),
        ];
        let without = HistoryAnalyzer::analyze(&history, 2, false, 5).unwrap();
        let with = HistoryAnalyzer::analyze(&history, 2, true, 5).unwrap();
        assert!(!without.recent.contains_key(&16));
        assert_eq!(with.recent[&16], 1.0);
        assert_eq!(with.per_number_next.len(), 7);
    }

    #[test]
    fn test_zone_tables_grouped() {
        let draws = make_test_draws(21);
        let snap = HistoryAnalyzer::analyze(&draws, 21, false, 5).unwrap();
        let zone = snap.zone.unwrap();
        assert!(zone.low.keys().all(|&n| n <= 15));
        assert!(zone.mid.keys().all(|&n| (16..=30).contains(&n)));
        assert!(zone.high.keys().all(|&n| n >= 31));
        // 21 tirages, cycle de 7 → chaque numéro 1..=42 apparaît 3 fois
        assert!((zone.low[&1] - 3.0 / 21.0).abs() < 1e-12);
    }

    #[test]
    fn test_snapshot_json_fixture() {
        let json = r#"{
            "round": 5,
            "perNumberNext": { "3": { "7": 0.25 } },
            "kMatchNext": { "1": { "7": 0.5 }, "4+": { "7": 0.1 } },
            "oddEvenRatio": 0.6
        }"#;
        let snap: AnalysisSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.round, 5);
        assert_eq!(snap.per_number_next[&3][&7], 0.25);
        assert_eq!(snap.k_match_next.four_plus[&7], 0.1);
        assert!(snap.k_match_next.two.is_empty());
        assert!(snap.zone.is_none());
        assert_eq!(snap.odd_even_ratio, Some(0.6));
    }

    #[test]
    fn test_map_providers() {
        let mut snaps = BTreeMap::new();
        snaps.insert(4u32, AnalysisSnapshot { round: 4, ..Default::default() });
        assert_eq!(snaps.analyze_round(4, false, 20).unwrap().round, 4);
        assert!(snaps.analyze_round(5, false, 20).is_err());

        let mut next: BTreeMap<u32, [u8; 6]> = BTreeMap::new();
        next.insert(5, [1, 2, 3, 4, 5, 6]);
        assert_eq!(next.winning_numbers(5).unwrap(), Some([1, 2, 3, 4, 5, 6]));
        assert_eq!(next.winning_numbers(6).unwrap(), None);
    }
}
