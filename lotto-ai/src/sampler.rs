use anyhow::Result;
use chrono::Datelike;
use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;

use lotto_db::models::PICK_COUNT;

use crate::score::ScoreBreakdown;

/// Poids plancher : un numéro au score nul reste tirable.
const MIN_WEIGHT: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub numbers: [u8; 6],
    pub score: f64,
}

/// Seed déterministe basé sur la date du jour (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

/// Nombre de numéros de `a` absents de `b`.
fn grid_distance(a: &[u8; 6], b: &[u8; 6]) -> usize {
    a.iter().filter(|x| !b.contains(x)).count()
}

/// Sélection gloutonne : meilleur score + diversité minimum entre paires.
fn select_diverse(candidates: &[Suggestion], count: usize, min_diff: usize) -> Vec<Suggestion> {
    let mut selected: Vec<Suggestion> = Vec::with_capacity(count);

    for candidate in candidates {
        if selected.len() >= count {
            break;
        }
        let too_close = selected
            .iter()
            .any(|s| grid_distance(&candidate.numbers, &s.numbers) < min_diff);
        if !too_close {
            selected.push(candidate.clone());
        }
    }

    // Pas assez de grilles diversifiées : compléter avec les meilleures restantes
    if selected.len() < count {
        for candidate in candidates {
            if selected.len() >= count {
                break;
            }
            if !selected.iter().any(|s| s.numbers == candidate.numbers) {
                selected.push(candidate.clone());
            }
        }
    }

    selected
}

fn grid_score(numbers: &[u8; 6], scores: &[ScoreBreakdown]) -> f64 {
    numbers
        .iter()
        .filter_map(|n| scores.iter().find(|s| s.num == *n))
        .map(|s| s.total)
        .sum()
}

/// Grille déterministe : les 6 meilleurs scores.
pub fn optimal_grid(scores: &[ScoreBreakdown]) -> Suggestion {
    let ranked = crate::score::rank(scores);
    let mut numbers = [0u8; 6];
    for (i, s) in ranked.iter().take(PICK_COUNT).enumerate() {
        numbers[i] = s.num;
    }
    numbers.sort();
    Suggestion {
        score: grid_score(&numbers, scores),
        numbers,
    }
}

pub fn recommend(
    scores: &[ScoreBreakdown],
    count: usize,
    seed: u64,
    oversample: usize,
    min_diff: usize,
) -> Result<Vec<Suggestion>> {
    let mut rng = StdRng::seed_from_u64(seed);

    let n_candidates = count * oversample.max(1);
    let mut candidates = Vec::with_capacity(n_candidates);

    for _ in 0..n_candidates {
        let picked = sample_without_replacement(scores, PICK_COUNT, &mut rng)?;
        let mut numbers = [0u8; 6];
        numbers.copy_from_slice(&picked);
        numbers.sort();
        candidates.push(Suggestion {
            score: grid_score(&numbers, scores),
            numbers,
        });
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    Ok(select_diverse(&candidates, count, min_diff))
}

fn sample_without_replacement(
    scores: &[ScoreBreakdown],
    count: usize,
    rng: &mut StdRng,
) -> Result<Vec<u8>> {
    let mut available: Vec<(u8, f64)> = scores
        .iter()
        .map(|s| (s.num, s.total.max(MIN_WEIGHT)))
        .collect();
    let mut selected = Vec::with_capacity(count);

    for _ in 0..count {
        let weights: Vec<f64> = available.iter().map(|(_, w)| *w).collect();
        let dist = WeightedIndex::new(&weights)?;
        let idx = dist.sample(rng);
        let (number, _) = available.remove(idx);
        selected.push(number);
    }

    Ok(selected)
}
