use lotto_db::models::{Draw, NumberStats, POOL_SIZE};

/// Fréquence et retard de chaque numéro. `draws[0]` = tirage le plus récent.
pub fn compute_stats(draws: &[Draw], include_bonus: bool) -> Vec<NumberStats> {
    let mut stats: Vec<NumberStats> = (1..=POOL_SIZE)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: draws.len() as u32,
        })
        .collect();

    for (i, draw) in draws.iter().enumerate() {
        for n in draw.drawn(include_bonus) {
            let stat = &mut stats[(n - 1) as usize];
            if stat.frequency == 0 {
                stat.gap = i as u32;
            }
            stat.frequency += 1;
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotto_db::models::make_test_draws;

    #[test]
    fn test_stats_cover_pool() {
        let stats = compute_stats(&make_test_draws(10), false);
        assert_eq!(stats.len(), 45);
        let total: u32 = stats.iter().map(|s| s.frequency).sum();
        assert_eq!(total, 60);
    }

    #[test]
    fn test_gap() {
        let mut draws = make_test_draws(3);
        draws.reverse(); // plus récent d'abord : rounds 3, 2, 1
        let stats = compute_stats(&draws, false);
        // round 3 → base 2 → numéros 13..18
        assert_eq!(stats[12].gap, 0);
        // round 1 → numéros 1..6, vus il y a 2 tirages
        assert_eq!(stats[0].gap, 2);
        // jamais tiré
        assert_eq!(stats[44].gap, 3);
        assert_eq!(stats[44].frequency, 0);
    }

    #[test]
    fn test_include_bonus() {
        let draws = make_test_draws(1);
        let with = compute_stats(&draws, true);
        assert_eq!(with[(draws[0].bonus - 1) as usize].frequency, 1);
        let without = compute_stats(&draws, false);
        assert_eq!(without[(draws[0].bonus - 1) as usize].frequency, 0);
    }
}
