use anyhow::{bail, Result};

/// Taille de la grille : numéros de 1 à 45.
pub const POOL_SIZE: u8 = 45;
/// Nombre de numéros principaux par tirage (hors bonus).
pub const PICK_COUNT: usize = 6;

#[derive(Debug, Clone)]
pub struct Draw {
    pub round: u32,
    pub date: String,
    pub numbers: [u8; 6],
    pub bonus: u8,
    pub first_winners: i32,
    pub first_prize: f64,
}

impl Draw {
    /// Numéros principaux, suivis du bonus si demandé.
    pub fn drawn(&self, include_bonus: bool) -> Vec<u8> {
        let mut out = self.numbers.to_vec();
        if include_bonus {
            out.push(self.bonus);
        }
        out
    }

    pub fn sum(&self) -> u32 {
        self.numbers.iter().map(|&n| n as u32).sum()
    }
}

/// Plage positionnelle grossière d'un numéro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Zone {
    Low,
    Mid,
    High,
}

impl Zone {
    pub fn of(number: u8) -> Zone {
        if number <= 15 {
            Zone::Low
        } else if number <= 30 {
            Zone::Mid
        } else {
            Zone::High
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Low => write!(f, "low"),
            Zone::Mid => write!(f, "mid"),
            Zone::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
}

pub fn validate_draw(numbers: &[u8; 6], bonus: u8) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            bail!("Numéro {} hors limites (1-{})", n, POOL_SIZE);
        }
    }
    if bonus < 1 || bonus > POOL_SIZE {
        bail!("Bonus {} hors limites (1-{})", bonus, POOL_SIZE);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    if numbers.contains(&bonus) {
        bail!("Le bonus {} figure déjà parmi les numéros", bonus);
    }
    Ok(())
}

/// Tirages synthétiques consécutifs (rounds 1..=n), valides pour `validate_draw`.
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    (0..n)
        .map(|i| {
            let base = (i % 7) as u8;
            Draw {
                round: i as u32 + 1,
                date: format!("2024-{:02}-{:02}", (i / 28) % 12 + 1, (i % 28) + 1),
                numbers: [
                    base * 6 + 1,
                    base * 6 + 2,
                    base * 6 + 3,
                    base * 6 + 4,
                    base * 6 + 5,
                    base * 6 + 6,
                ],
                bonus: if base == 6 { 1 } else { base * 6 + 7 },
                first_winners: 0,
                first_prize: 0.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_draw_ok() {
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 7).is_ok());
        assert!(validate_draw(&[45, 44, 43, 42, 41, 40], 1).is_ok());
    }

    #[test]
    fn test_validate_draw_out_of_range() {
        assert!(validate_draw(&[0, 2, 3, 4, 5, 6], 7).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 46], 7).is_err());
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 46).is_err());
    }

    #[test]
    fn test_validate_draw_duplicates() {
        assert!(validate_draw(&[1, 1, 3, 4, 5, 6], 7).is_err());
    }

    #[test]
    fn test_validate_draw_bonus_in_numbers() {
        assert!(validate_draw(&[1, 2, 3, 4, 5, 6], 6).is_err());
    }

    #[test]
    fn test_zone_boundaries() {
        assert_eq!(Zone::of(1), Zone::Low);
        assert_eq!(Zone::of(15), Zone::Low);
        assert_eq!(Zone::of(16), Zone::Mid);
        assert_eq!(Zone::of(30), Zone::Mid);
        assert_eq!(Zone::of(31), Zone::High);
        assert_eq!(Zone::of(45), Zone::High);
    }

    #[test]
    fn test_zone_label() {
        assert_eq!(Zone::of(15).to_string(), "low");
        assert_eq!(Zone::of(16).to_string(), "mid");
        assert_eq!(Zone::of(31).to_string(), "high");
    }

    #[test]
    fn test_drawn_with_bonus() {
        let draws = make_test_draws(1);
        let draw = &draws[0];
        assert_eq!(draw.drawn(false).len(), 6);
        assert_eq!(draw.drawn(true).len(), 7);
        assert_eq!(draw.drawn(true)[6], draw.bonus);
    }

    #[test]
    fn test_make_test_draws_valid() {
        for draw in make_test_draws(30) {
            let valid = validate_draw(&draw.numbers, draw.bonus);
            assert!(valid.is_ok(), "tirage {} invalide", draw.round);
        }
    }
}
