use anyhow::{bail, Context, Result};
use lotto_db::rusqlite::Connection;
use std::path::Path;

use lotto_db::db::insert_draw;
use lotto_db::models::{validate_draw, Draw};

pub fn parse_amount(s: &str) -> Result<f64> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }
    let normalized: String = s.chars().filter(|c| !matches!(c, ',' | '₩' | ' ')).collect();
    normalized
        .parse::<f64>()
        .with_context(|| format!("Impossible de parser le montant: '{}'", s))
}

/// `YYYY.MM.DD` → `YYYY-MM-DD`.
pub(crate) fn parse_date(raw: &str) -> Result<String> {
    let parts: Vec<&str> = raw.split('.').map(str::trim).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        bail!("Format de date invalide: '{}'", raw);
    }
    Ok(format!("{}-{:0>2}-{:0>2}", parts[0], parts[1], parts[2]))
}

fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let round_str = get(0)?;
    let round: u32 = round_str
        .parse()
        .with_context(|| format!("Numéro de tirage invalide: '{}'", round_str))?;
    let date = parse_date(&get(1)?)?;

    let numbers: [u8; 6] = [
        get_u8(2)?,
        get_u8(3)?,
        get_u8(4)?,
        get_u8(5)?,
        get_u8(6)?,
        get_u8(7)?,
    ];
    let bonus = get_u8(8)?;
    validate_draw(&numbers, bonus)?;

    let first_winners: i32 = get(9).ok().and_then(|s| s.parse().ok()).unwrap_or(0);
    let first_prize = parse_amount(&get(10).unwrap_or_default()).unwrap_or(0.0);

    Ok(Draw {
        round,
        date,
        numbers,
        bonus,
        first_winners,
        first_prize,
    })
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

/// CSV avec en-tête : `round,date,n1,n2,n3,n4,n5,n6,bonus[,first_winners,first_prize]`.
pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        let draw = match record_result
            .context("Erreur de lecture")
            .and_then(|record| parse_record(&record))
        {
            Ok(draw) => draw,
            Err(e) => {
                log::warn!("Ligne {} ignorée : {:#}", result.total_records, e);
                result.errors += 1;
                continue;
            }
        };
        match insert_draw(&tx, &draw) {
            Ok(true) => result.inserted += 1,
            Ok(false) => result.skipped += 1,
            Err(e) => {
                log::warn!("Erreur insertion tirage {}: {:#}", draw.round, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}
