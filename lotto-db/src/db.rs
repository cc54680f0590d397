use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    round          INTEGER PRIMARY KEY,
    date           TEXT NOT NULL,
    n1             INTEGER NOT NULL,
    n2             INTEGER NOT NULL,
    n3             INTEGER NOT NULL,
    n4             INTEGER NOT NULL,
    n5             INTEGER NOT NULL,
    n6             INTEGER NOT NULL,
    bonus          INTEGER NOT NULL,
    first_winners  INTEGER NOT NULL DEFAULT 0,
    first_prize    REAL NOT NULL DEFAULT 0.0
);
";

const COLUMNS: &str = "round, date, n1, n2, n3, n4, n5, n6, bonus, first_winners, first_prize";

/// Répertoire des artefacts locaux (base, poids, jeux d'entraînement).
pub fn data_dir() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path
}

pub fn db_path() -> PathBuf {
    data_dir().join("lotto.db")
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

fn row_to_draw(row: &Row<'_>) -> rusqlite::Result<Draw> {
    Ok(Draw {
        round: row.get(0)?,
        date: row.get(1)?,
        numbers: [
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
            row.get::<_, u8>(7)?,
        ],
        bonus: row.get(8)?,
        first_winners: row.get(9)?,
        first_prize: row.get(10)?,
    })
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (round, date, n1, n2, n3, n4, n5, n6, bonus, first_winners, first_prize)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        rusqlite::params![
            draw.round,
            draw.date,
            draw.numbers[0],
            draw.numbers[1],
            draw.numbers[2],
            draw.numbers[3],
            draw.numbers[4],
            draw.numbers[5],
            draw.bonus,
            draw.first_winners,
            draw.first_prize,
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

pub fn fetch_draw(conn: &Connection, round: u32) -> Result<Option<Draw>> {
    let draw = conn
        .query_row(
            &format!("SELECT {COLUMNS} FROM draws WHERE round = ?1"),
            [round],
            row_to_draw,
        )
        .optional()
        .with_context(|| format!("Échec de lecture du tirage {round}"))?;
    Ok(draw)
}

/// Tous les tirages jusqu'à `round` inclus, du plus ancien au plus récent.
pub fn fetch_draws_up_to(conn: &Connection, round: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM draws WHERE round <= ?1 ORDER BY round ASC"
    ))?;
    let draws = stmt
        .query_map([round], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

/// Les `limit` derniers tirages, du plus récent au plus ancien.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM draws ORDER BY round DESC LIMIT ?1"
    ))?;
    let draws = stmt
        .query_map([limit], row_to_draw)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

pub fn latest_round(conn: &Connection) -> Result<Option<u32>> {
    let round: Option<u32> = conn.query_row("SELECT MAX(round) FROM draws", [], |row| row.get(0))?;
    Ok(round)
}
