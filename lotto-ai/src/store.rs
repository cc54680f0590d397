use anyhow::Result;
use lotto_db::db::{fetch_draw, fetch_draws_up_to};
use lotto_db::rusqlite::Connection;

use crate::analysis::{AnalysisProvider, AnalysisSnapshot, DrawSource, HistoryAnalyzer};

/// Fournisseur d'analyse adossé à la base SQLite des tirages.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AnalysisProvider for SqliteStore<'_> {
    fn analyze_round(
        &self,
        round: u32,
        include_bonus: bool,
        recent_count: u32,
    ) -> Result<AnalysisSnapshot> {
        let history = fetch_draws_up_to(self.conn, round)?;
        HistoryAnalyzer::analyze(&history, round, include_bonus, recent_count)
    }
}

impl DrawSource for SqliteStore<'_> {
    fn winning_numbers(&self, round: u32) -> Result<Option<[u8; 6]>> {
        Ok(fetch_draw(self.conn, round)?.map(|d| d.numbers))
    }
}
