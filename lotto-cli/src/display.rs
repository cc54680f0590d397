use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use lotto_db::models::{Draw, NumberStats, Zone};

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tirage", "Date", "Numéros", "Bonus", "Gagnants R1", "Gain R1"]);

    for draw in draws {
        let mut sorted = draw.numbers;
        sorted.sort();

        let numbers_str = sorted
            .iter()
            .map(|n| format!("{:2}", n))
            .collect::<Vec<_>>()
            .join(" - ");

        let prize = if draw.first_prize > 0.0 {
            format!("{:.0} ₩", draw.first_prize)
        } else {
            "—".to_string()
        };

        table.add_row(vec![
            draw.round.to_string(),
            draw.date.clone(),
            numbers_str,
            format!("{:2}", draw.bonus),
            draw.first_winners.to_string(),
            prize,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

pub fn display_stats(stats: &[NumberStats], window: u32) {
    println!("\n📊 Statistiques sur les {} derniers tirages\n", window);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Zone", "Fréquence", "Retard"]);

    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));

    let expected = window as f64 * 6.0 / 45.0;
    for stat in &sorted {
        let color = if stat.frequency as f64 > expected * 1.3 {
            Color::Green
        } else if (stat.frequency as f64) < expected * 0.7 {
            Color::Red
        } else {
            Color::White
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", stat.number)),
            Cell::new(Zone::of(stat.number)),
            Cell::new(stat.frequency).fg(color),
            Cell::new(stat.gap),
        ]);
    }
    println!("{table}");
}
