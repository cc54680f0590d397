use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::export::ExportSummary;
use crate::features::{BlendResult, Feature, FEATURE_NAMES};
use crate::sampler::Suggestion;
use crate::score::ScoreBreakdown;
use crate::weights::{FeatureWeights, TunedWeights};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn display_blend(blend: &BlendResult) {
    println!("\n== Features du tirage {} ==\n", blend.round);

    let mut table = new_table();
    let mut header = vec!["Numéro"];
    header.extend_from_slice(FEATURE_NAMES);
    table.set_header(header);

    for nf in &blend.features_by_number {
        let mut row = vec![Cell::new(format!("{:2}", nf.num))];
        for f in Feature::ALL {
            row.push(Cell::new(format!("{:.4}", nf.features.get(f))));
        }
        table.add_row(row);
    }
    println!("{table}");
}

pub fn display_scores(ranked: &[ScoreBreakdown], top: usize) {
    println!("\n== Score IA (top {}) ==\n", top.min(ranked.len()));

    let mut table = new_table();
    let mut header = vec!["#", "Numéro", "Score"];
    header.extend_from_slice(FEATURE_NAMES);
    table.set_header(header);

    for (i, s) in ranked.iter().take(top).enumerate() {
        let color = if i < 6 { Color::Green } else { Color::White };
        let mut row = vec![
            Cell::new(i + 1),
            Cell::new(format!("{:2}", s.num)).fg(color),
            Cell::new(format!("{:.4}", s.total)).fg(color),
        ];
        for f in Feature::ALL {
            row.push(Cell::new(format!("{:.4}", s.contributions.get(f))));
        }
        table.add_row(row);
    }
    println!("{table}");
}

fn grid_str(numbers: &[u8; 6]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_optimal_grid(grid: &Suggestion) {
    println!("\nGrille optimale : {}  (score {:.4})", grid_str(&grid.numbers), grid.score);
}

pub fn display_suggestions(suggestions: &[Suggestion]) {
    println!("\n== Suggestions de grilles ==\n");

    let mut table = new_table();
    table.set_header(vec!["#", "Numéros", "Score"]);

    for (i, sug) in suggestions.iter().enumerate() {
        table.add_row(vec![
            format!("{}", i + 1),
            grid_str(&sug.numbers),
            format!("{:.4}", sug.score),
        ]);
    }
    println!("{table}");
}

pub fn display_weights(tuned: Option<&TunedWeights>, effective: &FeatureWeights) {
    match tuned {
        Some(t) => {
            println!(
                "\nPoids réglés : modèle {} v{} (clusterUnit={}, recent={})",
                t.model, t.version, t.cluster_unit, t.recent
            );
            if let Some(seed) = t.seed {
                println!("  seed={seed}");
            }
            if let Some(trials) = t.trials {
                println!("  essais={trials}");
            }
            if let Some(metrics) = &t.metrics {
                println!("  métriques={metrics}");
            }
        }
        None => println!("\n(Pas de fichier de poids, utilisation des poids par défaut)"),
    }

    let mut table = new_table();
    table.set_header(vec!["Feature", "Poids"]);
    for f in Feature::ALL {
        table.add_row(vec![f.name().to_string(), format!("{:.4}", effective.get(f))]);
    }
    println!("{table}");
}

pub fn display_export_summary(summary: &ExportSummary, out: &std::path::Path) {
    println!("Export terminé :");
    println!("  Tirages exportés : {}", summary.rounds_exported);
    println!("  Tirages ignorés  : {}", summary.rounds_skipped);
    println!("  Lignes écrites   : {}", summary.rows);
    println!("  Fichier          : {}", out.display());
}
