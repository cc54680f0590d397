use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisProvider, DrawSource};
use crate::features::{FeatureBlender, FeatureMap};

pub fn default_trainset_path() -> PathBuf {
    lotto_db::db::data_dir().join("trainset.jsonl")
}

/// Une ligne du jeu d'entraînement : features du numéro `n` au tirage `t`,
/// label = 1 si `n` sort au tirage `t + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRow {
    pub t: u32,
    pub n: u8,
    pub features: FeatureMap,
    pub label: u8,
}

/// Paramètres bruts tels que saisis ; validés par `validate` avant toute écriture.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub start: i64,
    pub end: i64,
    pub out: PathBuf,
    pub cluster_unit: i64,
    pub recent: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidExport {
    pub start: u32,
    pub end: u32,
    pub cluster_unit: i64,
    pub recent: u32,
}

fn positive_u32(name: &str, value: i64) -> Result<u32> {
    if value <= 0 {
        bail!("--{name} doit être un entier positif (reçu : {value})");
    }
    u32::try_from(value).with_context(|| format!("--{name} trop grand : {value}"))
}

impl ExportConfig {
    pub fn validate(&self) -> Result<ValidExport> {
        let start = positive_u32("start", self.start)?;
        let end = positive_u32("end", self.end)?;
        if self.cluster_unit <= 0 {
            bail!("--clusterUnit doit être un entier positif (reçu : {})", self.cluster_unit);
        }
        let recent = positive_u32("recent", self.recent)?;
        if end < start {
            bail!("--end ({end}) doit être supérieur ou égal à --start ({start})");
        }
        Ok(ValidExport {
            start,
            end,
            cluster_unit: self.cluster_unit,
            recent,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub rounds_exported: u32,
    pub rounds_skipped: u32,
    pub rows: u64,
}

/// Export séquentiel, non reprenable : en cas d'échec la sortie partielle reste
/// sur disque et doit être régénérée entièrement.
pub fn export_dataset<P, D>(
    provider: &P,
    draws: &D,
    blender: &FeatureBlender,
    config: &ExportConfig,
) -> Result<ExportSummary>
where
    P: AnalysisProvider + ?Sized,
    D: DrawSource + ?Sized,
{
    let params = config.validate()?;

    if let Some(parent) = config.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
        }
    }
    let file = File::create(&config.out)
        .with_context(|| format!("Impossible de créer {:?}", config.out))?;
    let mut writer = BufWriter::new(file);

    let pb = ProgressBar::new((params.end - params.start + 1) as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let mut summary = ExportSummary::default();

    for t in params.start..=params.end {
        pb.set_message(format!("tirage {t}"));
        let known = match t.checked_add(1) {
            Some(next_round) => draws.winning_numbers(next_round)?,
            None => None,
        };
        let next = match known {
            Some(numbers) => numbers,
            None => {
                log::debug!("Tirage suivant de {t} inconnu, tirage {t} ignoré");
                summary.rounds_skipped += 1;
                pb.inc(1);
                continue;
            }
        };

        let blend = blender.blend(provider, t, params.cluster_unit, params.recent)?;
        for nf in &blend.features_by_number {
            let row = TrainingRow {
                t,
                n: nf.num,
                features: nf.features,
                label: u8::from(next.contains(&nf.num)),
            };
            serde_json::to_writer(&mut writer, &row)?;
            writer.write_all(b"\n")?;
            summary.rows += 1;
        }
        // Chaque tirage complet reste sur disque si un tirage suivant échoue
        writer.flush()?;
        summary.rounds_exported += 1;
        pb.inc(1);
    }

    writer.flush().context("Échec de l'écriture du jeu d'entraînement")?;
    pb.finish_and_clear();

    log::info!(
        "{} lignes écrites dans {:?} ({} tirages, {} ignorés)",
        summary.rows,
        config.out,
        summary.rounds_exported,
        summary.rounds_skipped
    );
    Ok(summary)
}
