use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use lotto_ai::display;
use lotto_ai::export::{default_trainset_path, export_dataset, ExportConfig};
use lotto_ai::features::{BlendResult, FeatureBlender};
use lotto_ai::sampler::{date_seed, optimal_grid, recommend};
use lotto_ai::score::{rank, score_numbers};
use lotto_ai::store::SqliteStore;
use lotto_ai::weights::{default_weights_path, FileWeightsSource, TunedWeightsStore};
use lotto_db::db::{count_draws, db_path, latest_round, migrate, open_db};
use lotto_db::rusqlite::Connection;

#[derive(Parser)]
#[command(name = "lotto-ai", about = "Features, score IA et jeu d'entraînement Lotto 6/45")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct BlendArgs {
    /// Tirage de référence (défaut : dernier tirage en base)
    #[arg(short, long)]
    round: Option<u32>,

    /// Largeur des paquets de motifs (5, 7 ou 10)
    #[arg(
        long = "cluster-unit",
        alias = "clusterUnit",
        default_value = "5",
        allow_hyphen_values = true
    )]
    cluster_unit: i64,

    /// Fenêtre de fréquence récente (nombre de tirages)
    #[arg(long, default_value = "20")]
    recent: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Afficher les 7 features de chaque numéro
    Blend {
        #[command(flatten)]
        args: BlendArgs,
    },

    /// Score IA détaillé par numéro
    Score {
        #[command(flatten)]
        args: BlendArgs,

        /// Fichier de poids réglés
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Nombre de numéros affichés
        #[arg(short, long, default_value = "15")]
        top: usize,
    },

    /// Suggérer des grilles à partir du score IA
    Recommend {
        #[command(flatten)]
        args: BlendArgs,

        /// Fichier de poids réglés
        #[arg(short, long)]
        weights: Option<PathBuf>,

        /// Nombre de grilles
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Seed pour la reproductibilité (défaut: date du jour YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,

        /// Facteur de suréchantillonnage
        #[arg(long, default_value = "20")]
        oversample: usize,

        /// Différence minimale de numéros entre deux grilles
        #[arg(long, default_value = "2")]
        min_diff: usize,
    },

    /// Afficher les poids de combinaison
    Weights {
        /// Fichier de poids réglés
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Exporter le jeu d'entraînement (JSON lines)
    Export {
        #[arg(long, allow_hyphen_values = true)]
        start: i64,

        #[arg(long, allow_hyphen_values = true)]
        end: i64,

        /// Fichier de sortie (défaut : data/trainset.jsonl)
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(
            long = "cluster-unit",
            alias = "clusterUnit",
            default_value = "5",
            allow_hyphen_values = true
        )]
        cluster_unit: i64,

        #[arg(long, default_value = "20", allow_hyphen_values = true)]
        recent: i64,
    },
}

fn connect() -> Result<Connection> {
    let conn = open_db(&db_path())?;
    migrate(&conn)?;
    Ok(conn)
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Blend { args } => cmd_blend(&connect()?, &args),
        Command::Score { args, weights, top } => cmd_score(&connect()?, &args, weights, top),
        Command::Recommend { args, weights, count, seed, oversample, min_diff } => {
            cmd_recommend(&connect()?, &args, weights, count, seed, oversample, min_diff)
        }
        Command::Weights { path } => cmd_weights(path),
        Command::Export { start, end, out, cluster_unit, recent } => {
            let config = ExportConfig {
                start,
                end,
                out: out.unwrap_or_else(default_trainset_path),
                cluster_unit,
                recent,
            };
            // Arguments invalides : aucune écriture, pas même la base
            config
                .validate()
                .inspect_err(|e| log::error!("Arguments invalides : {e:#}"))?;
            cmd_export(&connect()?, &config)
        }
    }
}

fn blend_round(conn: &Connection, args: &BlendArgs) -> Result<BlendResult> {
    if count_draws(conn)? == 0 {
        bail!("Base vide. Lancez d'abord : lotto-cli import");
    }
    let round = match args.round {
        Some(r) => r,
        None => latest_round(conn)?.context("Aucun tirage en base")?,
    };
    let store = SqliteStore::new(conn);
    FeatureBlender::default().blend(&store, round, args.cluster_unit, args.recent)
}

fn weights_store(path: Option<PathBuf>) -> TunedWeightsStore<FileWeightsSource> {
    TunedWeightsStore::from_path(path.unwrap_or_else(default_weights_path))
}

fn cmd_blend(conn: &Connection, args: &BlendArgs) -> Result<()> {
    let blend = blend_round(conn, args)?;
    display::display_blend(&blend);
    Ok(())
}

fn cmd_score(
    conn: &Connection,
    args: &BlendArgs,
    weights: Option<PathBuf>,
    top: usize,
) -> Result<()> {
    let store = weights_store(weights);
    let blend = blend_round(conn, args)?;
    let scores = score_numbers(&blend, &store.effective_weights());
    display::display_scores(&rank(&scores), top);
    display::display_optimal_grid(&optimal_grid(&scores));
    Ok(())
}

fn cmd_recommend(
    conn: &Connection,
    args: &BlendArgs,
    weights: Option<PathBuf>,
    count: usize,
    seed: Option<u64>,
    oversample: usize,
    min_diff: usize,
) -> Result<()> {
    let store = weights_store(weights);
    let blend = blend_round(conn, args)?;
    let scores = score_numbers(&blend, &store.effective_weights());

    display::display_optimal_grid(&optimal_grid(&scores));

    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed du jour : {ds})");
        ds
    });

    let suggestions = recommend(&scores, count, effective_seed, oversample, min_diff)?;
    display::display_suggestions(&suggestions);
    Ok(())
}

fn cmd_weights(path: Option<PathBuf>) -> Result<()> {
    let store = weights_store(path);
    display::display_weights(store.load(), &store.effective_weights());
    Ok(())
}

fn cmd_export(conn: &Connection, config: &ExportConfig) -> Result<()> {
    let store = SqliteStore::new(conn);
    println!("Export des tirages {} à {} vers {}", config.start, config.end, config.out.display());

    let summary = export_dataset(&store, &store, &FeatureBlender::default(), config)
        .inspect_err(|e| log::error!("Export interrompu : {e:#}"))?;
    display::display_export_summary(&summary, &config.out);
    Ok(())
}
