mod display;
mod import;
mod stats;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::display::{display_draws, display_import_summary, display_stats};
use crate::stats::compute_stats;
use lotto_db::db::{count_draws, db_path, fetch_last_draws, insert_draw, migrate, open_db};
use lotto_db::models::{validate_draw, Draw};
use lotto_db::rusqlite::Connection;

#[derive(Parser)]
#[command(name = "lotto", about = "Historique et statistiques des tirages Lotto 6/45")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long, default_value = "assets/lotto.csv")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher les statistiques (fréquences et retards)
    Stats {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,

        /// Compter aussi le numéro bonus
        #[arg(long)]
        bonus: bool,
    },

    /// Ajouter un tirage manuellement
    Add,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window, bonus } => cmd_stats(&conn, window, bonus),
        Command::Add => cmd_add(&conn),
    }
}

fn cmd_import(conn: &Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &Connection, last: u32) -> Result<()> {
    if count_draws(conn)? == 0 {
        println!("Base vide. Lancez d'abord : lotto import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &Connection, window: u32, include_bonus: bool) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotto import");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws(conn, effective_window)?;

    let stats = compute_stats(&draws, include_bonus);
    display_stats(&stats, effective_window);
    Ok(())
}

fn cmd_add(conn: &Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let round: u32 = prompt("Numéro du tirage (ex: 1150) : ")?
        .parse()
        .context("Numéro de tirage invalide")?;
    let date = import::parse_date(&prompt("Date (AAAA.MM.JJ) : ")?)?;

    let numbers = prompt_numbers()?;
    let bonus = prompt_bonus(&numbers)?;

    validate_draw(&numbers, bonus)?;

    let draw = Draw {
        round,
        date,
        numbers,
        bonus,
        first_winners: 0,
        first_prize: 0.0,
    };

    println!("\nTirage à insérer :");
    display_draws(std::slice::from_ref(&draw));

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        if insert_draw(conn, &draw)? {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    read_answer(&mut io::stdin().lock())
}

fn read_answer(reader: &mut impl BufRead) -> Result<String> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    if read == 0 {
        bail!("Entrée standard fermée, saisie interrompue");
    }
    Ok(input.trim().to_string())
}

fn prompt_numbers() -> Result<[u8; 6]> {
    loop {
        let input = prompt("6 numéros (séparés par des espaces, 1-45) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 6 => {
                let arr = [v[0], v[1], v[2], v[3], v[4], v[5]];
                // Bonus provisoire hors grille pour ne valider que les 6 numéros
                let probe = (1..=45).find(|b| !arr.contains(b)).unwrap_or(1);
                if validate_draw(&arr, probe).is_ok() {
                    return Ok(arr);
                }
                println!("Numéros invalides (1-45, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 6 numéros. Réessayez."),
        }
    }
}

fn prompt_bonus(numbers: &[u8; 6]) -> Result<u8> {
    loop {
        let input = prompt("Numéro bonus (1-45) : ")?;
        match input.parse::<u8>() {
            Ok(b) if validate_draw(numbers, b).is_ok() => return Ok(b),
            _ => println!("Bonus invalide (1-45, différent des 6 numéros). Réessayez."),
        }
    }
}
