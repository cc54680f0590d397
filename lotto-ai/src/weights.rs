use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::features::{Feature, FeatureMap};

/// Poids de combinaison des 7 features dans le score final.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureWeights {
    pub per_number: f64,
    pub k_match: f64,
    pub pattern: f64,
    pub recent: f64,
    pub odd_even: f64,
    pub sum_range: f64,
    pub zone: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            per_number: 0.25,
            k_match: 0.15,
            pattern: 0.2,
            recent: 0.15,
            odd_even: 0.05,
            sum_range: 0.1,
            zone: 0.1,
        }
    }
}

impl FeatureWeights {
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::PerNumber => self.per_number,
            Feature::KMatch => self.k_match,
            Feature::Pattern => self.pattern,
            Feature::Recent => self.recent,
            Feature::OddEven => self.odd_even,
            Feature::SumRange => self.sum_range,
            Feature::Zone => self.zone,
        }
    }

    pub fn dot(&self, features: &FeatureMap) -> f64 {
        Feature::ALL
            .iter()
            .map(|&f| self.get(f) * features.get(f))
            .sum()
    }
}

/// Artefact produit hors ligne par le réglage des poids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunedWeights {
    pub version: u32,
    pub model: String,
    pub cluster_unit: i64,
    pub recent: u32,
    pub weights: FeatureWeights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trials: Option<u32>,
}

pub fn default_weights_path() -> PathBuf {
    lotto_db::db::data_dir().join("weights.json")
}

/// Lecture brute de l'artefact. `Ok(None)` : artefact absent.
pub trait WeightsSource {
    fn read(&self) -> Result<Option<String>>;
}

pub struct FileWeightsSource {
    pub path: PathBuf,
}

impl FileWeightsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WeightsSource for FileWeightsSource {
    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Impossible de lire {:?}", self.path))?;
        Ok(Some(json))
    }
}

pub fn save_tuned_weights(weights: &TunedWeights, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let json = serde_json::to_string_pretty(weights)?;
    std::fs::write(path, json).with_context(|| format!("Impossible d'écrire {:?}", path))?;
    Ok(())
}

/// Poids réglés, chargés au plus une fois pour toute la durée du processus.
/// Construit au démarrage puis passé par référence ; aucun rechargement.
pub struct TunedWeightsStore<S: WeightsSource> {
    source: S,
    cell: OnceLock<Option<TunedWeights>>,
}

impl TunedWeightsStore<FileWeightsSource> {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(FileWeightsSource::new(path))
    }
}

impl<S: WeightsSource> TunedWeightsStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cell: OnceLock::new(),
        }
    }

    /// Tente la lecture si aucune tentative n'a encore eu lieu.
    pub fn load(&self) -> Option<&TunedWeights> {
        self.cell.get_or_init(|| self.attempt()).as_ref()
    }

    /// Même valeur que `load` ; la lecture n'est jamais retentée.
    pub fn get(&self) -> Option<&TunedWeights> {
        self.load()
    }

    pub fn effective_weights(&self) -> FeatureWeights {
        self.get().map(|t| t.weights).unwrap_or_default()
    }

    fn attempt(&self) -> Option<TunedWeights> {
        let json = match self.source.read() {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::debug!("Aucun fichier de poids, poids par défaut");
                return None;
            }
            Err(e) => {
                log::warn!("Lecture des poids impossible : {e:#}");
                return None;
            }
        };
        match serde_json::from_str::<TunedWeights>(&json) {
            Ok(weights) => {
                log::info!(
                    "Poids réglés chargés (modèle {}, version {})",
                    weights.model,
                    weights.version
                );
                Some(weights)
            }
            Err(e) => {
                log::warn!("Fichier de poids invalide, ignoré : {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        content: Option<String>,
        reads: AtomicUsize,
    }

    impl CountingSource {
        fn new(content: Option<&str>) -> Self {
            Self {
                content: content.map(str::to_string),
                reads: AtomicUsize::new(0),
            }
        }
    }

    impl WeightsSource for &CountingSource {
        fn read(&self) -> Result<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.content.clone())
        }
    }

    const VALID: &str = r#"{
        "version": 2,
        "model": "logreg",
        "clusterUnit": 7,
        "recent": 30,
        "weights": {
            "perNumber": 0.3, "kMatch": 0.1, "pattern": 0.2, "recent": 0.1,
            "oddEven": 0.1, "sumRange": 0.1, "zone": 0.1
        },
        "metrics": { "auc": 0.51 },
        "trials": 200
    }"#;

    #[test]
    fn test_get_before_load_reads_once() {
        let source = CountingSource::new(Some(VALID));
        let store = TunedWeightsStore::new(&source);

        assert!(store.get().is_some());
        assert!(store.get().is_some());
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_load_then_get_reads_once() {
        let source = CountingSource::new(Some(VALID));
        let store = TunedWeightsStore::new(&source);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.model, "logreg");
        assert_eq!(loaded.cluster_unit, 7);
        assert_eq!(loaded.trials, Some(200));
        assert_eq!(loaded.seed, None);
        assert_eq!(store.get().unwrap().weights.per_number, 0.3);
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_absent_is_cached() {
        let source = CountingSource::new(None);
        let store = TunedWeightsStore::new(&source);

        assert!(store.load().is_none());
        assert!(store.get().is_none());
        assert!(store.load().is_none());
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(store.effective_weights(), FeatureWeights::default());
    }

    #[test]
    fn test_malformed_behaves_like_absent() {
        let source = CountingSource::new(Some("{ \"version\": "));
        let store = TunedWeightsStore::new(&source);

        assert!(store.get().is_none());
        assert!(store.get().is_none());
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(store.effective_weights(), FeatureWeights::default());
    }

    #[test]
    fn test_effective_weights_uses_tuned() {
        let source = CountingSource::new(Some(VALID));
        let store = TunedWeightsStore::new(&source);
        assert_eq!(store.effective_weights().odd_even, 0.1);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let w = FeatureWeights::default();
        let sum: f64 = Feature::ALL.iter().map(|&f| w.get(f)).sum();
        assert!((sum - 1.0).abs() < 1e-12, "somme = {sum}");
    }

    #[test]
    fn test_dot() {
        let w = FeatureWeights::default();
        // Seul oddEven est non nul dans le vecteur neutre
        assert!((w.dot(&FeatureMap::NEUTRAL) - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_file_source_roundtrip() {
        let dir = std::env::temp_dir().join(format!("lotto_weights_{}", std::process::id()));
        let path = dir.join("weights.json");
        let _ = std::fs::remove_file(&path);

        assert!(FileWeightsSource::new(&path).read().unwrap().is_none());

        let tuned: TunedWeights = serde_json::from_str(VALID).unwrap();
        save_tuned_weights(&tuned, &path).unwrap();

        let store = TunedWeightsStore::from_path(&path);
        assert_eq!(store.get(), Some(&tuned));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
