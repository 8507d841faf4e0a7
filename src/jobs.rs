use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::models::ScrapeJobSpec;

/// Validated job specs keyed by job name.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: BTreeMap<String, ScrapeJobSpec>,
}

impl JobRegistry {
    /// Loads every `.yaml` / `.yml` file directly inside `dir`.
    ///
    /// The first file that fails to parse or validate aborts the whole load.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir)
            .map_err(|e| AppError::IoError(format!("{}: {}", dir.display(), e)))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_yaml_file(&path) {
                paths.push(path);
            } else {
                debug!("Skipping {}", path.display());
            }
        }
        // read_dir order is platform dependent
        paths.sort();

        let mut specs = Vec::with_capacity(paths.len());
        for path in &paths {
            specs.push(ScrapeJobSpec::from_yaml_file(path)?);
        }

        let registry = Self::from_specs(specs)?;
        info!("Loaded {} job(s) from {}", registry.len(), dir.display());
        Ok(registry)
    }

    pub fn from_specs(specs: impl IntoIterator<Item = ScrapeJobSpec>) -> Result<Self> {
        let mut jobs = BTreeMap::new();

        for spec in specs {
            spec.validate()?;
            if jobs.contains_key(&spec.name) {
                return Err(AppError::ValidationError(format!(
                    "duplicate job name '{}'",
                    spec.name
                )));
            }
            info!(job = %spec.name, driver = %spec.driver, "Registered job");
            jobs.insert(spec.name.clone(), spec);
        }

        Ok(Self { jobs })
    }

    pub fn get(&self, name: &str) -> Option<&ScrapeJobSpec> {
        self.jobs.get(name)
    }

    /// Jobs in name order.
    pub fn list(&self) -> Vec<&ScrapeJobSpec> {
        self.jobs.values().collect()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

fn is_yaml_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}
