use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use products_hr::{Employee, EmployeeStore};
use tracing::info;

pub fn load_store(path: Option<&Path>) -> Result<EmployeeStore<u32>> {
    let Some(path) = path else {
        info!("no seed file configured; starting with an empty roster");
        return Ok(EmployeeStore::new());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read seed file {}", path.display()))?;
    let store =
        parse_seed(&raw).with_context(|| format!("invalid seed file {}", path.display()))?;
    info!(path = %path.display(), count = store.len(), "roster seeded");
    Ok(store)
}

/// A seed is a JSON array of employee objects. Later duplicates replace earlier ones.
pub fn parse_seed(raw: &str) -> Result<EmployeeStore<u32>, serde_json::Error> {
    let employees: Vec<Employee<u32>> = serde_json::from_str(raw)?;
    Ok(employees.into_iter().collect())
}
