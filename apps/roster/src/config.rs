use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

const DEFAULT_DEPARTMENTS: &str = "Quality Assurance,Frontend,Finance,Operations,Backend,DevOPs";

#[derive(Clone, Debug)]
pub struct RosterConfig {
    pub seed_file: Option<PathBuf>,
    pub first_id: u32,
    pub raise_min_rating: f64,
    pub raise_amount: f64,
    pub top_paid: usize,
    pub departments: Vec<String>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            seed_file: None,
            first_id: 1000,
            raise_min_rating: 4.5,
            raise_amount: 1000.0,
            top_paid: 5,
            departments: split_list(DEFAULT_DEPARTMENTS),
        }
    }
}

impl RosterConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let seed_file = lookup("ROSTER_SEED_FILE")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from);
        let first_id = parse_var(&lookup, "ROSTER_FIRST_ID", defaults.first_id)?;
        let raise_min_rating =
            parse_var(&lookup, "ROSTER_RAISE_MIN_RATING", defaults.raise_min_rating)?;
        let raise_amount = parse_var(&lookup, "ROSTER_RAISE_AMOUNT", defaults.raise_amount)?;
        let top_paid = parse_var(&lookup, "ROSTER_TOP_PAID", defaults.top_paid)?;
        let departments = lookup("ROSTER_DEPARTMENTS")
            .map(|raw| split_list(&raw))
            .unwrap_or(defaults.departments);

        Ok(Self {
            seed_file,
            first_id,
            raise_min_rating,
            raise_amount,
            top_paid,
            departments,
        })
    }
}

fn parse_var<T>(lookup: impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    T: Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key} (default is {default})")),
        _ => Ok(default),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect()
}
