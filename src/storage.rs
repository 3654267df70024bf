use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

/// The scope the user last had open, remembered across runs. `token_hash`
/// ties the record to the account it was saved under so one account's
/// selection never bleeds into another's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastScope {
    pub token_hash: String,
    #[serde(default)]
    pub employee_id: Option<u64>,
    #[serde(default)]
    pub week_monday: Option<NaiveDate>,
    #[serde(default)]
    pub project_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Config {
    #[serde(default)]
    server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_scope: Option<LastScope>,
}

pub fn read_token() -> Option<String> {
    if let Ok(value) = env::var("TIMEDESK_TOKEN") {
        if !value.trim().is_empty() {
            return Some(value.trim().to_string());
        }
    }

    let path = token_path()?;
    fs::read_to_string(path)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn write_token(token: &str) -> Result<(), io::Error> {
    let path = token_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Home directory not found"))?;
    fs::write(path, token)
}

pub fn clear_token() -> Result<(), io::Error> {
    let path = token_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Home directory not found"))?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

pub fn read_server_url() -> Option<String> {
    if let Ok(value) = env::var("TIMEDESK_SERVER") {
        if !value.trim().is_empty() {
            return Some(value.trim().to_string());
        }
    }
    read_config().and_then(|config| config.server_url)
}

pub fn write_server_url(url: &str) -> Result<(), io::Error> {
    let mut config = read_config().unwrap_or_default();
    config.server_url = Some(url.to_string());
    write_config(&config)
}

/// Returns the remembered scope only if it was saved under `token`.
pub fn read_last_scope(token: &str) -> Option<LastScope> {
    let scope = read_config()?.last_scope?;
    if scope.token_hash == hash_token(token) {
        Some(scope)
    } else {
        None
    }
}

pub fn write_last_scope(
    token: &str,
    employee_id: Option<u64>,
    week_monday: Option<NaiveDate>,
    project_id: Option<u64>,
) -> Result<(), io::Error> {
    let mut config = read_config().unwrap_or_default();
    config.last_scope = Some(LastScope {
        token_hash: hash_token(token),
        employee_id,
        week_monday,
        project_id,
    });
    write_config(&config)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    result.iter().map(|byte| format!("{:02x}", byte)).collect()
}

fn token_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".timedesk-token");
    Some(path)
}

fn config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".timedesk.json");
    Some(path)
}

fn read_config() -> Option<Config> {
    let path = config_path()?;
    let contents = fs::read_to_string(path).ok()?;
    serde_json::from_str(&contents).ok()
}

fn write_config(config: &Config) -> Result<(), io::Error> {
    let path = config_path()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "Home directory not found"))?;
    let json = serde_json::to_string_pretty(config)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
    fs::write(path, json)
}
