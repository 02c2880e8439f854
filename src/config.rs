use std::fs;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::archive::DEFAULT_COUNT_LIMIT;
use crate::domain::ReportPeriod;
use crate::error::ArchiverError;
use crate::nodeping::DEFAULT_NODEPING_BASE_URL;
use crate::sheets::DEFAULT_SHEETS_BASE_URL;

pub const CONFIG_FILE_NAME: &str = "uptime-archiver.json";
pub const NODEPING_TOKEN_ENV: &str = "NODEPING_TOKEN";
pub const GOOGLE_ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";
pub const SPREADSHEET_ID_ENV: &str = "SPREADSHEET_ID";

/// On-disk config. Keys also accept the PascalCase names of the scheduled
/// job's event payload.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, alias = "ContactGroupName")]
    pub contact_group: Option<String>,
    #[serde(default, alias = "Period")]
    pub period: Option<String>,
    #[serde(default, alias = "SpreadSheetID", alias = "SpreadsheetID")]
    pub spreadsheet_id: Option<String>,
    #[serde(default, alias = "CountLimit")]
    pub count_limit: Option<CountLimitEntry>,
    #[serde(default)]
    pub nodeping_base_url: Option<String>,
    #[serde(default)]
    pub nodeping_customer_id: Option<String>,
    #[serde(default)]
    pub sheets_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CountLimitEntry {
    Number(i64),
    Text(String),
}

impl CountLimitEntry {
    fn value(&self) -> Result<Option<i64>, ArchiverError> {
        match self {
            CountLimitEntry::Number(value) => Ok(Some(*value)),
            CountLimitEntry::Text(text) if text.trim().is_empty() => Ok(None),
            CountLimitEntry::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ArchiverError::InvalidCountLimit(text.clone())),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub contact_group: Option<String>,
    pub period: Option<String>,
    pub spreadsheet_id: Option<String>,
    pub count_limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub contact_group: String,
    pub period: ReportPeriod,
    pub spreadsheet_id: String,
    pub count_limit: usize,
    pub nodeping_token: String,
    pub google_access_token: String,
    pub nodeping_base_url: String,
    pub nodeping_customer_id: Option<String>,
    pub sheets_base_url: String,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(
        path: Option<&str>,
        overrides: ConfigOverrides,
    ) -> Result<ResolvedConfig, ArchiverError> {
        let config = Self::load(path)?;
        Self::resolve_config(config, overrides, |key| std::env::var(key).ok())
    }

    pub fn load(path: Option<&str>) -> Result<Config, ArchiverError> {
        let config_path = match path {
            Some(path) => Some(Utf8PathBuf::from(path)),
            None => Self::default_paths()
                .into_iter()
                .find(|candidate| candidate.as_std_path().exists()),
        };
        let Some(config_path) = config_path else {
            return Ok(Config::default());
        };

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ArchiverError::ConfigRead(config_path.clone().into_std_path_buf()))?;
        serde_json::from_str(&content).map_err(|err| ArchiverError::ConfigParse(err.to_string()))
    }

    pub fn default_paths() -> Vec<Utf8PathBuf> {
        let mut paths = vec![Utf8PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dir) = BaseDirs::new()
            .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.config_dir().to_path_buf()).ok())
        {
            paths.push(dir.join("uptime-archiver").join("config.json"));
        }
        paths
    }

    pub fn resolve_config<E>(
        config: Config,
        overrides: ConfigOverrides,
        env: E,
    ) -> Result<ResolvedConfig, ArchiverError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let contact_group = first_set([overrides.contact_group, config.contact_group])
            .ok_or_else(|| ArchiverError::MissingSetting("contact group".to_string()))?;
        let spreadsheet_id = first_set([
            overrides.spreadsheet_id,
            config.spreadsheet_id,
            env(SPREADSHEET_ID_ENV),
        ])
        .ok_or_else(|| ArchiverError::MissingSetting("spreadsheet id".to_string()))?;
        let nodeping_token = first_set([env(NODEPING_TOKEN_ENV)])
            .ok_or_else(|| ArchiverError::MissingSetting(NODEPING_TOKEN_ENV.to_string()))?;
        let google_access_token = first_set([env(GOOGLE_ACCESS_TOKEN_ENV)])
            .ok_or_else(|| ArchiverError::MissingSetting(GOOGLE_ACCESS_TOKEN_ENV.to_string()))?;

        let period = match first_set([overrides.period, config.period]) {
            Some(value) => value.parse()?,
            None => ReportPeriod::default(),
        };

        let count_limit = match overrides.count_limit {
            Some(value) => Some(value),
            None => match &config.count_limit {
                Some(entry) => entry.value()?,
                None => None,
            },
        };

        Ok(ResolvedConfig {
            contact_group,
            period,
            spreadsheet_id,
            count_limit: effective_count_limit(count_limit),
            nodeping_token,
            google_access_token,
            nodeping_base_url: first_set([config.nodeping_base_url])
                .unwrap_or_else(|| DEFAULT_NODEPING_BASE_URL.to_string()),
            nodeping_customer_id: first_set([config.nodeping_customer_id]),
            sheets_base_url: first_set([config.sheets_base_url])
                .unwrap_or_else(|| DEFAULT_SHEETS_BASE_URL.to_string()),
        })
    }
}

pub fn effective_count_limit(value: Option<i64>) -> usize {
    match value {
        Some(limit) if limit > 0 => usize::try_from(limit).unwrap_or(DEFAULT_COUNT_LIMIT),
        _ => DEFAULT_COUNT_LIMIT,
    }
}

fn first_set<const N: usize>(values: [Option<String>; N]) -> Option<String> {
    values
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}
