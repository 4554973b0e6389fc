use crate::application::catalog::CatalogConfig;
use crate::domain::{FineRate, LoanPeriod};
use std::path::PathBuf;
use thiserror::Error;

/// 設定値のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be at least 1")]
    ZeroLoanDays { name: &'static str },
}

/// アプリケーション設定
///
/// 環境変数から読み込む。未設定の項目は既定値。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub books_path: PathBuf,
    pub members_path: PathBuf,
    pub catalog: CatalogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            books_path: PathBuf::from("data/books.json"),
            members_path: PathBuf::from("data/members.json"),
            catalog: CatalogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 環境変数から読み込む
    ///
    /// - PORT
    /// - CATALOG_BOOKS_PATH
    /// - CATALOG_MEMBERS_PATH
    /// - CATALOG_LOAN_DAYS
    /// - CATALOG_FINE_PER_DAY
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 任意の参照関数から読み込む（テストでは環境変数の代わりにマップを渡す）
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => parse_number("PORT", value)?,
            None => defaults.port,
        };

        let books_path = lookup("CATALOG_BOOKS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.books_path);
        let members_path = lookup("CATALOG_MEMBERS_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.members_path);

        let loan_period = match lookup("CATALOG_LOAN_DAYS") {
            Some(value) => {
                let days: u32 = parse_number("CATALOG_LOAN_DAYS", value)?;
                LoanPeriod::try_from(days).map_err(|_| ConfigError::ZeroLoanDays {
                    name: "CATALOG_LOAN_DAYS",
                })?
            }
            None => defaults.catalog.loan_period,
        };

        let fine_rate = match lookup("CATALOG_FINE_PER_DAY") {
            Some(value) => FineRate::per_day(parse_number("CATALOG_FINE_PER_DAY", value)?),
            None => defaults.catalog.fine_rate,
        };

        Ok(Self {
            port,
            books_path,
            members_path,
            catalog: CatalogConfig {
                loan_period,
                fine_rate,
            },
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::NotANumber { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.catalog.loan_period.days(), 14);
        assert_eq!(config.catalog.fine_rate.value(), 2);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("CATALOG_BOOKS_PATH", "/tmp/b.json"),
            ("CATALOG_MEMBERS_PATH", "/tmp/m.json"),
            ("CATALOG_LOAN_DAYS", "21"),
            ("CATALOG_FINE_PER_DAY", "10"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.books_path, PathBuf::from("/tmp/b.json"));
        assert_eq!(config.members_path, PathBuf::from("/tmp/m.json"));
        assert_eq!(config.catalog.loan_period.days(), 21);
        assert_eq!(config.catalog.fine_rate.value(), 10);
    }

    #[test]
    fn test_invalid_number() {
        let result = AppConfig::from_lookup(lookup_from(&[("CATALOG_FINE_PER_DAY", "two")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::NotANumber {
                name: "CATALOG_FINE_PER_DAY",
                value: "two".to_string()
            }
        );
    }

    #[test]
    fn test_zero_loan_days() {
        let result = AppConfig::from_lookup(lookup_from(&[("CATALOG_LOAN_DAYS", "0")]));
        assert!(matches!(result, Err(ConfigError::ZeroLoanDays { .. })));
    }
}
