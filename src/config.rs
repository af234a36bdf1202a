//! 환경 변수 기반 서비스 설정

use crate::error::{Error, Result};
use std::time::Duration;

/// 바인딩 주소 환경 변수
pub const BIND_ADDR_ENV: &str = "AUCTION_BIND_ADDR";

/// 데이터베이스 URL 환경 변수 (없으면 메모리 저장소 사용)
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// 커넥션 풀 크기 환경 변수
pub const MAX_CONNECTIONS_ENV: &str = "AUCTION_DB_MAX_CONNECTIONS";

/// 스키마 초기화 여부 환경 변수
pub const INIT_SCHEMA_ENV: &str = "AUCTION_INIT_SCHEMA";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 세션 유효 기간 (7일)
pub const SESSION_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// 요청 바디 최대 크기 (폼 전송만 받으므로 1MB)
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub init_schema: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            init_schema: true,
        }
    }
}

impl Config {
    /// 프로세스 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(addr) = lookup(BIND_ADDR_ENV).filter(|v| !v.trim().is_empty()) {
            config.bind_addr = addr.trim().to_string();
        }

        config.database_url = lookup(DATABASE_URL_ENV).filter(|v| !v.trim().is_empty());

        if let Some(raw) = lookup(MAX_CONNECTIONS_ENV) {
            config.max_connections = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    Error::Config(format!("{MAX_CONNECTIONS_ENV} 값이 올바르지 않습니다: {raw}"))
                })?;
        }

        if let Some(raw) = lookup(INIT_SCHEMA_ENV) {
            config.init_schema = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(Error::Config(format!(
                        "{INIT_SCHEMA_ENV} 값이 올바르지 않습니다: {raw}"
                    )))
                }
            };
        }

        Ok(config)
    }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.database_url.is_none());
    }

    #[test]
    fn reads_all_values() {
        let config = Config::from_lookup(lookup_from(&[
            (BIND_ADDR_ENV, "127.0.0.1:8080"),
            (DATABASE_URL_ENV, "postgres://localhost/auctions"),
            (MAX_CONNECTIONS_ENV, "12"),
            (INIT_SCHEMA_ENV, "false"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/auctions")
        );
        assert_eq!(config.max_connections, 12);
        assert!(!config.init_schema);
    }

    #[test]
    fn rejects_bad_pool_size() {
        let err = Config::from_lookup(lookup_from(&[(MAX_CONNECTIONS_ENV, "0")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
