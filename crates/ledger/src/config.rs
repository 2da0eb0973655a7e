use std::env;
use std::path::PathBuf;

/// 환경 변수 기반 설정 (.env 파일도 읽음)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite 파일 경로 (DB_PATH)
    pub db_path: String,
    /// API 서버 포트 (LEDGER_API_PORT)
    pub api_port: u16,
    /// 로그 디렉토리 (LOG_DIR)
    pub log_dir: PathBuf,
    /// 기본 로그 레벨 (LOG_LEVEL, RUST_LOG가 있으면 그쪽이 우선)
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: "ledger.db".to_string(),
            api_port: 12091,
            log_dir: PathBuf::from("logs"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 키 조회 함수로 설정 구성. 값이 없거나 잘못되면 기본값.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            db_path: lookup("DB_PATH")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.db_path),
            api_port: lookup("LEDGER_API_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.api_port),
            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}
