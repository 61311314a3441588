use std::path::PathBuf;
use std::time::Duration;

use crate::domain::error::AppError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

pub const ENV_API_BASE_URL: &str = "DUBDESK_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "DUBDESK_REQUEST_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL_SECS: &str = "DUBDESK_POLL_INTERVAL_SECS";
pub const ENV_DB_PATH: &str = "DUBDESK_DB_PATH";

/// ダッシュボード設定（環境変数から読み込む）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// バックエンドのベース URL（末尾スラッシュなし）
    pub api_base_url: String,
    /// 1 リクエストのタイムアウト。アップロードを含むので長め。
    pub request_timeout: Duration,
    /// 自動リフレッシュ間隔。None なら無効。
    pub poll_interval: Option<Duration>,
    /// 設定 DB のパス
    pub db_path: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            poll_interval: Some(Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS)),
            db_path: default_db_path(),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から読み込む。空文字は未設定扱い。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_BASE_URL) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }

        if let Some(raw) = get(ENV_REQUEST_TIMEOUT_SECS) {
            let secs = parse_secs(ENV_REQUEST_TIMEOUT_SECS, &raw)?;
            if secs == 0 {
                return Err(AppError::config(format!(
                    "{ENV_REQUEST_TIMEOUT_SECS} は 1 以上で指定してください"
                )));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = get(ENV_POLL_INTERVAL_SECS) {
            let secs = parse_secs(ENV_POLL_INTERVAL_SECS, &raw)?;
            config.poll_interval = (secs > 0).then(|| Duration::from_secs(secs));
        }

        if let Some(path) = get(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        Ok(config)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, AppError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| AppError::config(format!("{key} は秒数（整数）で指定してください: {raw:?}")))
}

/// DB パスはアプリデータディレクトリに配置
fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dubdesk")
        .join("dubdesk.db")
}
