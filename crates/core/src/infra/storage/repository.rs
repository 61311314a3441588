use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};

use crate::domain::error::AppError;
use crate::domain::settings::{THEME_KEY, Theme};

/// SQLiteストレージ（ローカル設定の key-value のみ）
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// 新規接続（ファイルパス指定）。親ディレクトリが無ければ作成する。
    pub fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| {
                    AppError::storage(format!("ディレクトリ作成に失敗 {}: {e}", dir.display()))
                })?;
            }
        }
        let conn = Connection::open(path)
            .map_err(|e| AppError::storage(format!("DB接続に失敗: {e}")))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// in-memory DB（テスト・オフライン用）
    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::storage(format!("in-memory DB作成に失敗: {e}")))?;
        let storage = Self { conn };
        storage.migrate()?;
        Ok(storage)
    }

    /// スキーママイグレーション
    fn migrate(&self) -> Result<(), AppError> {
        self.conn
            .execute_batch(
                "
                CREATE TABLE IF NOT EXISTS settings (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );
                ",
            )
            .map_err(|e| AppError::storage(format!("マイグレーション失敗: {e}")))?;
        Ok(())
    }

    // --- Settings ---

    pub fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| AppError::storage(format!("設定読み込み失敗: {e}")))
    }

    pub fn put_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(|e| AppError::storage(format!("設定保存失敗: {e}")))?;
        Ok(())
    }

    // --- Theme ---

    /// 保存済みテーマ。未保存・不正値は None（既定値の判断は呼び出し側）
    pub fn get_theme(&self) -> Result<Option<Theme>, AppError> {
        let Some(raw) = self.get_setting(THEME_KEY)? else {
            return Ok(None);
        };
        let theme = Theme::parse(&raw);
        if theme.is_none() {
            log::warn!("不正なテーマ値を無視します: {raw:?}");
        }
        Ok(theme)
    }

    pub fn save_theme(&self, theme: Theme) -> Result<(), AppError> {
        self.put_setting(THEME_KEY, theme.as_str())?;
        log::debug!("テーマを保存: {theme}");
        Ok(())
    }
}
