use serde::Serialize;

use super::form::FormField;

/// ジョブ操作のエラー（検証エラー / 通信エラーの2種のみ）
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    /// クライアント側で検出した入力不備。ネットワークには到達しない。
    #[error("{field}: {message}")]
    Validation { field: FormField, message: String },
    /// 通信失敗または非 2xx 応答。status は接続エラー時 None。
    #[error("{}", describe_transport(.status, .body))]
    Transport { status: Option<u16>, body: String },
}

impl DashboardError {
    pub fn validation(field: FormField, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn transport(status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Transport {
            status,
            body: body.into(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// HTTP ステータス（通信エラーかつ応答があった場合のみ）
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Validation { .. } => None,
        }
    }
}

// 応答本文は診断用に保持するが、表示は先頭だけにする
const BODY_PREVIEW_CHARS: usize = 200;

fn describe_transport(status: &Option<u16>, body: &str) -> String {
    let body = body.trim();
    let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
    let ellipsis = if body.chars().count() > BODY_PREVIEW_CHARS { "…" } else { "" };
    match (status, preview.is_empty()) {
        (Some(code), true) => format!("HTTP {code}"),
        (Some(code), false) => format!("HTTP {code}: {preview}{ellipsis}"),
        (None, true) => "network error".to_string(),
        (None, false) => format!("network error: {preview}{ellipsis}"),
    }
}

/// アプリケーション共通エラーコード（設定・ストレージ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_CONFIG")]
    Config,
    #[serde(rename = "E_STORAGE")]
    Storage,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

/// アプリケーションエラー（ジョブストアには入らない）
#[derive(Debug, Clone, Serialize)]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub recoverable: bool,
}

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Config,
            message: msg.into(),
            recoverable: true,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Internal,
            message: msg.into(),
            recoverable: false,
        }
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::Storage,
            message: msg.into(),
            recoverable: false,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {}
