use std::path::Path;

use serde::Serialize;

use super::error::DashboardError;
use super::job::Language;

/// 入力項目（検証エラーの対象）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Title,
    SourceLanguage,
    TargetLanguage,
    Video,
    JobId,
}

impl FormField {
    /// multipart のフィールド名と同じ
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::SourceLanguage => "source_language",
            Self::TargetLanguage => "target_language",
            Self::Video => "video",
            Self::JobId => "job_id",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// アップロードする動画ファイル
#[derive(Clone, PartialEq, Eq)]
pub struct VideoPayload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl VideoPayload {
    /// Content-Type は拡張子から推定する
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = guess_content_type(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// ファイルを読み込む。読めない場合は検証エラー（送信前に失敗させる）
    pub async fn from_path(path: &Path) -> Result<Self, DashboardError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            DashboardError::validation(
                FormField::Video,
                format!("Cannot read video file {}: {e}", path.display()),
            )
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for VideoPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoPayload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

fn guess_content_type(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") => "video/mp4",
        Some("m4v") => "video/x-m4v",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

/// 検証済みの新規ジョブ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    pub title: String,
    pub source_language: Language,
    pub target_language: Language,
    pub video: VideoPayload,
}

impl NewJob {
    /// 送信直前の最終チェック（API クライアントからも呼ばれる）
    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.title.trim().is_empty() {
            return Err(DashboardError::validation(FormField::Title, "Title is required."));
        }
        if self.video.file_name.trim().is_empty() {
            return Err(DashboardError::validation(
                FormField::Video,
                "Video file name is required.",
            ));
        }
        if self.video.is_empty() {
            return Err(DashboardError::validation(
                FormField::Video,
                "Selected video file is empty.",
            ));
        }
        Ok(())
    }
}

/// 未検証のフォーム入力。
/// 言語はセレクトボックスの生の値をそのまま持つ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobForm {
    pub title: String,
    pub source_language: String,
    pub target_language: String,
    pub video: Option<VideoPayload>,
}

impl Default for JobForm {
    fn default() -> Self {
        // セレクトボックスの先頭 (English) が初期値
        Self {
            title: String::new(),
            source_language: Language::En.code().to_string(),
            target_language: Language::En.code().to_string(),
            video: None,
        }
    }
}

impl JobForm {
    /// 入力を検証して NewJob を組み立てる。最初に見つかった不備を返す。
    pub fn validate(&self) -> Result<NewJob, DashboardError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(DashboardError::validation(FormField::Title, "Title is required."));
        }

        let source_language = parse_language(&self.source_language, FormField::SourceLanguage)?;
        let target_language = parse_language(&self.target_language, FormField::TargetLanguage)?;

        let video = self
            .video
            .as_ref()
            .ok_or_else(|| DashboardError::validation(FormField::Video, "Please select a video file."))?;

        let job = NewJob {
            title: title.to_string(),
            source_language,
            target_language,
            video: video.clone(),
        };
        job.validate()?;
        Ok(job)
    }

    /// 送信成功後の初期化
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn parse_language(raw: &str, field: FormField) -> Result<Language, DashboardError> {
    if raw.trim().is_empty() {
        let which = match field {
            FormField::TargetLanguage => "target",
            _ => "source",
        };
        return Err(DashboardError::validation(
            field,
            format!("Please select a {which} language."),
        ));
    }
    Language::parse(raw)
        .ok_or_else(|| DashboardError::validation(field, format!("Unsupported language: {}", raw.trim())))
}
