use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// ジョブ状態（バックエンドが唯一の正）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// これ以上状態が変わらないか
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 対応言語（en / ko / ja）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    En,
    Ko,
    Ja,
}

impl Language {
    pub const ALL: [Language; 3] = [Self::En, Self::Ko, Self::Ja];

    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ko => "ko",
            Self::Ja => "ja",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Ko => "Korean",
            Self::Ja => "Japanese",
        }
    }

    /// 言語コードを解釈する（前後空白・大文字小文字は無視）
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code().eq_ignore_ascii_case(code))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// ジョブ一覧の1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub status: JobStatus,
    pub source_language: Language,
    pub target_language: Language,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// ジョブ詳細（GET /jobs/{id}）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDetail {
    pub id: String,
    pub title: String,
    pub status: JobStatus,
    pub source_language: Language,
    pub target_language: Language,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    pub original_filename: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl JobDetail {
    /// 一覧表示用に詳細を落とす
    pub fn summary(&self) -> Job {
        Job {
            id: self.id.clone(),
            title: self.title.clone(),
            status: self.status,
            source_language: self.source_language,
            target_language: self.target_language,
            created_at: self.created_at,
        }
    }
}

/// POST /jobs のレスポンス。
/// バックエンドは `{id, status}` のみ返すことがあるので残りは任意。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedJob {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_language: Option<Language>,
    #[serde(default)]
    pub target_language: Option<Language>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

/// バックエンドのタイムスタンプ。
/// オフセット無し（naive UTC）の ISO 8601 も受け付ける。
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("en"), Some(Language::En));
        assert_eq!(Language::parse(" KO "), Some(Language::Ko));
        assert_eq!(Language::parse("ja"), Some(Language::Ja));
        assert_eq!(Language::parse("fr"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn test_terminal_status() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_job_from_backend_naive_timestamp() {
        let json = r#"{
            "id": "3f1c2b9e-7d1a-4c55-9a34-0c2f1e5b6a70",
            "title": "Episode 1",
            "status": "processing",
            "source_language": "en",
            "target_language": "ja",
            "created_at": "2025-01-15T10:30:00.123456"
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.target_language, Language::Ja);
        assert_eq!(
            job.created_at.timestamp(),
            Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap().timestamp()
        );
    }

    #[test]
    fn test_job_with_offset_timestamp() {
        let json = r#"{
            "id": "j1",
            "title": "Scene 1",
            "status": "pending",
            "source_language": "en",
            "target_language": "ko",
            "created_at": "2025-01-15T19:30:00+09:00"
        }"#;
        let job: Job = serde_json::from_str(json).unwrap();
        assert_eq!(job.created_at, Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_unsupported_language_is_rejected() {
        let json = r#"{
            "id": "j1",
            "title": "Scene 1",
            "status": "pending",
            "source_language": "fr",
            "target_language": "ko",
            "created_at": "2025-01-15T10:30:00Z"
        }"#;
        assert!(serde_json::from_str::<Job>(json).is_err());
    }

    #[test]
    fn test_created_job_minimal_response() {
        let created: CreatedJob =
            serde_json::from_str(r#"{"id": "j1", "status": "pending"}"#).unwrap();
        assert_eq!(created.id, "j1");
        assert_eq!(created.status, JobStatus::Pending);
        assert!(created.title.is_none());
        assert!(created.created_at.is_none());
    }

    #[test]
    fn test_detail_summary() {
        let detail: JobDetail = serde_json::from_str(
            r#"{
                "id": "j9",
                "title": "Trailer",
                "status": "failed",
                "source_language": "ko",
                "target_language": "en",
                "created_at": "2025-01-15T10:30:00",
                "updated_at": "2025-01-15T10:35:00",
                "original_filename": "trailer.mp4",
                "error_message": "ASR failed"
            }"#,
        )
        .unwrap();
        let job = detail.summary();
        assert_eq!(job.id, "j9");
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(detail.error_message.as_deref(), Some("ASR failed"));
    }
}
