use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use super::JobsApi;
use crate::config::DashboardConfig;
use crate::domain::error::{AppError, DashboardError};
use crate::domain::form::{FormField, NewJob};
use crate::domain::job::{CreatedJob, Job, JobDetail};

/// HTTP バックエンドクライアント（`{base}/jobs`）
pub struct HttpJobsApi {
    client: Client,
    base_url: Url,
}

impl HttpJobsApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = Url::parse(trimmed)
            .map_err(|e| AppError::config(format!("API ベース URL が不正です {trimmed:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::config(format!(
                "API ベース URL にパスを付けられません: {trimmed}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("HTTP クライアント作成に失敗: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, AppError> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// ベース URL にパスセグメントを追加する（セグメントはエンコードされる）
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DashboardError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| DashboardError::transport(None, format!("invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn send_error(e: reqwest::Error) -> DashboardError {
    let status = e.status().map(|s| s.as_u16());
    if e.is_timeout() {
        DashboardError::transport(status, format!("request timed out: {e}"))
    } else {
        DashboardError::transport(status, e.to_string())
    }
}

/// 非 2xx は本文ごと Transport に変換
async fn ensure_success(response: Response) -> Result<Response, DashboardError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(DashboardError::transport(Some(status.as_u16()), body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DashboardError> {
    let status = response.status().as_u16();
    response
        .json::<T>()
        .await
        .map_err(|e| DashboardError::transport(Some(status), format!("invalid response body: {e}")))
}

#[async_trait]
impl JobsApi for HttpJobsApi {
    async fn list_jobs(&self) -> Result<Vec<Job>, DashboardError> {
        let url = self.endpoint(&["jobs"])?;
        log::debug!("GET {url}");

        // 毎回バックエンドの最新状態を取得する
        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store, max-age=0")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(send_error)?;

        let response = ensure_success(response).await?;
        decode(response).await
    }

    async fn create_job(&self, job: NewJob) -> Result<CreatedJob, DashboardError> {
        job.validate()?;
        let url = self.endpoint(&["jobs"])?;

        let NewJob {
            title,
            source_language,
            target_language,
            video,
        } = job;
        log::debug!("POST {url} ({}, {} bytes)", video.file_name, video.len());

        let video_part = Part::bytes(video.bytes)
            .file_name(video.file_name)
            .mime_str(&video.content_type)
            .map_err(|e| {
                DashboardError::validation(
                    FormField::Video,
                    format!("Invalid content type {:?}: {e}", video.content_type),
                )
            })?;

        let form = Form::new()
            .text("title", title)
            .text("source_language", source_language.code())
            .text("target_language", target_language.code())
            .part("video", video_part);

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(send_error)?;

        let response = ensure_success(response).await?;
        decode(response).await
    }

    async fn get_job(&self, id: &str) -> Result<JobDetail, DashboardError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(DashboardError::validation(FormField::JobId, "Job id is required."));
        }
        let url = self.endpoint(&["jobs", id])?;
        log::debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache, no-store, max-age=0")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(send_error)?;

        let response = ensure_success(response).await?;
        decode(response).await
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_api_name() {
        let api = HttpJobsApi::new("http://localhost:8000/api/v1", Duration::from_secs(5)).unwrap();
        assert_eq!(api.name(), "http");
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = HttpJobsApi::new("http://localhost:8000/api/v1/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            api.endpoint(&["jobs"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/jobs"
        );
        assert_eq!(
            api.endpoint(&["jobs", "a b/c"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/jobs/a%20b%2Fc"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpJobsApi::new("not a url", Duration::from_secs(5)).err().unwrap();
        assert_eq!(err.code, crate::domain::error::ErrorCode::Config);

        assert!(HttpJobsApi::new("mailto:ops@example.com", Duration::from_secs(5)).is_err());
    }

    #[tokio::test]
    async fn test_create_job_validates_before_network() {
        // 到達不能なポート。検証で落ちれば接続は試みない。
        let api = HttpJobsApi::new("http://127.0.0.1:9/api/v1", Duration::from_secs(1)).unwrap();
        let job = NewJob {
            title: "  ".to_string(),
            source_language: crate::domain::job::Language::En,
            target_language: crate::domain::job::Language::Ko,
            video: crate::domain::form::VideoPayload::new("clip.mp4", vec![1, 2, 3]),
        };
        let err = api.create_job(job).await.unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_get_job_requires_id() {
        let api = HttpJobsApi::new("http://127.0.0.1:9/api/v1", Duration::from_secs(1)).unwrap();
        let err = api.get_job(" ").await.unwrap_err();
        assert!(err.is_validation());
    }
}
