use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::Mutex;

use super::JobsApi;
use crate::domain::error::DashboardError;
use crate::domain::form::NewJob;
use crate::domain::job::{CreatedJob, Job, JobDetail, JobStatus, Language};

/// InMemoryJobsApi: プロセス内で完結するバックエンド。
/// オフライン表示とデモ用。処理パイプラインは `advance()` で擬似的に進める。
pub struct InMemoryJobsApi {
    jobs: Mutex<Vec<JobDetail>>,
}

impl InMemoryJobsApi {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn with_jobs(jobs: Vec<JobDetail>) -> Self {
        Self {
            jobs: Mutex::new(jobs),
        }
    }

    /// デモ用のサンプルジョブ（完了済み 1 件、処理中 1 件、失敗 1 件）
    pub fn with_sample_jobs() -> Self {
        let now = Utc::now();
        let sample = |title: &str,
                      src: Language,
                      tgt: Language,
                      status: JobStatus,
                      minutes_ago: i64,
                      file: &str| {
            let at = now - Duration::minutes(minutes_ago);
            JobDetail {
                id: uuid::Uuid::new_v4().to_string(),
                title: title.to_string(),
                status,
                source_language: src,
                target_language: tgt,
                created_at: at,
                updated_at: at,
                original_filename: file.to_string(),
                error_message: None,
            }
        };
        let finale = sample(
            "Episode 3 – Finale",
            Language::Ko,
            Language::Ja,
            JobStatus::Processing,
            20,
            "ep3_finale.mkv",
        );
        let finale_id = finale.id.clone();

        let api = Self::with_jobs(vec![
            sample(
                "Episode 1 – Opening scene",
                Language::En,
                Language::Ko,
                JobStatus::Completed,
                45,
                "ep1_opening.mp4",
            ),
            sample(
                "Episode 2 – Rooftop",
                Language::Ja,
                Language::En,
                JobStatus::Processing,
                5,
                "ep2_rooftop.mov",
            ),
            finale,
        ]);
        api.fail(&finale_id, "Voice synthesis timed out");
        api
    }

    /// パイプラインを 1 段進める（pending → processing → completed）。
    /// 状態が変わったジョブ数を返す。
    pub fn advance(&self) -> usize {
        let now = Utc::now();
        let mut jobs = self.jobs.lock();
        let mut changed = 0;
        for job in jobs.iter_mut() {
            let next = match job.status {
                JobStatus::Pending => JobStatus::Processing,
                JobStatus::Processing => JobStatus::Completed,
                JobStatus::Completed | JobStatus::Failed => continue,
            };
            job.status = next;
            job.updated_at = now;
            changed += 1;
        }
        changed
    }

    /// ジョブを失敗状態にする
    pub fn fail(&self, id: &str, message: impl Into<String>) -> bool {
        let mut jobs = self.jobs.lock();
        match jobs.iter_mut().find(|job| job.id == id) {
            Some(job) => {
                job.status = JobStatus::Failed;
                job.error_message = Some(message.into());
                job.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }
}

impl Default for InMemoryJobsApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobsApi for InMemoryJobsApi {
    async fn list_jobs(&self) -> Result<Vec<Job>, DashboardError> {
        let jobs = self.jobs.lock();
        let mut list: Vec<Job> = jobs.iter().map(JobDetail::summary).collect();
        // 新しい順
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn create_job(&self, job: NewJob) -> Result<CreatedJob, DashboardError> {
        job.validate()?;
        let now = Utc::now();
        let detail = JobDetail {
            id: uuid::Uuid::new_v4().to_string(),
            title: job.title,
            status: JobStatus::Pending,
            source_language: job.source_language,
            target_language: job.target_language,
            created_at: now,
            updated_at: now,
            original_filename: job.video.file_name,
            error_message: None,
        };
        log::info!("ジョブ登録 (in-memory): {} {}", detail.id, detail.title);

        let created = CreatedJob {
            id: detail.id.clone(),
            status: detail.status,
            title: Some(detail.title.clone()),
            source_language: Some(detail.source_language),
            target_language: Some(detail.target_language),
            created_at: Some(detail.created_at),
        };
        self.jobs.lock().push(detail);
        Ok(created)
    }

    async fn get_job(&self, id: &str) -> Result<JobDetail, DashboardError> {
        let jobs = self.jobs.lock();
        jobs.iter()
            .find(|job| job.id == id.trim())
            .cloned()
            .ok_or_else(|| DashboardError::transport(Some(404), r#"{"detail":"Job not found"}"#))
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::VideoPayload;

    fn new_job(title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            source_language: Language::En,
            target_language: Language::Ja,
            video: VideoPayload::new("scene.mp4", vec![1, 2, 3]),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let api = InMemoryJobsApi::with_sample_jobs();
        let created = api.create_job(new_job("Scene 1")).await.unwrap();
        assert_eq!(created.status, JobStatus::Pending);
        assert_eq!(created.title.as_deref(), Some("Scene 1"));

        let list = api.list_jobs().await.unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].id, created.id);
        assert!(list.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[tokio::test]
    async fn test_sample_jobs_include_failed_job() {
        let api = InMemoryJobsApi::with_sample_jobs();
        let list = api.list_jobs().await.unwrap();
        let failed = list
            .iter()
            .find(|job| job.status == JobStatus::Failed)
            .expect("sample should contain a failed job");

        let detail = api.get_job(&failed.id).await.unwrap();
        assert_eq!(detail.error_message.as_deref(), Some("Voice synthesis timed out"));

        // 失敗済みは advance で動かない
        assert_eq!(api.advance(), 1);
        assert_eq!(api.get_job(&failed.id).await.unwrap().status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_job() {
        let api = InMemoryJobsApi::new();
        let err = api.create_job(new_job("")).await.unwrap_err();
        assert!(err.is_validation());
        assert!(api.is_empty());
    }

    #[tokio::test]
    async fn test_advance_moves_pipeline_forward() {
        let api = InMemoryJobsApi::new();
        let created = api.create_job(new_job("Scene 1")).await.unwrap();

        assert_eq!(api.advance(), 1);
        assert_eq!(api.get_job(&created.id).await.unwrap().status, JobStatus::Processing);
        assert_eq!(api.advance(), 1);
        assert_eq!(api.get_job(&created.id).await.unwrap().status, JobStatus::Completed);
        assert_eq!(api.advance(), 0);
    }

    #[tokio::test]
    async fn test_fail_and_get_job() {
        let api = InMemoryJobsApi::new();
        let created = api.create_job(new_job("Scene 1")).await.unwrap();
        assert!(api.fail(&created.id, "TTS crashed"));

        let detail = api.get_job(&created.id).await.unwrap();
        assert_eq!(detail.status, JobStatus::Failed);
        assert_eq!(detail.error_message.as_deref(), Some("TTS crashed"));
        assert_eq!(detail.original_filename, "scene.mp4");
    }

    #[tokio::test]
    async fn test_get_missing_job_is_404() {
        let api = InMemoryJobsApi::new();
        let err = api.get_job("nope").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
