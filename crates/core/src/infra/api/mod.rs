pub mod http;
mod memory;

pub use http::HttpJobsApi;
pub use memory::InMemoryJobsApi;

use async_trait::async_trait;

use crate::domain::error::DashboardError;
use crate::domain::form::NewJob;
use crate::domain::job::{CreatedJob, Job, JobDetail};

/// ジョブバックエンド trait。
/// 1 呼び出し = 1 往復。リトライは呼び出し側の責任。
#[async_trait]
pub trait JobsApi: Send + Sync {
    /// ジョブ一覧（バックエンドの並び順のまま）
    async fn list_jobs(&self) -> Result<Vec<Job>, DashboardError>;

    /// 新規ジョブ作成。検証に失敗した場合は通信せずに Validation を返す。
    async fn create_job(&self, job: NewJob) -> Result<CreatedJob, DashboardError>;

    async fn get_job(&self, id: &str) -> Result<JobDetail, DashboardError>;

    fn name(&self) -> &str;
}
