use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::domain::error::{AppError, DashboardError};
use crate::domain::job::JobDetail;
use crate::domain::settings::Theme;
use crate::infra::api::JobsApi;
use crate::infra::metrics::{Metrics, MetricsSummary};
use crate::infra::storage::Storage;
use crate::usecase::job_store::{JobStore, RefreshOutcome};
use crate::usecase::poller::JobPoller;
use crate::usecase::submission::SubmissionController;

/// アプリケーションサービス。
/// バックエンド・ジョブストア・ローカル設定・メトリクスを束ねる。
pub struct DashboardService {
    api: Arc<dyn JobsApi>,
    store: Arc<JobStore>,
    storage: Mutex<Storage>,
    metrics: Arc<Metrics>,
}

impl DashboardService {
    pub fn new(api: Arc<dyn JobsApi>, storage: Storage) -> Self {
        let metrics = Arc::new(Metrics::new());
        let store = Arc::new(JobStore::with_metrics(api.clone(), metrics.clone()));
        log::info!("DashboardService 初期化 (api={})", api.name());
        Self {
            api,
            store,
            storage: Mutex::new(storage),
            metrics,
        }
    }

    pub fn store(&self) -> Arc<JobStore> {
        self.store.clone()
    }

    /// 同じストアを共有するフォームコントローラを作る
    pub fn submission_controller(&self) -> SubmissionController {
        SubmissionController::new(self.store.clone())
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        self.store.refresh().await
    }

    /// 単一ジョブの詳細。ストアのキャッシュは更新しない。
    pub async fn get_job(&self, id: &str) -> Result<JobDetail, DashboardError> {
        self.api.get_job(id).await
    }

    // --- Theme ---

    /// 保存済みテーマ。未保存なら端末の背景色から推定する。
    pub fn theme(&self) -> Result<Theme, AppError> {
        let stored = self.storage.lock().get_theme()?;
        Ok(stored.unwrap_or_else(|| {
            Theme::from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
        }))
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), AppError> {
        self.storage.lock().save_theme(theme)?;
        log::info!("テーマ変更: {theme}");
        Ok(())
    }

    /// テーマを切り替えて保存し、新しいテーマを返す
    pub fn toggle_theme(&self) -> Result<Theme, AppError> {
        let next = self.theme()?.toggled();
        self.set_theme(next)?;
        Ok(next)
    }

    // --- Metrics ---

    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    /// 自動リフレッシュを開始する。返り値を drop すると停止する。
    pub fn start_poller(&self, interval: Duration) -> JobPoller {
        JobPoller::spawn(self.store.clone(), interval)
    }
}
