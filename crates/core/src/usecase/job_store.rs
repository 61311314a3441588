use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;

use crate::domain::form::NewJob;
use crate::domain::job::{CreatedJob, Job};
use crate::infra::api::JobsApi;
use crate::infra::metrics::Metrics;

/// ジョブ一覧の表示用スナップショット
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobListState {
    /// バックエンドの並び順のまま（再ソートしない）
    pub jobs: Vec<Job>,
    /// 最後に開始した一覧取得が未完了の間 true
    pub is_loading: bool,
    pub list_error: Option<String>,
    /// 作成リクエストが未完了の間 true
    pub is_submitting: bool,
    pub submit_error: Option<String>,
    /// 最後に一覧を反映した時刻
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// refresh() の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Committed { count: usize },
    Failed(String),
    /// 後から開始したリフレッシュがあるため破棄された
    Superseded,
}

/// submit() の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(CreatedJob),
    Failed(String),
    /// 送信中のため拒否（通信なし）
    Busy,
}

struct Inner {
    view: JobListState,
    /// 最後に開始したリフレッシュの世代番号
    latest_generation: u64,
}

/// ジョブストア: 一覧と送信状態を保持する唯一のキャッシュ。
/// 変更経路は refresh() と submit() のみ。
///
/// 重なったリフレッシュは「最後に開始したものが勝つ」。応答の到着順ではなく
/// 開始時に払い出した世代番号で判定し、古い応答は捨てる。
pub struct JobStore {
    api: Arc<dyn JobsApi>,
    inner: Mutex<Inner>,
    changes: watch::Sender<JobListState>,
    metrics: Arc<Metrics>,
}

impl JobStore {
    pub fn new(api: Arc<dyn JobsApi>) -> Self {
        Self::with_metrics(api, Arc::new(Metrics::new()))
    }

    pub fn with_metrics(api: Arc<dyn JobsApi>, metrics: Arc<Metrics>) -> Self {
        let (changes, _) = watch::channel(JobListState::default());
        Self {
            api,
            inner: Mutex::new(Inner {
                view: JobListState::default(),
                latest_generation: 0,
            }),
            changes,
            metrics,
        }
    }

    /// 現在の状態のコピー
    pub fn snapshot(&self) -> JobListState {
        self.inner.lock().view.clone()
    }

    /// 状態遷移ごとに最新スナップショットが届く
    pub fn subscribe(&self) -> watch::Receiver<JobListState> {
        self.changes.subscribe()
    }

    pub fn api_name(&self) -> &str {
        self.api.name()
    }

    fn publish(&self, view: &JobListState) {
        self.changes.send_replace(view.clone());
    }

    /// 一覧を再取得する。
    /// 失敗時は list_error を設定し、直前の jobs はそのまま残す。
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = {
            let mut inner = self.inner.lock();
            inner.latest_generation += 1;
            inner.view.is_loading = true;
            inner.view.list_error = None;
            self.publish(&inner.view);
            inner.latest_generation
        };
        self.metrics.inc_refreshes_started();
        log::debug!("一覧取得開始 (gen={generation}, api={})", self.api.name());

        let started = Instant::now();
        let result = self.api.list_jobs().await;
        self.metrics
            .record_latency("list", started.elapsed().as_millis() as u64);

        let mut inner = self.inner.lock();
        if generation != inner.latest_generation {
            log::debug!(
                "古い一覧応答を破棄 (gen={generation}, latest={})",
                inner.latest_generation
            );
            self.metrics.inc_refreshes_superseded();
            return RefreshOutcome::Superseded;
        }

        inner.view.is_loading = false;
        let outcome = match result {
            Ok(jobs) => {
                let count = jobs.len();
                inner.view.jobs = jobs;
                inner.view.last_refreshed_at = Some(Utc::now());
                self.metrics.inc_refreshes_committed();
                log::debug!("一覧を反映 (gen={generation}, {count} 件)");
                RefreshOutcome::Committed { count }
            }
            Err(e) => {
                let message = format!("Failed to load jobs: {e}");
                log::warn!("一覧取得失敗 (gen={generation}): {e}");
                inner.view.list_error = Some(message.clone());
                self.metrics.inc_refreshes_failed();
                RefreshOutcome::Failed(message)
            }
        };
        self.publish(&inner.view);
        outcome
    }

    /// 新規ジョブを送信する。送信中なら通信せずに Busy を返す。
    /// 成功後は一覧を 1 回だけ再取得してから戻る。
    pub async fn submit(&self, job: NewJob) -> SubmitOutcome {
        {
            let mut inner = self.inner.lock();
            if inner.view.is_submitting {
                self.metrics.inc_submissions_rejected();
                log::warn!("送信中のため新規ジョブを拒否: {}", job.title);
                return SubmitOutcome::Busy;
            }
            // 入力不備は通信せずに拒否する
            if let Err(e) = job.validate() {
                let message = format!("Failed to submit job: {e}");
                log::warn!("不正なジョブを拒否: {e}");
                inner.view.submit_error = Some(message.clone());
                self.publish(&inner.view);
                self.metrics.inc_submissions_rejected();
                return SubmitOutcome::Failed(message);
            }
            inner.view.is_submitting = true;
            inner.view.submit_error = None;
            self.publish(&inner.view);
        }
        self.metrics.inc_submissions_accepted();
        log::info!(
            "ジョブ送信: {} ({} → {}, {} bytes)",
            job.title,
            job.source_language,
            job.target_language,
            job.video.len()
        );

        let started = Instant::now();
        let result = self.api.create_job(job).await;
        self.metrics
            .record_latency("create", started.elapsed().as_millis() as u64);

        match result {
            Ok(created) => {
                {
                    let mut inner = self.inner.lock();
                    inner.view.is_submitting = false;
                    self.publish(&inner.view);
                }
                log::info!("ジョブ作成完了: {} ({})", created.id, created.status);
                self.refresh().await;
                SubmitOutcome::Created(created)
            }
            Err(e) => {
                let message = format!("Failed to submit job: {e}");
                log::warn!("ジョブ送信失敗: {e}");
                let mut inner = self.inner.lock();
                inner.view.is_submitting = false;
                inner.view.submit_error = Some(message.clone());
                self.publish(&inner.view);
                self.metrics.inc_submissions_failed();
                SubmitOutcome::Failed(message)
            }
        }
    }
}
