//! ユースケーステスト用のバックエンドダブル。
//! 応答を即時またはゲート（oneshot）で返し、到着順をテスト側で制御する。

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::domain::error::DashboardError;
use crate::domain::form::{NewJob, VideoPayload};
use crate::domain::job::{CreatedJob, Job, JobDetail, JobStatus, Language};
use crate::infra::api::JobsApi;

type Reply<T> = oneshot::Receiver<Result<T, DashboardError>>;

pub(crate) struct FakeApi {
    lists: Mutex<VecDeque<Reply<Vec<Job>>>>,
    creates: Mutex<VecDeque<Reply<CreatedJob>>>,
    default_list: Mutex<Vec<Job>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lists: Mutex::new(VecDeque::new()),
            creates: Mutex::new(VecDeque::new()),
            default_list: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        })
    }

    /// 予約が無いときの一覧応答
    pub fn set_default_list(&self, jobs: Vec<Job>) {
        *self.default_list.lock() = jobs;
    }

    /// 次の一覧呼び出しへの即時応答
    pub fn push_list(&self, reply: Result<Vec<Job>, DashboardError>) {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(reply);
        self.lists.lock().push_back(rx);
    }

    /// 次の一覧呼び出しを保留し、送信側を返す
    pub fn gate_list(&self) -> oneshot::Sender<Result<Vec<Job>, DashboardError>> {
        let (tx, rx) = oneshot::channel();
        self.lists.lock().push_back(rx);
        tx
    }

    pub fn push_create(&self, reply: Result<CreatedJob, DashboardError>) {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(reply);
        self.creates.lock().push_back(rx);
    }

    pub fn gate_create(&self) -> oneshot::Sender<Result<CreatedJob, DashboardError>> {
        let (tx, rx) = oneshot::channel();
        self.creates.lock().push_back(rx);
        tx
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

fn dropped_gate() -> DashboardError {
    DashboardError::transport(None, "test gate dropped")
}

#[async_trait]
impl JobsApi for FakeApi {
    async fn list_jobs(&self) -> Result<Vec<Job>, DashboardError> {
        let reply = self.lists.lock().pop_front();
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        match reply {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(dropped_gate())),
            None => Ok(self.default_list.lock().clone()),
        }
    }

    async fn create_job(&self, job: NewJob) -> Result<CreatedJob, DashboardError> {
        job.validate()?;
        let reply = self.creates.lock().pop_front();
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        match reply {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(dropped_gate())),
            None => Ok(created(&format!("job-{}", self.create_calls()))),
        }
    }

    async fn get_job(&self, id: &str) -> Result<JobDetail, DashboardError> {
        Err(DashboardError::transport(
            Some(404),
            format!("{{\"detail\":\"Job {id} not found\"}}"),
        ))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// 条件が成立するまで他タスクに実行を譲る
pub(crate) async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if cond() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

pub(crate) fn job(id: &str, status: JobStatus) -> Job {
    Job {
        id: id.to_string(),
        title: format!("Title {id}"),
        status,
        source_language: Language::En,
        target_language: Language::Ko,
        created_at: Utc.with_ymd_and_hms(2025, 1, 15, 10, 30, 0).unwrap(),
    }
}

pub(crate) fn created(id: &str) -> CreatedJob {
    CreatedJob {
        id: id.to_string(),
        status: JobStatus::Pending,
        title: None,
        source_language: None,
        target_language: None,
        created_at: None,
    }
}

pub(crate) fn new_job(title: &str) -> NewJob {
    NewJob {
        title: title.to_string(),
        source_language: Language::En,
        target_language: Language::Ko,
        video: VideoPayload::new("scene1.mp4", vec![0, 0, 0, 24]),
    }
}
