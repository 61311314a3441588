use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::usecase::job_store::JobStore;

/// tokio の interval は 0 を受け付けない
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// 一定間隔で refresh() を呼ぶバックグラウンドタスク。
/// 重なったリフレッシュの整合はストア側の世代番号に任せる。
pub struct JobPoller {
    cancel_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl JobPoller {
    pub fn spawn(store: Arc<JobStore>, interval: Duration) -> Self {
        let interval = interval.max(MIN_INTERVAL);
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();
        log::info!("ポーリング開始 ({}ms 間隔)", interval.as_millis());

        let handle = tokio::spawn(async move {
            // 初回 tick は即時に発火する
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => break,
                    _ = ticker.tick() => {
                        store.refresh().await;
                    }
                }
            }
            log::info!("ポーリング停止");
        });

        Self {
            cancel_tx: Some(cancel_tx),
            handle: Some(handle),
        }
    }

    /// 停止して終了を待つ。実行中の refresh は完了させる。
    pub async fn stop(mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::warn!("ポーリングタスク異常終了: {e}");
            }
        }
    }
}

impl Drop for JobPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
