use std::sync::Arc;

use crate::domain::error::DashboardError;
use crate::domain::form::JobForm;
use crate::domain::job::CreatedJob;
use crate::usecase::job_store::{JobStore, SubmitOutcome};

/// on_submit() の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// 入力不備。ストアには触れていない
    Invalid(DashboardError),
    Created(CreatedJob),
    Failed(String),
    Busy,
}

/// 送信フォームのコントローラ。
/// 検証はここで行い、通過したものだけをストアに渡す。
pub struct SubmissionController {
    store: Arc<JobStore>,
    form: JobForm,
    field_error: Option<DashboardError>,
}

impl SubmissionController {
    pub fn new(store: Arc<JobStore>) -> Self {
        Self {
            store,
            form: JobForm::default(),
            field_error: None,
        }
    }

    pub fn form(&self) -> &JobForm {
        &self.form
    }

    /// 入力を変更する。直前の検証エラーは消える。
    pub fn form_mut(&mut self) -> &mut JobForm {
        self.field_error = None;
        &mut self.form
    }

    pub fn set_form(&mut self, form: JobForm) {
        self.form = form;
        self.field_error = None;
    }

    /// 直前の送信で見つかった入力不備
    pub fn field_error(&self) -> Option<&DashboardError> {
        self.field_error.as_ref()
    }

    /// 送信ボタンを押せるか（送信中は不可）
    pub fn can_submit(&self) -> bool {
        !self.store.snapshot().is_submitting
    }

    pub async fn on_submit(&mut self) -> FormOutcome {
        let job = match self.form.validate() {
            Ok(job) => job,
            Err(e) => {
                log::debug!("フォーム検証エラー: {e}");
                self.field_error = Some(e.clone());
                return FormOutcome::Invalid(e);
            }
        };
        self.field_error = None;

        match self.store.submit(job).await {
            SubmitOutcome::Created(created) => {
                self.form.reset();
                FormOutcome::Created(created)
            }
            SubmitOutcome::Failed(message) => FormOutcome::Failed(message),
            SubmitOutcome::Busy => FormOutcome::Busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::form::{FormField, VideoPayload};
    use crate::domain::job::JobStatus;
    use crate::usecase::test_support::{created, job, wait_until, FakeApi};

    fn filled_form() -> JobForm {
        JobForm {
            title: "Scene 1".to_string(),
            source_language: "en".to_string(),
            target_language: "ko".to_string(),
            video: Some(VideoPayload::new("scene1.mp4", vec![0, 0, 0, 24])),
        }
    }

    #[tokio::test]
    async fn test_missing_video_is_rejected_without_network() {
        let api = FakeApi::new();
        let store = Arc::new(JobStore::new(api.clone()));
        let mut controller = SubmissionController::new(store.clone());
        controller.set_form(JobForm {
            video: None,
            ..filled_form()
        });

        let outcome = controller.on_submit().await;
        match outcome {
            FormOutcome::Invalid(DashboardError::Validation { field, message }) => {
                assert_eq!(field, FormField::Video);
                assert_eq!(message, "Please select a video file.");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(api.create_calls(), 0);
        assert!(controller.field_error().is_some());
        assert_eq!(store.snapshot(), crate::usecase::job_store::JobListState::default());
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let api = FakeApi::new();
        let mut controller = SubmissionController::new(Arc::new(JobStore::new(api.clone())));
        controller.form_mut().title = "   ".to_string();
        controller.form_mut().video = Some(VideoPayload::new("a.mp4", vec![1]));

        let outcome = controller.on_submit().await;
        assert!(matches!(
            outcome,
            FormOutcome::Invalid(DashboardError::Validation { field: FormField::Title, .. })
        ));
        assert_eq!(api.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_success_resets_form_and_refreshes() {
        let api = FakeApi::new();
        api.push_create(Ok(created("j1")));
        api.push_list(Ok(vec![job("j1", JobStatus::Pending)]));
        let store = Arc::new(JobStore::new(api.clone()));
        let mut controller = SubmissionController::new(store.clone());
        controller.set_form(filled_form());

        let outcome = controller.on_submit().await;
        assert_eq!(outcome, FormOutcome::Created(created("j1")));
        assert_eq!(controller.form(), &JobForm::default());
        assert!(controller.field_error().is_none());
        assert_eq!(api.list_calls(), 1);
        assert_eq!(store.snapshot().jobs[0].id, "j1");
    }

    #[tokio::test]
    async fn test_failure_keeps_form_values() {
        let api = FakeApi::new();
        api.push_create(Err(DashboardError::transport(Some(500), "boom")));
        let store = Arc::new(JobStore::new(api.clone()));
        let mut controller = SubmissionController::new(store.clone());
        controller.set_form(filled_form());

        let outcome = controller.on_submit().await;
        assert!(matches!(outcome, FormOutcome::Failed(ref m) if m.contains("500")));
        assert_eq!(controller.form(), &filled_form());
        assert!(store.snapshot().submit_error.is_some());
    }

    #[tokio::test]
    async fn test_can_submit_is_false_while_submitting() {
        let api = FakeApi::new();
        let gate = api.gate_create();
        let store = Arc::new(JobStore::new(api.clone()));
        let observer = SubmissionController::new(store.clone());
        assert!(observer.can_submit());

        let task = tokio::spawn({
            let store = store.clone();
            async move {
                let mut controller = SubmissionController::new(store);
                controller.set_form(filled_form());
                controller.on_submit().await
            }
        });
        wait_until(|| api.create_calls() == 1).await;
        assert!(!observer.can_submit());

        let mut second = SubmissionController::new(store.clone());
        second.set_form(filled_form());
        assert_eq!(second.on_submit().await, FormOutcome::Busy);
        // Busy のときはフォームを保持
        assert_eq!(second.form(), &filled_form());

        gate.send(Ok(created("j1"))).unwrap();
        assert!(matches!(task.await.unwrap(), FormOutcome::Created(_)));
        assert!(observer.can_submit());
        assert_eq!(api.create_calls(), 1);
    }
}
