//! Presenter-facing analysis session.
//!
//! One session backs one results view. Each `analyze` call is a run with a
//! monotonically increasing id; a run's result is only stored and announced
//! if no newer run (or `reset`) has started since. Late completions from
//! superseded runs are dropped.

pub mod gateway;
pub mod notify;

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::intake::extract::extract_text;
use crate::intake::validation::validate;
use crate::models::scorecard::Scorecard;
use crate::models::upload::{AnalysisRequest, UploadCandidate};
use crate::session::gateway::{AnalysisFailure, AnalysisGateway};
use crate::session::notify::{Notifier, NotifyKind};

pub const SUCCESS_MESSAGE: &str = "Your resume has been analyzed successfully";

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(Scorecard),
    /// Carries the user-facing message that was also sent to the notifier.
    Failed(String),
    /// A newer run started before this one finished; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone)]
pub struct CompletedAnalysis {
    pub run_id: u64,
    pub scorecard: Scorecard,
    pub completed_at: DateTime<Utc>,
}

#[derive(Default)]
struct SessionState {
    latest_run: u64,
    pending_run: Option<u64>,
    current: Option<CompletedAnalysis>,
}

pub struct AnalysisSession {
    gateway: Arc<dyn AnalysisGateway>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SessionState>,
}

impl AnalysisSession {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            gateway,
            notifier,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Runs the full pipeline for one selected file.
    ///
    /// A rejected file is reported immediately and does not disturb a run
    /// already in flight. An accepted file starts a new run, discarding the
    /// current scorecard and superseding any pending run.
    pub async fn analyze(&self, candidate: UploadCandidate) -> RunOutcome {
        if let Err(e) = validate(&candidate) {
            let message = e.to_string();
            self.notifier.notify(NotifyKind::Error, &message);
            return RunOutcome::Failed(message);
        }

        let run_id = self.begin_run();
        info!("Run {} started for '{}'", run_id, candidate.file_name);

        let request = AnalysisRequest::new(extract_text(&candidate));
        drop(candidate);

        let result = self.gateway.analyze(&request).await;
        self.finish_run(run_id, result)
    }

    /// Returns to the initial state: clears the scorecard and invalidates
    /// any run still in flight.
    pub fn reset(&self) {
        let mut state = self.lock();
        state.latest_run += 1;
        state.pending_run = None;
        state.current = None;
    }

    pub fn current(&self) -> Option<CompletedAnalysis> {
        self.lock().current.clone()
    }

    /// Id of the run whose result is still awaited, if any.
    pub fn pending_run(&self) -> Option<u64> {
        self.lock().pending_run
    }

    fn begin_run(&self) -> u64 {
        let mut state = self.lock();
        state.latest_run += 1;
        state.pending_run = Some(state.latest_run);
        state.current = None;
        state.latest_run
    }

    fn finish_run(&self, run_id: u64, result: Result<Scorecard, AnalysisFailure>) -> RunOutcome {
        let outcome = {
            let mut state = self.lock();
            if state.latest_run != run_id {
                debug!(
                    "Discarding result of run {} (latest is {})",
                    run_id, state.latest_run
                );
                return RunOutcome::Superseded;
            }
            state.pending_run = None;

            match result {
                Ok(scorecard) => {
                    state.current = Some(CompletedAnalysis {
                        run_id,
                        scorecard: scorecard.clone(),
                        completed_at: Utc::now(),
                    });
                    RunOutcome::Completed(scorecard)
                }
                Err(failure) => {
                    info!("Run {} failed: {}", run_id, failure);
                    RunOutcome::Failed(failure.user_message().to_string())
                }
            }
        };

        match &outcome {
            RunOutcome::Completed(_) => self.notifier.notify(NotifyKind::Success, SUCCESS_MESSAGE),
            RunOutcome::Failed(message) => self.notifier.notify(NotifyKind::Error, message),
            RunOutcome::Superseded => {}
        }
        outcome
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::intake::validation::MAX_UPLOAD_BYTES;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<(NotifyKind, String)>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<(NotifyKind, String)> {
            self.events.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, kind: NotifyKind, message: &str) {
            self.events.lock().unwrap().push((kind, message.to_string()));
        }
    }

    /// Scores each request by its text; the text "slow" blocks until released.
    #[derive(Default)]
    struct ScriptedGateway {
        calls: AtomicUsize,
        requests: Mutex<Vec<String>>,
        slow_entered: Notify,
        slow_release: Notify,
    }

    #[async_trait]
    impl AnalysisGateway for ScriptedGateway {
        async fn analyze(&self, request: &AnalysisRequest) -> Result<Scorecard, AnalysisFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request.text().to_string());
            match request.text() {
                "slow" => {
                    self.slow_entered.notify_one();
                    self.slow_release.notified().await;
                    Ok(scored(10))
                }
                "throttled" => Err(AnalysisFailure::RateLimited),
                _ => Ok(scored(90)),
            }
        }
    }

    fn scored(overall: i64) -> Scorecard {
        Scorecard {
            overall_score: overall,
            ..Scorecard::fallback()
        }
    }

    fn text_file(text: &str) -> UploadCandidate {
        UploadCandidate::new("cv.txt", "text/plain", text.as_bytes().to_vec())
    }

    fn session() -> (Arc<AnalysisSession>, Arc<ScriptedGateway>, Arc<RecordingNotifier>) {
        let gateway = Arc::new(ScriptedGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Arc::new(AnalysisSession::new(gateway.clone(), notifier.clone()));
        (session, gateway, notifier)
    }

    #[tokio::test]
    async fn test_completed_run_stores_scorecard_and_notifies() {
        let (session, gateway, notifier) = session();

        let outcome = session.analyze(text_file("Jane Doe")).await;

        assert_eq!(outcome, RunOutcome::Completed(scored(90)));
        assert_eq!(session.current().unwrap().scorecard.overall_score, 90);
        assert!(session.pending_run().is_none());
        assert_eq!(*gateway.requests.lock().unwrap(), vec!["Jane Doe".to_string()]);
        assert_eq!(
            notifier.events(),
            vec![(NotifyKind::Success, SUCCESS_MESSAGE.to_string())]
        );
    }

    #[tokio::test]
    async fn test_invalid_type_is_rejected_without_gateway_call() {
        let (session, gateway, notifier) = session();
        let candidate = UploadCandidate::new("photo.jpg", "image/jpeg", b"jpg".to_vec());

        let outcome = session.analyze(candidate).await;

        assert_eq!(
            outcome,
            RunOutcome::Failed("Please upload a PDF, DOC, DOCX, or TXT file".to_string())
        );
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
        assert_eq!(notifier.events()[0].0, NotifyKind::Error);
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected_without_gateway_call() {
        let (session, gateway, _) = session();
        let mut candidate = text_file("small body");
        candidate.declared_size = MAX_UPLOAD_BYTES + 1;

        let outcome = session.analyze(candidate).await;

        assert_eq!(
            outcome,
            RunOutcome::Failed("Please upload a file smaller than 5MB".to_string())
        );
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rate_limit_fails_without_fallback() {
        let (session, _, notifier) = session();

        let outcome = session.analyze(text_file("throttled")).await;

        assert_eq!(
            outcome,
            RunOutcome::Failed("Rate limit exceeded. Please try again in a moment.".to_string())
        );
        assert!(session.current().is_none());
        assert_eq!(notifier.events()[0].0, NotifyKind::Error);
    }

    #[tokio::test]
    async fn test_stale_run_is_discarded() {
        let (session, gateway, notifier) = session();

        let first_session = session.clone();
        let first = tokio::spawn(async move { first_session.analyze(text_file("slow")).await });
        gateway.slow_entered.notified().await;

        let second = session.analyze(text_file("fast")).await;
        assert_eq!(second, RunOutcome::Completed(scored(90)));

        gateway.slow_release.notify_one();
        let first = first.await.unwrap();

        assert_eq!(first, RunOutcome::Superseded);
        let current = session.current().unwrap();
        assert_eq!(current.scorecard.overall_score, 90);
        assert_eq!(current.run_id, 2);
        assert_eq!(notifier.events().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_run() {
        let (session, gateway, notifier) = session();

        let first_session = session.clone();
        let first = tokio::spawn(async move { first_session.analyze(text_file("slow")).await });
        gateway.slow_entered.notified().await;
        assert_eq!(session.pending_run(), Some(1));

        session.reset();
        assert!(session.pending_run().is_none());
        gateway.slow_release.notify_one();

        assert_eq!(first.await.unwrap(), RunOutcome::Superseded);
        assert!(session.current().is_none());
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_new_run_clears_previous_scorecard() {
        let (session, _, _) = session();
        session.analyze(text_file("Jane Doe")).await;
        assert!(session.current().is_some());

        session.analyze(text_file("throttled")).await;
        assert!(session.current().is_none());
    }

    #[tokio::test]
    async fn test_invalid_file_does_not_disturb_current_result() {
        let (session, _, _) = session();
        session.analyze(text_file("Jane Doe")).await;

        session
            .analyze(UploadCandidate::new("a.exe", "application/x-msdownload", b"MZ".to_vec()))
            .await;
        assert_eq!(session.current().unwrap().scorecard.overall_score, 90);
    }
}
