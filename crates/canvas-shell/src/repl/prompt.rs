//! Keeps the prompt in step with the server's current context.
//!
//! Every refresh takes a token when it starts. A result is applied only if no
//! refresh that started later has already been applied, so a slow response
//! can never overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

use canvas_client::{CanvasClient, ClientError};
use tokio::sync::watch;

use super::session::SessionState;

/// What a refresh did to the session state.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The server answered and the prompt now shows this path.
    Synced(String),
    /// The server could not be asked; the prompt shows the placeholder.
    Unreachable(ClientError),
    /// A refresh that started later has already landed; this result was dropped.
    Superseded,
}

/// Sole writer of [`SessionState`].
pub struct PromptSync {
    client: CanvasClient,
    state: watch::Sender<SessionState>,
    /// Last token handed out.
    issued: AtomicU64,
    /// Token of the result currently shown.
    applied: AtomicU64,
}

impl PromptSync {
    /// Create a synchronizer with an initial unreachable state.
    pub fn new(client: CanvasClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            client,
            state,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
        }
    }

    /// Read-only handle on the session state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Ask the server for its current context path and update the prompt.
    ///
    /// Never fails: an error becomes [`RefreshOutcome::Unreachable`].
    pub async fn refresh(&self) -> RefreshOutcome {
        let token = self.begin();
        let result = self.client.context().path().await;
        self.settle(token, result)
    }

    /// Show `path` right away, ahead of the server confirming it.
    ///
    /// Counts as a refresh of its own, so anything started earlier is superseded.
    pub fn assume(&self, path: impl Into<String>) {
        let token = self.begin();
        self.apply(
            token,
            SessionState {
                display_path: path.into(),
                reachable: true,
            },
        );
    }

    /// Hand out the next refresh token.
    fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Turn the result of refresh `token` into a state update.
    fn settle(&self, token: u64, result: Result<String, ClientError>) -> RefreshOutcome {
        match result {
            Ok(path) => {
                let next = SessionState {
                    display_path: path.clone(),
                    reachable: true,
                };
                if self.apply(token, next) {
                    tracing::debug!(token, %path, "prompt synced");
                    RefreshOutcome::Synced(path)
                } else {
                    tracing::debug!(token, "stale refresh dropped");
                    RefreshOutcome::Superseded
                }
            }
            Err(err) => {
                let next = SessionState {
                    display_path: self.state.borrow().display_path.clone(),
                    reachable: false,
                };
                if self.apply(token, next) {
                    tracing::info!(token, error = %err, "context refresh failed");
                    RefreshOutcome::Unreachable(err)
                } else {
                    tracing::debug!(token, error = %err, "stale refresh failure dropped");
                    RefreshOutcome::Superseded
                }
            }
        }
    }

    /// Store `next` unless a later token has already been applied.
    fn apply(&self, token: u64, next: SessionState) -> bool {
        let mut accepted = false;
        self.state.send_if_modified(|state| {
            if token <= self.applied.load(Ordering::SeqCst) {
                return false;
            }
            self.applied.store(token, Ordering::SeqCst);
            accepted = true;
            if *state == next {
                return false;
            }
            *state = next;
            true
        });
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn offline_client() -> CanvasClient {
        CanvasClient::builder()
            .base_url("http://127.0.0.1:1/rest/v1")
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap()
    }

    fn current(sync: &PromptSync) -> SessionState {
        sync.state.borrow().clone()
    }

    fn client_for(server: &MockServer) -> CanvasClient {
        CanvasClient::builder()
            .base_url(format!("{}/rest/v1", server.uri()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_later_token_wins_when_it_lands_first() {
        let sync = PromptSync::new(offline_client());
        let slow = sync.begin();
        let fast = sync.begin();

        assert!(matches!(
            sync.settle(fast, Ok("/fast".to_string())),
            RefreshOutcome::Synced(_)
        ));
        assert!(matches!(
            sync.settle(slow, Ok("/slow".to_string())),
            RefreshOutcome::Superseded
        ));
        assert_eq!(current(&sync).display_path, "/fast");
    }

    #[test]
    fn test_in_order_results_both_apply() {
        let sync = PromptSync::new(offline_client());
        let first = sync.begin();
        let second = sync.begin();

        sync.settle(first, Ok("/a".to_string()));
        sync.settle(second, Ok("/b".to_string()));
        assert_eq!(current(&sync).display_path, "/b");
    }

    #[test]
    fn test_stale_failure_does_not_mark_unreachable() {
        let sync = PromptSync::new(offline_client());
        let slow = sync.begin();
        let fast = sync.begin();

        sync.settle(fast, Ok("/fast".to_string()));
        let outcome = sync.settle(slow, Err(ClientError::Timeout("slow".into())));

        assert!(matches!(outcome, RefreshOutcome::Superseded));
        assert!(current(&sync).reachable);
    }

    #[test]
    fn test_assume_supersedes_earlier_refresh() {
        let sync = PromptSync::new(offline_client());
        let pending = sync.begin();

        sync.assume("/optimistic");
        let outcome = sync.settle(pending, Ok("/old".to_string()));

        assert!(matches!(outcome, RefreshOutcome::Superseded));
        assert_eq!(
            current(&sync),
            SessionState {
                display_path: "/optimistic".to_string(),
                reachable: true,
            }
        );
    }

    #[test]
    fn test_subscribers_see_updates() {
        let sync = PromptSync::new(offline_client());
        let mut rx = sync.subscribe();

        sync.assume("/seen");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().display_path, "/seen");
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_last_started_wins() {
        let sync = PromptSync::new(offline_client());

        let slow = async {
            let token = sync.begin();
            tokio::time::sleep(Duration::from_millis(150)).await;
            sync.settle(token, Ok("/slow".to_string()))
        };
        let fast = async {
            let token = sync.begin();
            tokio::time::sleep(Duration::from_millis(10)).await;
            sync.settle(token, Ok("/fast".to_string()))
        };

        let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

        assert!(matches!(slow_outcome, RefreshOutcome::Superseded));
        assert!(matches!(fast_outcome, RefreshOutcome::Synced(_)));
        assert_eq!(current(&sync).display_path, "/fast");
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/context/path"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": "/work"})))
            .mount(&server)
            .await;

        let sync = PromptSync::new(client_for(&server));
        let outcome = sync.refresh().await;

        assert!(matches!(outcome, RefreshOutcome::Synced(ref p) if p == "/work"));
        assert_eq!(current(&sync).prompt_text(), "[/work] > ");
    }

    #[tokio::test]
    async fn test_overlapping_refreshes_through_client() {
        let server = MockServer::start().await;
        // First request answers late with the old path, the second answers at once
        Mock::given(method("GET"))
            .and(path("/rest/v1/context/path"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"payload": "/slow"}))
                    .set_delay(Duration::from_millis(400)),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/context/path"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"payload": "/fast"})))
            .mount(&server)
            .await;

        let sync = PromptSync::new(client_for(&server));
        let slow = sync.refresh();
        let fast = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            sync.refresh().await
        };

        let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

        assert!(matches!(fast_outcome, RefreshOutcome::Synced(ref p) if p == "/fast"));
        assert!(matches!(slow_outcome, RefreshOutcome::Superseded));
        assert_eq!(current(&sync).prompt_text(), "[/fast] > ");
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_path_and_marks_unreachable() {
        let sync = PromptSync::new(offline_client());
        sync.assume("/last-known");

        let outcome = sync.refresh().await;

        assert!(matches!(outcome, RefreshOutcome::Unreachable(_)));
        let state = current(&sync);
        assert!(!state.reachable);
        assert_eq!(state.display_path, "/last-known");
        assert_eq!(state.prompt_text(), "Canvas Server not reachable > ");
    }

    #[tokio::test]
    async fn test_refresh_server_error_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/context/path"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sync = PromptSync::new(client_for(&server));
        let outcome = sync.refresh().await;

        match outcome {
            RefreshOutcome::Unreachable(err) => assert_eq!(err.status(), Some(500)),
            other => panic!("expected unreachable, got {:?}", other),
        }
        assert!(!current(&sync).reachable);
    }
}
