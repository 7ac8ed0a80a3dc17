#![forbid(unsafe_code)]

//! Contact-form delivery over HTTP.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

use folio_core::contact::{FormTransport, SubmitOutcome, Submission, TransportError};
use reqwest::header::{ACCEPT, CONTENT_TYPE};

/// Request timeout for form posts.
pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);

/// What a background submission reports.
pub type SubmitResult = Result<SubmitOutcome, TransportError>;

/// Blocking form POST with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    timeout: Duration,
}

impl HttpTransport {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(SUBMIT_TIMEOUT)
    }
}

impl FormTransport for HttpTransport {
    fn submit(
        &self,
        endpoint: &str,
        submission: &Submission,
    ) -> Result<SubmitOutcome, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransportError::Setup(format!("failed to build HTTP client: {e}")))?;
        let res = client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(ACCEPT, "application/json")
            .body(submission.encode())
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = res.status();
        if status.is_success() {
            tracing::info!(%status, "contact form accepted");
            Ok(SubmitOutcome::Accepted)
        } else {
            tracing::warn!(%status, "contact form rejected");
            Ok(SubmitOutcome::Rejected {
                status: status.as_u16(),
            })
        }
    }
}

/// Run `transport` on a worker thread; the result arrives on the receiver.
pub fn spawn_submit(
    transport: Arc<dyn FormTransport + Send + Sync>,
    endpoint: String,
    submission: Submission,
) -> Receiver<SubmitResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = transport.submit(&endpoint, &submission);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "contact form delivery failed");
        }
        // The app may have quit; nobody to tell.
        let _ = tx.send(result);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Echo(SubmitOutcome);

    impl FormTransport for Echo {
        fn submit(&self, endpoint: &str, s: &Submission) -> SubmitResult {
            assert_eq!(endpoint, "https://forms.invalid/f/1");
            assert_eq!(s.name, "Ada");
            Ok(self.0.clone())
        }
    }

    #[test]
    fn worker_reports_over_the_channel() {
        let rx = spawn_submit(
            Arc::new(Echo(SubmitOutcome::Rejected { status: 422 })),
            "https://forms.invalid/f/1".into(),
            Submission {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                message: "hi".into(),
            },
        );
        let got = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(got, Ok(SubmitOutcome::Rejected { status: 422 }));
    }

    #[test]
    fn unreachable_endpoint_is_a_network_error() {
        let transport = HttpTransport::new(Duration::from_millis(500));
        let submission = Submission {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            message: "hi".into(),
        };
        // Port 9 on loopback is the discard service; nothing listens there.
        let got = transport.submit("http://127.0.0.1:9/f", &submission);
        assert!(matches!(got, Err(TransportError::Network(_))), "{got:?}");
    }
}
