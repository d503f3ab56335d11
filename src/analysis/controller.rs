use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::intake::SelectedFile;
use crate::transport::AnalysisTransport;

use super::classifier::{classify, ErrorKind, RawFailure};
use super::types::{AnalysisRequest, AnalysisResult, AttemptId, RequestStatus};

/// Client-side deadline for one attempt, independent of the transport's own timeout.
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub(crate) enum Outcome {
    Response(Result<AnalysisResult, RawFailure>),
    AlarmFired,
}

/// A completion tagged with the attempt that produced it.
#[derive(Debug)]
pub(crate) struct Settlement {
    pub(crate) attempt: AttemptId,
    pub(crate) outcome: Outcome,
}

/// Owns the single request state slot.
///
/// Network calls and the timeout alarm run as spawned tasks and report back
/// over a channel; their results only touch state when the owner applies
/// them, and only if the settlement still belongs to the current attempt.
pub struct AnalysisController {
    transport: Option<Arc<dyn AnalysisTransport>>,
    timeout: Duration,
    status: RequestStatus,
    attempt: AttemptId,
    alarm: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<Settlement>,
    rx: mpsc::UnboundedReceiver<Settlement>,
}

impl AnalysisController {
    /// `transport` is `None` when no endpoint is configured.
    pub fn new(transport: Option<Arc<dyn AnalysisTransport>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            transport,
            timeout: ANALYSIS_TIMEOUT,
            status: RequestStatus::Idle,
            attempt: AttemptId::default(),
            alarm: None,
            tx,
            rx,
        }
    }

    pub fn status(&self) -> &RequestStatus {
        &self.status
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.status.result()
    }

    pub fn error(&self) -> Option<&ErrorKind> {
        self.status.error()
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn is_configured(&self) -> bool {
        self.transport.is_some()
    }

    pub fn endpoint(&self) -> Option<String> {
        self.transport.as_ref().map(|transport| transport.describe())
    }

    /// Starts a new attempt, superseding any attempt still in flight.
    ///
    /// Missing input or configuration fail on the spot, before anything is
    /// sent; every other failure is reported later through [`Self::status`].
    pub fn submit(
        &mut self,
        file: Option<&SelectedFile>,
        target_position: Option<&str>,
    ) -> Result<AttemptId, ErrorKind> {
        let Some(file) = file else {
            return Err(self.fail_early(ErrorKind::InputMissing));
        };
        let Some(transport) = self.transport.clone() else {
            return Err(self.fail_early(ErrorKind::ConfigurationMissing));
        };

        self.cancel_alarm();
        self.attempt = self.attempt.next();
        self.status = RequestStatus::Pending;

        let attempt = self.attempt;
        let request = AnalysisRequest::new(file.clone(), target_position);
        info!(
            %attempt,
            file = %file.name,
            endpoint = %transport.describe(),
            "analysis attempt started"
        );

        let tx = self.tx.clone();
        task::spawn(async move {
            let outcome = Outcome::Response(transport.analyze(request).await);
            let _ = tx.send(Settlement { attempt, outcome });
        });

        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.alarm = Some(task::spawn(async move {
            tokio::time::sleep(timeout).await;
            let _ = tx.send(Settlement { attempt, outcome: Outcome::AlarmFired });
        }));

        Ok(attempt)
    }

    /// Stops the alarm. An in-flight network call keeps running but its result is
    /// still subject to fencing.
    pub fn cancel(&mut self) {
        self.cancel_alarm();
    }

    /// Drops the current attempt and any result: used when the input changes.
    pub fn invalidate(&mut self) {
        self.cancel_alarm();
        if self.status.is_pending() {
            self.attempt = self.attempt.next();
        }
        self.status = RequestStatus::Idle;
    }

    /// Applies every settlement that has already arrived. Returns how many changed state.
    pub fn poll_settlements(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(settlement) = self.rx.try_recv() {
            if self.apply(settlement) {
                applied += 1;
            }
        }
        applied
    }

    /// Waits for the next settlement of any attempt and applies it.
    pub async fn next_settlement(&mut self) -> bool {
        match self.rx.recv().await {
            Some(settlement) => self.apply(settlement),
            // unreachable while `self.tx` is alive
            None => false,
        }
    }

    /// Waits until the current attempt reaches a terminal state.
    pub async fn wait_settled(&mut self) -> &RequestStatus {
        while self.status.is_pending() {
            self.next_settlement().await;
        }
        &self.status
    }

    pub(crate) fn apply(&mut self, settlement: Settlement) -> bool {
        let Settlement { attempt, outcome } = settlement;
        if attempt != self.attempt || !self.status.is_pending() {
            debug!(%attempt, current = %self.attempt, "discarding stale settlement");
            return false;
        }

        match outcome {
            Outcome::Response(Ok(result)) => {
                self.cancel_alarm();
                info!(%attempt, keywords = result.keywords.len(), "analysis succeeded");
                self.status = RequestStatus::Succeeded(result);
            }
            Outcome::Response(Err(raw)) => {
                self.cancel_alarm();
                let kind = classify(&raw);
                warn!(%attempt, error = %kind, "analysis failed");
                self.status = RequestStatus::Failed(kind);
            }
            Outcome::AlarmFired => {
                self.alarm = None;
                warn!(%attempt, timeout_secs = self.timeout.as_secs(), "analysis timed out");
                self.status = RequestStatus::Failed(ErrorKind::Timeout);
            }
        }
        true
    }

    fn fail_early(&mut self, kind: ErrorKind) -> ErrorKind {
        self.cancel_alarm();
        if self.status.is_pending() {
            self.attempt = self.attempt.next();
        }
        warn!(error = %kind, "submission rejected");
        self.status = RequestStatus::Failed(kind.clone());
        kind
    }

    fn cancel_alarm(&mut self) {
        if let Some(alarm) = self.alarm.take() {
            alarm.abort();
            debug!(attempt = %self.attempt, "timeout alarm canceled");
        }
    }

    #[cfg(test)]
    pub(crate) fn settlement_sender(&self) -> mpsc::UnboundedSender<Settlement> {
        self.tx.clone()
    }

    #[cfg(test)]
    pub(crate) fn has_alarm(&self) -> bool {
        self.alarm.is_some()
    }
}

impl Drop for AnalysisController {
    fn drop(&mut self) {
        self.cancel_alarm();
    }
}
