//! Verification dispatch gate
//!
//! `Idle -> AwaitingConfirmation -> Sending -> {Succeeded, Failed}`. Sending is
//! only reachable through an explicit confirmation of a previously requested
//! send, and a finished send never blocks the next request.

use serde_json::{Map, Value};
use statig::prelude::*;
use std::fmt;
use thiserror::Error;

use crate::services::{SendVerificationRequest, SendVerificationResponse, ServiceError};
use crate::workflow::reconcile::{ReconciledFields, ValidationError};

pub const SENDING_MESSAGE: &str = "Sending...";
pub const SEND_SUCCESS_MESSAGE: &str = "Verification email sent successfully!";
const SEND_FAILURE_FALLBACK: &str = "Unknown error";
const SEND_TRANSPORT_FAILURE: &str = "could not reach the email service";

/// A send waiting behind the confirmation gate
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub to_email: String,
    /// Reconciled fields as they were when the send was requested
    pub fields: ReconciledFields,
    pub extracted_fields: Map<String, Value>,
}

impl PendingSend {
    /// Body for the email-dispatch service: every extracted field, with the
    /// four reconciled values written over the extracted ones
    pub fn request(&self) -> SendVerificationRequest {
        SendVerificationRequest {
            to_email: self.to_email.clone(),
            fields: self.fields.overlay_onto(&self.extracted_fields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchFeedback {
    Sent { message: String },
    Failed { message: String },
}

impl DispatchFeedback {
    fn from_response(result: Result<SendVerificationResponse, ServiceError>) -> Self {
        match result {
            Ok(response) if response.success => DispatchFeedback::Sent {
                message: SEND_SUCCESS_MESSAGE.to_string(),
            },
            Ok(response) => {
                let reason = response
                    .error
                    .filter(|reason| !reason.is_empty())
                    .unwrap_or_else(|| SEND_FAILURE_FALLBACK.to_string());
                DispatchFeedback::Failed {
                    message: format!("Failed to send email: {reason}"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Verification email request did not complete");
                DispatchFeedback::Failed {
                    message: format!("Failed to send email: {SEND_TRANSPORT_FAILURE}"),
                }
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            DispatchFeedback::Sent { message } | DispatchFeedback::Failed { message } => message,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DispatchFeedback::Sent { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    Request(PendingSend),
    Cancel,
    Confirm,
    Complete(DispatchFeedback),
    DismissFeedback,
    Reset,
}

#[derive(Debug, Default)]
pub struct DispatchGate {
    pending: Option<PendingSend>,
    feedback: Option<DispatchFeedback>,
}

#[state_machine(initial = "State::idle()", state(derive(Debug, Clone, PartialEq, Eq)))]
impl DispatchGate {
    #[state]
    fn idle(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Request(pending) => self.open_gate(pending),
            _ => Handled,
        }
    }

    #[state]
    fn awaiting_confirmation(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Confirm => {
                tracing::info!(
                    to_email = ?self.pending.as_ref().map(|p| p.to_email.as_str()),
                    "Verification email confirmed"
                );
                Transition(State::sending())
            }
            DispatchEvent::Cancel | DispatchEvent::Reset => {
                let discarded = self.pending.take();
                tracing::info!(
                    to_email = ?discarded.map(|p| p.to_email),
                    "Pending verification email discarded"
                );
                Transition(State::idle())
            }
            _ => Handled,
        }
    }

    #[state]
    fn sending(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Complete(feedback) => {
                let sent = self.pending.take();
                self.feedback = Some(feedback.clone());
                tracing::info!(
                    to_email = ?sent.map(|p| p.to_email),
                    success = feedback.is_success(),
                    message = feedback.message(),
                    "Verification email finished"
                );
                if feedback.is_success() {
                    Transition(State::succeeded())
                } else {
                    Transition(State::failed())
                }
            }
            _ => Handled,
        }
    }

    #[state]
    fn succeeded(&mut self, event: &DispatchEvent) -> Outcome<State> {
        self.after_send(event)
    }

    #[state]
    fn failed(&mut self, event: &DispatchEvent) -> Outcome<State> {
        self.after_send(event)
    }
}

impl DispatchGate {
    fn open_gate(&mut self, pending: &PendingSend) -> Outcome<State> {
        self.pending = Some(pending.clone());
        self.feedback = None;
        tracing::info!(to_email = %pending.to_email, "Verification email awaiting confirmation");
        Transition(State::awaiting_confirmation())
    }

    fn after_send(&mut self, event: &DispatchEvent) -> Outcome<State> {
        match event {
            DispatchEvent::Request(pending) => self.open_gate(pending),
            DispatchEvent::DismissFeedback | DispatchEvent::Reset => {
                self.feedback = None;
                Transition(State::idle())
            }
            _ => Handled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DispatchPhase {
    Idle,
    AwaitingConfirmation,
    Sending,
    Succeeded,
    Failed,
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DispatchPhase::Idle => "idle",
            DispatchPhase::AwaitingConfirmation => "awaiting confirmation",
            DispatchPhase::Sending => "sending",
            DispatchPhase::Succeeded => "sent",
            DispatchPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("A verification email is already {0}")]
    Busy(DispatchPhase),
    #[error("No verification email is awaiting confirmation")]
    NotAwaitingConfirmation,
    #[error("No verification email is being sent")]
    NotSending,
}

/// Typed front of the dispatch state machine
pub struct DispatchController {
    machine: StateMachine<DispatchGate>,
}

impl Default for DispatchController {
    fn default() -> Self {
        Self {
            machine: DispatchGate::default().state_machine(),
        }
    }
}

impl fmt::Debug for DispatchController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchController")
            .field("phase", &self.phase())
            .field("pending", &self.pending())
            .field("feedback", &self.feedback())
            .finish()
    }
}

impl DispatchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> DispatchPhase {
        match self.machine.state() {
            State::Idle { .. } => DispatchPhase::Idle,
            State::AwaitingConfirmation { .. } => DispatchPhase::AwaitingConfirmation,
            State::Sending { .. } => DispatchPhase::Sending,
            State::Succeeded { .. } => DispatchPhase::Succeeded,
            State::Failed { .. } => DispatchPhase::Failed,
        }
    }

    pub fn pending(&self) -> Option<&PendingSend> {
        self.machine.inner().pending.as_ref()
    }

    pub fn feedback(&self) -> Option<&DispatchFeedback> {
        self.machine.inner().feedback.as_ref()
    }

    /// Status line for the current phase, if any
    pub fn status_message(&self) -> Option<&str> {
        match self.phase() {
            DispatchPhase::Sending => Some(SENDING_MESSAGE),
            _ => self.feedback().map(DispatchFeedback::message),
        }
    }

    /// `Idle -> AwaitingConfirmation`, guarded by the send validation
    pub fn request(
        &mut self,
        to_email: &str,
        fields: &ReconciledFields,
        extracted_fields: &Map<String, Value>,
    ) -> Result<PendingSend, DispatchError> {
        match self.phase() {
            DispatchPhase::AwaitingConfirmation | DispatchPhase::Sending => {
                return Err(DispatchError::Busy(self.phase()))
            }
            DispatchPhase::Idle | DispatchPhase::Succeeded | DispatchPhase::Failed => {}
        }
        fields.validate_for_send()?;

        let pending = PendingSend {
            to_email: to_email.to_string(),
            fields: fields.clone(),
            extracted_fields: extracted_fields.clone(),
        };
        self.machine.handle(&DispatchEvent::Request(pending.clone()));
        Ok(pending)
    }

    /// `AwaitingConfirmation -> Idle`, discarding the pending send
    pub fn cancel(&mut self) -> Result<(), DispatchError> {
        if self.phase() != DispatchPhase::AwaitingConfirmation {
            return Err(DispatchError::NotAwaitingConfirmation);
        }
        self.machine.handle(&DispatchEvent::Cancel);
        Ok(())
    }

    /// `AwaitingConfirmation -> Sending`, returning the body to submit
    pub fn confirm(&mut self) -> Result<SendVerificationRequest, DispatchError> {
        if self.phase() != DispatchPhase::AwaitingConfirmation {
            return Err(DispatchError::NotAwaitingConfirmation);
        }
        let request = self
            .pending()
            .map(PendingSend::request)
            .ok_or(DispatchError::NotAwaitingConfirmation)?;
        self.machine.handle(&DispatchEvent::Confirm);
        Ok(request)
    }

    /// `Sending -> Succeeded | Failed` from the dispatch service's reply
    pub fn complete(
        &mut self,
        result: Result<SendVerificationResponse, ServiceError>,
    ) -> Result<DispatchFeedback, DispatchError> {
        if self.phase() != DispatchPhase::Sending {
            return Err(DispatchError::NotSending);
        }
        let feedback = DispatchFeedback::from_response(result);
        self.machine.handle(&DispatchEvent::Complete(feedback.clone()));
        Ok(feedback)
    }

    /// Drop send feedback from a finished send
    pub fn dismiss_feedback(&mut self) {
        self.machine.handle(&DispatchEvent::DismissFeedback);
    }

    /// Return to `Idle` unless a send is in flight
    pub fn reset(&mut self) {
        self.machine.handle(&DispatchEvent::Reset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::TrackedField;
    use serde_json::json;

    fn complete_fields() -> ReconciledFields {
        ReconciledFields {
            employee_name: "Jane Doe".to_string(),
            id_no: String::new(),
            department: "Eng".to_string(),
            designation: "SWE".to_string(),
        }
    }

    fn extracted() -> Map<String, Value> {
        json!({"employee_name": "J Doe", "company_name": "Acme"})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_dispatch_happy_path() {
        let mut gate = DispatchController::new();
        assert_eq!(gate.phase(), DispatchPhase::Idle);

        gate.request("hr@acme.com", &complete_fields(), &extracted()).unwrap();
        assert_eq!(gate.phase(), DispatchPhase::AwaitingConfirmation);
        assert_eq!(gate.pending().map(|p| p.to_email.as_str()), Some("hr@acme.com"));

        let request = gate.confirm().unwrap();
        assert_eq!(gate.phase(), DispatchPhase::Sending);
        assert_eq!(gate.status_message(), Some(SENDING_MESSAGE));
        assert_eq!(request.to_email, "hr@acme.com");
        assert_eq!(request.fields["employee_name"], json!("Jane Doe"));
        assert_eq!(request.fields["company_name"], json!("Acme"));

        let feedback = gate
            .complete(Ok(SendVerificationResponse { success: true, error: None }))
            .unwrap();
        assert!(feedback.is_success());
        assert_eq!(gate.phase(), DispatchPhase::Succeeded);
        assert_eq!(gate.status_message(), Some(SEND_SUCCESS_MESSAGE));
        assert!(gate.pending().is_none());
    }

    #[test]
    fn test_confirm_without_request_is_rejected() {
        let mut gate = DispatchController::new();
        assert_eq!(gate.confirm(), Err(DispatchError::NotAwaitingConfirmation));
        assert_eq!(gate.phase(), DispatchPhase::Idle);
    }

    #[test]
    fn test_cancel_clears_pending_send() {
        let mut gate = DispatchController::new();
        gate.request("hr@acme.com", &complete_fields(), &extracted()).unwrap();

        gate.cancel().unwrap();
        assert_eq!(gate.phase(), DispatchPhase::Idle);
        assert!(gate.pending().is_none());
        assert_eq!(gate.confirm(), Err(DispatchError::NotAwaitingConfirmation));
    }

    #[test]
    fn test_validation_blocks_request_with_reason() {
        let mut gate = DispatchController::new();
        let mut fields = complete_fields();
        fields.set(TrackedField::Designation, "");

        let err = gate.request("hr@acme.com", &fields, &extracted()).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Validation(ValidationError::MissingFields {
                fields: vec![TrackedField::Designation]
            })
        );
        assert_eq!(gate.phase(), DispatchPhase::Idle);
    }

    #[test]
    fn test_second_request_while_awaiting_is_busy() {
        let mut gate = DispatchController::new();
        gate.request("hr@acme.com", &complete_fields(), &extracted()).unwrap();

        let err = gate.request("jobs@acme.com", &complete_fields(), &extracted()).unwrap_err();
        assert_eq!(err, DispatchError::Busy(DispatchPhase::AwaitingConfirmation));
        assert_eq!(gate.pending().map(|p| p.to_email.as_str()), Some("hr@acme.com"));
    }

    #[test]
    fn test_failure_reports_reason_or_fallback() {
        let mut gate = DispatchController::new();
        gate.request("hr@acme.com", &complete_fields(), &extracted()).unwrap();
        gate.confirm().unwrap();
        let feedback = gate
            .complete(Ok(SendVerificationResponse {
                success: false,
                error: Some("SMTP refused".to_string()),
            }))
            .unwrap();
        assert_eq!(feedback.message(), "Failed to send email: SMTP refused");
        assert_eq!(gate.phase(), DispatchPhase::Failed);

        // failed is not terminal
        gate.request("hr@acme.com", &complete_fields(), &extracted()).unwrap();
        gate.confirm().unwrap();
        let feedback = gate.complete(Ok(SendVerificationResponse::default())).unwrap();
        assert_eq!(feedback.message(), "Failed to send email: Unknown error");
    }

    #[test]
    fn test_transport_failure_becomes_failed_feedback() {
        let mut gate = DispatchController::new();
        gate.request("hr@acme.com", &complete_fields(), &extracted()).unwrap();
        gate.confirm().unwrap();

        let feedback = gate
            .complete(Err(ServiceError::Transport {
                operation: "send_verification_email",
                message: "connection reset".to_string(),
            }))
            .unwrap();
        assert!(!feedback.is_success());
        assert_eq!(gate.phase(), DispatchPhase::Failed);
    }

    #[test]
    fn test_complete_outside_sending_is_rejected() {
        let mut gate = DispatchController::new();
        let result = gate.complete(Ok(SendVerificationResponse { success: true, error: None }));
        assert_eq!(result, Err(DispatchError::NotSending));
    }

    #[test]
    fn test_reset_does_not_interrupt_sending() {
        let mut gate = DispatchController::new();
        gate.request("hr@acme.com", &complete_fields(), &extracted()).unwrap();
        gate.confirm().unwrap();

        gate.reset();
        assert_eq!(gate.phase(), DispatchPhase::Sending);

        gate.complete(Ok(SendVerificationResponse { success: true, error: None })).unwrap();
        gate.dismiss_feedback();
        assert_eq!(gate.phase(), DispatchPhase::Idle);
        assert!(gate.status_message().is_none());
    }
}
