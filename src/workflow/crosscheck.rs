//! Company cross-check
//!
//! Resolves the extracted company name to an official website. A missing
//! website is a soft outcome carrying the collaborator's warning or error.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::observability::service_metrics;
use crate::services::{CrossCheckResult, ServiceError, VerificationServices};
use crate::workflow::contacts::ContactLookup;
use crate::workflow::sequence::RequestSequencer;
use crate::workflow::state::{RunOutcome, SkipReason, WorkflowState};

pub const NO_WEBSITE_MESSAGE: &str = "No official website found.";
pub const CROSSCHECK_FAILED_MESSAGE: &str = "Company cross-check failed.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CompanyCheck {
    #[default]
    NotStarted,
    Checking,
    /// Collaborator answered without a website
    NotFound { message: String },
    /// The request itself did not complete
    Unresolved { reason: String },
    Resolved {
        website: String,
        contacts: ContactLookup,
    },
}

impl CompanyCheck {
    pub fn from_response(result: Result<CrossCheckResult, ServiceError>) -> Self {
        match result {
            Ok(CrossCheckResult {
                official_website: Some(website),
                ..
            }) if !website.trim().is_empty() => CompanyCheck::Resolved {
                website,
                contacts: ContactLookup::NotRequested,
            },
            Ok(response) => {
                let message = [response.warning, response.error]
                    .into_iter()
                    .flatten()
                    .find(|message| !message.is_empty())
                    .unwrap_or_else(|| NO_WEBSITE_MESSAGE.to_string());
                CompanyCheck::NotFound { message }
            }
            Err(e) => {
                warn!(error = %e, "Company cross-check did not complete");
                CompanyCheck::Unresolved {
                    reason: CROSSCHECK_FAILED_MESSAGE.to_string(),
                }
            }
        }
    }

    pub fn website(&self) -> Option<&str> {
        match self {
            CompanyCheck::Resolved { website, .. } => Some(website),
            _ => None,
        }
    }

    pub fn contacts(&self) -> Option<&ContactLookup> {
        match self {
            CompanyCheck::Resolved { contacts, .. } => Some(contacts),
            _ => None,
        }
    }

    pub fn contacts_mut(&mut self) -> Option<&mut ContactLookup> {
        match self {
            CompanyCheck::Resolved { contacts, .. } => Some(contacts),
            _ => None,
        }
    }
}

pub struct CrossCheckOrchestrator {
    services: Arc<dyn VerificationServices>,
    sequencer: RequestSequencer,
}

impl CrossCheckOrchestrator {
    pub fn new(services: Arc<dyn VerificationServices>) -> Self {
        Self {
            services,
            sequencer: RequestSequencer::new(),
        }
    }

    /// Drop interest in any in-flight cross-check
    pub fn invalidate(&self) {
        self.sequencer.invalidate();
    }

    pub async fn run(&self, state: &Mutex<WorkflowState>) -> RunOutcome<CompanyCheck> {
        let (ticket, company_name) = {
            let mut state = state.lock().await;
            if state.current().is_none() {
                info!("Cross-check skipped: no certificate uploaded");
                return RunOutcome::Skipped(SkipReason::NoExtraction);
            }
            let Some(company_name) = state.company_name() else {
                info!("Cross-check skipped: no company name extracted");
                return RunOutcome::Skipped(SkipReason::NoCompanyName);
            };
            let ticket = self.sequencer.issue();
            state.company = CompanyCheck::Checking;
            state.dispatch.reset();
            (ticket, company_name)
        };

        info!(company = %company_name, ticket = ticket.number(), "Cross-checking company");
        let result = self.services.crosscheck_company(&company_name).await;

        let mut state = state.lock().await;
        if !self.sequencer.is_current(ticket) {
            service_metrics().record_stale_discard("crosscheck_company");
            return RunOutcome::Superseded;
        }

        let check = CompanyCheck::from_response(result);
        match &check {
            CompanyCheck::Resolved { website, .. } => {
                info!(company = %company_name, website = %website, "Company resolved")
            }
            other => info!(company = %company_name, outcome = ?other, "Company not resolved"),
        }
        state.company = check.clone();
        RunOutcome::Applied(check)
    }
}
