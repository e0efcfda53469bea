//! Contact discovery for a resolved company website

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::observability::service_metrics;
use crate::services::{Contacts, VerificationServices};
use crate::workflow::sequence::RequestSequencer;
use crate::workflow::state::{RunOutcome, SkipReason, WorkflowState};

pub const CONTACTS_FAILED_MESSAGE: &str = "Failed to fetch company contacts.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContactLookup {
    #[default]
    NotRequested,
    Searching,
    /// Empty lists are a valid "none found" result
    Found(Contacts),
    Failed { reason: String },
}

impl ContactLookup {
    pub fn found(&self) -> Option<&Contacts> {
        match self {
            ContactLookup::Found(contacts) => Some(contacts),
            _ => None,
        }
    }
}

pub struct ContactsOrchestrator {
    services: Arc<dyn VerificationServices>,
    sequencer: RequestSequencer,
}

impl ContactsOrchestrator {
    pub fn new(services: Arc<dyn VerificationServices>) -> Self {
        Self {
            services,
            sequencer: RequestSequencer::new(),
        }
    }

    pub fn invalidate(&self) {
        self.sequencer.invalidate();
    }

    /// Look up contacts for the currently resolved website.
    ///
    /// No request is made unless the company check resolved to a website.
    pub async fn run(&self, state: &Mutex<WorkflowState>) -> RunOutcome<ContactLookup> {
        let (ticket, website) = {
            let mut state = state.lock().await;
            let Some(website) = state.company.website().map(str::to_string) else {
                info!("Contact discovery skipped: no official website");
                return RunOutcome::Skipped(SkipReason::NoWebsite);
            };
            let ticket = self.sequencer.issue();
            if let Some(contacts) = state.company.contacts_mut() {
                *contacts = ContactLookup::Searching;
            }
            state.dispatch.reset();
            (ticket, website)
        };

        info!(website = %website, ticket = ticket.number(), "Looking up company contacts");
        let result = self.services.company_contacts(&website).await;

        let mut state = state.lock().await;
        if !self.sequencer.is_current(ticket) || state.company.website() != Some(website.as_str()) {
            service_metrics().record_stale_discard("get_company_contacts");
            return RunOutcome::Superseded;
        }

        let lookup = match result {
            Ok(contacts) => {
                info!(
                    website = %website,
                    emails = contacts.emails.len(),
                    phones = contacts.phones.len(),
                    "Company contacts found"
                );
                ContactLookup::Found(contacts)
            }
            Err(e) => {
                tracing::warn!(website = %website, error = %e, "Contact discovery did not complete");
                ContactLookup::Failed {
                    reason: CONTACTS_FAILED_MESSAGE.to_string(),
                }
            }
        };
        if let Some(contacts) = state.company.contacts_mut() {
            *contacts = lookup.clone();
        }
        RunOutcome::Applied(lookup)
    }
}
