use anyhow::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::commands::export::ExportCommand;
use crate::cli::commands::upload::UploadCommand;
use crate::cli::render::{
    company_lines, confirmation_lines, history_lines, print_lines, snapshot_lines,
};
use crate::config::VerifierConfig;
use crate::extraction::TrackedField;
use crate::history::HistoryManager;
use crate::services::ReportFormat;
use crate::workflow::{ContactLookup, RunOutcome, VerificationCoordinator};

/// One line of input in the interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Upload(PathBuf),
    Show,
    Raw,
    Set(TrackedField, String),
    CrossCheck,
    Contacts,
    Send(String),
    Confirm,
    Cancel,
    Export(ReportFormat),
    History,
    Help,
    Quit,
    Blank,
}

impl SessionInput {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command.to_ascii_lowercase().as_str() {
            "" => Ok(SessionInput::Blank),
            "upload" if !rest.is_empty() => Ok(SessionInput::Upload(PathBuf::from(rest))),
            "upload" => Err("Usage: upload <file>".to_string()),
            "show" => Ok(SessionInput::Show),
            "raw" => Ok(SessionInput::Raw),
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(field, value)| (field, value.trim()))
                    .unwrap_or((rest, ""));
                if field.is_empty() {
                    return Err("Usage: set <field> <value>".to_string());
                }
                let field = field.parse::<TrackedField>().map_err(|e| e.to_string())?;
                Ok(SessionInput::Set(field, value.to_string()))
            }
            "check" | "crosscheck" => Ok(SessionInput::CrossCheck),
            "contacts" => Ok(SessionInput::Contacts),
            "send" if !rest.is_empty() => Ok(SessionInput::Send(rest.to_string())),
            "send" => Err("Usage: send <email>".to_string()),
            "confirm" | "yes" => Ok(SessionInput::Confirm),
            "cancel" | "no" => Ok(SessionInput::Cancel),
            "export" => {
                let format = if rest.is_empty() { "pdf" } else { rest };
                Ok(SessionInput::Export(format.parse()?))
            }
            "history" => Ok(SessionInput::History),
            "help" | "?" => Ok(SessionInput::Help),
            "quit" | "exit" => Ok(SessionInput::Quit),
            other => Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
        }
    }
}

fn print_help() {
    println!("💬 Commands:");
    println!("   upload <file>          Upload a certificate");
    println!("   show | raw             Show the current extraction (raw adds OCR text)");
    println!("   set <field> <value>    Edit name, id, department or designation");
    println!("   check                  Cross-check the company");
    println!("   contacts               Find contacts for the official website");
    println!("   send <email>           Prepare a verification email");
    println!("   confirm | cancel       Answer the confirmation prompt");
    println!("   export [pdf|csv]       Save a verification report");
    println!("   history                List sent verifications");
    println!("   quit                   Leave the session");
}

pub struct SessionCommand;

impl SessionCommand {
    pub async fn execute(&self, config: &VerifierConfig) -> Result<()> {
        let coordinator = super::build_coordinator(config).await?;
        println!("💬 EMPLOYMENT VERIFICATION SESSION");
        println!("==================================");
        print_lines(&snapshot_lines(&coordinator.snapshot().await, false));
        println!();
        print_help();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();
        loop {
            stdout.write_all(b"\n> ").await?;
            stdout.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };

            match SessionInput::parse(&line) {
                Ok(SessionInput::Quit) => break,
                Ok(input) => {
                    if let Err(e) = handle(&coordinator, input).await {
                        println!("❌ {e}");
                    }
                }
                Err(message) => println!("❓ {message}"),
            }
        }

        println!("👋 Session closed");
        Ok(())
    }
}

async fn handle(coordinator: &VerificationCoordinator, input: SessionInput) -> Result<()> {
    match input {
        SessionInput::Upload(path) => {
            UploadCommand::new(path).run(coordinator).await?;
        }
        SessionInput::Show => print_lines(&snapshot_lines(&coordinator.snapshot().await, false)),
        SessionInput::Raw => print_lines(&snapshot_lines(&coordinator.snapshot().await, true)),
        SessionInput::Set(field, value) => {
            coordinator.edit_field(field, &value).await;
            let annotation = coordinator
                .annotations()
                .await
                .into_iter()
                .find(|annotation| annotation.field == field);
            if let Some(annotation) = annotation {
                println!("✏️  {}: {} ({})", field.label(), annotation.value, annotation.badge);
            }
        }
        SessionInput::CrossCheck => {
            println!("🔄 Cross-checking company...");
            match coordinator.cross_check().await {
                RunOutcome::Applied(company) => print_lines(&company_lines(&company)),
                RunOutcome::Skipped(reason) => println!("⏭️  Cross-check skipped: {reason}"),
                RunOutcome::Superseded => println!("⏭️  Superseded by a newer cross-check"),
            }
        }
        SessionInput::Contacts => match coordinator.find_contacts().await {
            RunOutcome::Applied(_) => {
                print_lines(&company_lines(&coordinator.snapshot().await.company));
                if let Some(first) = discovered_emails(coordinator).await.first() {
                    println!("💡 Type 'send {first}' to request verification");
                }
            }
            RunOutcome::Skipped(reason) => println!("⏭️  Contact discovery unavailable: {reason}"),
            RunOutcome::Superseded => println!("⏭️  Superseded by a newer lookup"),
        },
        SessionInput::Send(email) => {
            // contact buttons stay disabled until every tracked field is present
            if let Err(reason) = coordinator.contact_action_availability().await {
                println!("🚫 {reason}");
                return Ok(());
            }
            let pending = coordinator.request_send(&email).await?;
            let snapshot = coordinator.snapshot().await;
            let extraction = snapshot.extraction.as_ref().map(|loaded| &loaded.result);
            print_lines(&confirmation_lines(&pending, extraction));
        }
        SessionInput::Confirm => {
            println!("✉️  Sending...");
            let feedback = coordinator.confirm_send().await?;
            if feedback.is_success() {
                println!("✅ {}", feedback.message());
            } else {
                println!("❌ {}", feedback.message());
            }
        }
        SessionInput::Cancel => {
            coordinator.cancel_send().await?;
            println!("↩️  Verification email cancelled");
        }
        SessionInput::Export(format) => {
            ExportCommand::new(format, None).run(coordinator).await?;
        }
        SessionInput::History => {
            let mut manager = HistoryManager::new(coordinator.services());
            let _ = manager.refresh().await;
            print_lines(&history_lines(manager.view()));
        }
        SessionInput::Help => print_help(),
        SessionInput::Blank | SessionInput::Quit => {}
    }
    Ok(())
}

/// Emails the session can offer as send targets
async fn discovered_emails(coordinator: &VerificationCoordinator) -> Vec<String> {
    coordinator
        .snapshot()
        .await
        .company
        .contacts()
        .and_then(ContactLookup::found)
        .map(|contacts| contacts.emails.clone())
        .unwrap_or_default()
}
