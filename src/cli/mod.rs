use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::history::VerificationStatus;
use crate::services::ReportFormat;

pub mod commands;
pub mod render;

#[derive(Parser)]
#[command(name = "employment-verifier")]
#[command(about = "Employment certificate verification workflow")]
#[command(long_about = "Uploads employment certificates for extraction, lets you review and correct \
                       the extracted fields, cross-checks the issuing company and emails its HR contact \
                       for verification. Start with 'employment-verifier upload <file>'.")]
pub struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload a certificate (image or PDF) for extraction
    Upload {
        /// Certificate file to upload
        file: PathBuf,
    },
    /// Show the current extraction and reconciled fields
    Show {
        /// Include the full OCR text
        #[arg(long, help = "Print the raw OCR text below the summary")]
        raw_text: bool,
    },
    /// Export the current extraction as a verification report
    Export {
        /// Report format
        #[arg(long, value_enum, default_value = "pdf")]
        format: ReportFormat,
        /// Output file path (defaults to verification_report.<format>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Interactive review, cross-check and dispatch session
    Session,
    /// Inspect and update dispatched verification requests
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List all verification records
    List,
    /// Update the status and HR reply of one record
    Update {
        /// Record id
        id: u64,
        /// New status; nothing is sent when omitted
        #[arg(long, value_enum)]
        status: Option<VerificationStatus>,
        /// HR reply to store with the status
        #[arg(long, default_value = "")]
        hr_reply: String,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the effective configuration to employment-verifier.toml
    Init {
        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}
