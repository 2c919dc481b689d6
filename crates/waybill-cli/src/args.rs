use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Main command-line interface for the Waybill package dispatch tool
///
/// Waybill tracks physical packages through a multi-party
/// approval-and-dispatch workflow: employees submit packages, managers
/// approve or reject them, security dispatches them, and returnable
/// packages are recorded when they come back through the gate. The CLI
/// drives the workflow against a local JSON-backed substrate, acting as the
/// user given by `--actor`/`--role`.
#[derive(Parser)]
#[command(version, about, name = "wb")]
pub struct Args {
    /// Path to the JSON state file holding the local package register.
    /// Read on startup and written back after every mutation.
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Id of the acting user
    #[arg(long, global = true, default_value = "E1")]
    pub actor: String,

    /// Role of the acting user (employee, manager, security, admin,
    /// logistics)
    #[arg(long, global = true, default_value = "employee")]
    pub role: String,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Waybill CLI
///
/// Each command corresponds to one workflow operation; with no command the
/// CLI lists every package it knows about.
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a new package
    Submit(SubmitArgs),

    /// Approve a submitted package (manager)
    Approve {
        /// Package id
        id: String,

        /// Note appended to the package
        #[arg(long)]
        notes: Option<String>,
    },

    /// Reject a submitted package (manager)
    Reject {
        /// Package id
        id: String,

        /// Why the package is rejected
        #[arg(long)]
        reason: String,
    },

    /// Resubmit a rejected package (employee)
    Resubmit {
        /// Package id
        id: String,
    },

    /// Dispatch an approved package (security)
    Dispatch {
        /// Package id
        id: String,

        /// Note appended to the package
        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a returnable package coming back (security)
    #[command(name = "return")]
    Return(ReturnArgs),

    /// Reassign a package to another manager
    Assign {
        /// Package id
        id: String,

        /// Manager id to assign to
        manager: String,
    },

    /// List packages, optionally filtered
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one package in full
    Show {
        /// Package id
        id: String,
    },

    /// List the manager directory
    Managers,
}

/// Arguments for submitting a new package
#[derive(ClapArgs)]
pub struct SubmitArgs {
    /// Who the package goes to
    #[arg(long)]
    pub recipient: String,

    /// What is inside
    #[arg(long)]
    pub description: Option<String>,

    /// Full delivery address
    #[arg(long)]
    pub address: Option<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Handling priority (low, medium, high)
    #[arg(long, default_value = "medium")]
    pub priority: String,

    /// Manager to route the approval to
    #[arg(long)]
    pub manager: Option<String>,

    /// Project code the package belongs to
    #[arg(long)]
    pub project_code: Option<String>,

    /// Mark the package as returnable
    #[arg(long)]
    pub returnable: bool,

    /// Expected return date (YYYY-MM-DD) for a returnable package
    #[arg(long)]
    pub return_date: Option<String>,
}

/// Arguments for recording a return
#[derive(ClapArgs)]
pub struct ReturnArgs {
    /// Package id
    pub id: String,

    /// Who brought the package back
    #[arg(long)]
    pub returned_by: String,

    /// Condition notes
    #[arg(long)]
    pub notes: Option<String>,

    /// When the return happened (RFC 3339); defaults to now
    #[arg(long)]
    pub when: Option<String>,
}

/// Arguments for listing packages
#[derive(ClapArgs, Default)]
pub struct ListArgs {
    /// Filter by logical status (submitted, approved, rejected,
    /// dispatched, returned)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by assigned manager id
    #[arg(long)]
    pub manager: Option<String>,

    /// Filter by priority (low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,

    /// Free-text search over tracking number, recipient, address, and notes
    #[arg(long)]
    pub search: Option<String>,

    /// Sort by "date", "priority", or "recipient"
    #[arg(long)]
    pub sort: Option<String>,

    /// Only the packages assigned to the acting manager
    #[arg(long)]
    pub mine: bool,
}
