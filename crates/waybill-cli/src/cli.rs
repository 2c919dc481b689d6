//! Command handlers: thin glue between parsed arguments, the workflow
//! client, and the terminal renderer. No business logic lives here.

use anyhow::{Context, Result};
use waybill_core::models::{
    EffectiveStatus, PackageFilter, Priority, ReturnStatus, SortBy, SubmitPackage,
};
use waybill_core::{ManagerList, OperationStatus, PackageDetails, PackageList, WorkflowClient};

use crate::args::{ListArgs, ReturnArgs, SubmitArgs};
use crate::renderer::TerminalRenderer;

pub struct Cli {
    client: WorkflowClient,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(client: WorkflowClient, renderer: TerminalRenderer) -> Self {
        Self { client, renderer }
    }

    pub async fn submit(&self, args: SubmitArgs) -> Result<()> {
        let priority: Priority = args
            .priority
            .parse()
            .map_err(anyhow::Error::msg)
            .context("invalid --priority")?;
        let return_date = args
            .return_date
            .as_deref()
            .map(str::parse)
            .transpose()
            .context("invalid --return-date, expected YYYY-MM-DD")?;

        let request = SubmitPackage {
            recipient: args.recipient,
            description: args.description,
            to_address: args.address,
            notes: args.notes,
            priority,
            project_code: args.project_code,
            assigned_to_manager: args.manager,
            is_returnable: args.returnable,
            return_date,
            ..Default::default()
        };

        let package = self.client.submit_package(&request).await?;
        self.renderer.render(&format!(
            "{}{}",
            OperationStatus::success(format!(
                "Submitted package {} (gate pass {})",
                package.id,
                package.gate_pass_serial_number.as_deref().unwrap_or("pending"),
            )),
            PackageDetails(&package),
        ))
    }

    pub async fn approve(&self, id: &str, notes: Option<String>) -> Result<()> {
        let package = self
            .client
            .update_status(id, EffectiveStatus::Approved, notes)
            .await?;
        self.render_outcome("Approved", &package)
    }

    pub async fn reject(&self, id: &str, reason: String) -> Result<()> {
        let package = self
            .client
            .update_status(id, EffectiveStatus::Rejected, Some(reason))
            .await?;
        self.render_outcome("Rejected", &package)
    }

    pub async fn resubmit(&self, id: &str) -> Result<()> {
        let package = self
            .client
            .update_status(id, EffectiveStatus::Submitted, None)
            .await?;
        self.render_outcome("Resubmitted", &package)
    }

    pub async fn dispatch(&self, id: &str, notes: Option<String>) -> Result<()> {
        let package = self
            .client
            .update_status(id, EffectiveStatus::Dispatched, notes)
            .await?;
        self.render_outcome("Dispatched", &package)
    }

    pub async fn record_return(&self, args: ReturnArgs) -> Result<()> {
        let when = args
            .when
            .as_deref()
            .map(str::parse)
            .transpose()
            .context("invalid --when, expected an RFC 3339 timestamp")?;
        let package = self
            .client
            .update_return_status(
                &args.id,
                ReturnStatus::Returned,
                Some(args.returned_by),
                args.notes,
                when,
            )
            .await?;
        self.render_outcome("Recorded return of", &package)
    }

    pub async fn assign(&self, id: &str, manager: &str) -> Result<()> {
        let package = self.client.assign_to_manager(id, manager).await?;
        self.render_outcome("Assigned", &package)
    }

    pub fn list(&self, args: &ListArgs) -> Result<()> {
        if args.mine {
            let assigned = self.client.assigned_packages();
            return self
                .renderer
                .render(&PackageList::with_title(&assigned, "Assigned to you").to_string());
        }

        let filter = PackageFilter {
            status: args
                .status
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("invalid --status")?,
            manager_id: args.manager.clone(),
            priority: args
                .priority
                .as_deref()
                .map(str::parse)
                .transpose()
                .map_err(anyhow::Error::msg)
                .context("invalid --priority")?,
            search: args.search.clone(),
            sort_by: args.sort.as_deref().map(parse_sort).transpose()?,
            ..Default::default()
        };

        let packages = self.client.find(&filter);
        self.renderer
            .render(&PackageList::with_title(&packages, "Packages").to_string())
    }

    pub fn show(&self, id: &str) -> Result<()> {
        match self.client.get_by_id(id) {
            Some(package) => self.renderer.render(&PackageDetails(&package).to_string()),
            None => self
                .renderer
                .render(&OperationStatus::failure(format!("No package with id {id}")).to_string()),
        }
    }

    pub async fn managers(&self) -> Result<()> {
        let managers = self.client.fetch_managers().await?;
        self.renderer.render(&ManagerList(&managers).to_string())
    }

    fn render_outcome(&self, verb: &str, package: &waybill_core::Package) -> Result<()> {
        self.renderer.render(&format!(
            "{}{}",
            OperationStatus::success(format!(
                "{verb} package {} — now {}",
                package.id,
                package.effective_status()
            )),
            PackageDetails(package),
        ))
    }
}

fn parse_sort(raw: &str) -> Result<SortBy> {
    match raw.to_lowercase().as_str() {
        "date" => Ok(SortBy::Date),
        "priority" => Ok(SortBy::Priority),
        "recipient" => Ok(SortBy::Recipient),
        other => anyhow::bail!("invalid --sort '{other}', expected date, priority, or recipient"),
    }
}
