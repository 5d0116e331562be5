//! Command handlers
//!
//! [`Cli`] owns the database manager for the lifetime of one invocation,
//! runs the requested operation through [`Crm`] and hands the result to the
//! renderer.

use anyhow::{bail, Result};
use estate_core::{
    display::{CustomerList, Operation, OperationResult, ViewingList},
    params::{Id, ListCustomers, ListViewingRecords},
    Crm, CrmError, DatabaseManager,
};
use log::debug;
use serde_json::json;

use crate::{
    args::{CustomerCommands, ViewingCommands},
    renderer::TerminalRenderer,
};

pub struct Cli {
    db: DatabaseManager,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(db: DatabaseManager, renderer: TerminalRenderer) -> Self {
        Self { db, renderer }
    }

    fn crm(&self) -> Crm<'_> {
        Crm::new(&self.db)
    }

    pub async fn handle_customer_command(&self, command: CustomerCommands) -> Result<()> {
        match command {
            CustomerCommands::Add(args) => {
                let customer = self.crm().create_customer(&args.into()).await?;
                self.confirm(Operation::Created, "customer", customer.id, &customer)
            }
            CustomerCommands::List(args) => self.list_customers(&args.into()).await,
            CustomerCommands::Show(args) => {
                let Id { id } = args.into();
                let customer = self
                    .crm()
                    .get_customer(id)
                    .await?
                    .ok_or(CrmError::NotFound {
                        entity: "Customer",
                        id,
                    })?;
                self.renderer.emit(&customer.to_string(), &customer)
            }
            CustomerCommands::Update(args) => {
                let (Id { id }, data) = args.into_params();
                if data.is_empty() {
                    bail!("Nothing to update: pass at least one field to change");
                }
                let customer = self.crm().update_customer(id, &data).await?;
                self.confirm(Operation::Updated, "customer", id, &customer)
            }
            CustomerCommands::Delete(args) => {
                let Id { id } = args.into();
                let customer = self.crm().delete_customer(id).await?;
                self.confirm(Operation::Deleted, "customer", id, &customer)
            }
        }
    }

    pub async fn handle_viewing_command(&self, command: ViewingCommands) -> Result<()> {
        match command {
            ViewingCommands::Add(args) => {
                let record = self.crm().create_viewing_record(&args.into()).await?;
                self.confirm(Operation::Created, "viewing record", record.id, &record)
            }
            ViewingCommands::List(args) => {
                let filter: ListViewingRecords = args.into();
                let records = self.crm().list_viewing_records(&filter).await?;
                debug!("Listed {} viewing record(s)", records.len());
                self.renderer
                    .emit(&ViewingList(&records).to_string(), &records)
            }
            ViewingCommands::Show(args) => {
                let Id { id } = args.into();
                let record = self
                    .crm()
                    .get_viewing_record(id)
                    .await?
                    .ok_or(CrmError::NotFound {
                        entity: "Viewing record",
                        id,
                    })?;
                self.renderer.emit(&record.to_string(), &record)
            }
            ViewingCommands::Update(args) => {
                let (Id { id }, data) = args.into_params();
                if data.is_empty() {
                    bail!("Nothing to update: pass at least one field to change");
                }
                let record = self.crm().update_viewing_record(id, &data).await?;
                self.confirm(Operation::Updated, "viewing record", id, &record)
            }
            ViewingCommands::Delete(args) => {
                let Id { id } = args.into();
                let record = self.crm().delete_viewing_record(id).await?;
                self.confirm(Operation::Deleted, "viewing record", id, &record)
            }
        }
    }

    pub async fn list_customers(&self, filter: &ListCustomers) -> Result<()> {
        let customers = self.crm().list_customers(filter).await?;
        debug!("Listed {} customer(s)", customers.len());
        self.renderer
            .emit(&CustomerList(&customers).to_string(), &customers)
    }

    pub async fn statistics(&self) -> Result<()> {
        let stats = self.crm().statistics().await?;
        self.renderer.emit(
            &stats.to_string(),
            &json!({
                "totalCustomers": stats.total_customers,
                "customersByStatus": stats.customers_by_status,
                "totalViewings": stats.total_viewings,
                "viewingsByStatus": stats.viewings_by_status,
                "interestedViewings": stats.interested_viewings,
                "totalCommission": stats.total_commission,
                "dealCommission": stats.deal_commission,
                "dealRate": stats.deal_rate(),
            }),
        )
    }

    /// Reports reachability and pool occupancy. Fails when the database is
    /// unreachable so scripts can rely on the exit status.
    pub async fn health(&self) -> Result<()> {
        let healthy = self.db.health_check().await;
        let status = self.db.pool_status();
        let markdown = format!(
            "# Health\n\n- Database: {}\n- Connections: {} in use, {} idle, {} max\n",
            if healthy { "ok" } else { "unreachable" },
            status.in_use,
            status.idle,
            status.max
        );
        self.renderer.emit(
            &markdown,
            &json!({
                "healthy": healthy,
                "pool": { "max": status.max, "idle": status.idle, "inUse": status.in_use },
            }),
        )?;
        if !healthy {
            bail!(CrmError::connection("Database health check failed"));
        }
        Ok(())
    }

    fn confirm<T>(
        &self,
        operation: Operation,
        kind: &'static str,
        id: u64,
        resource: &T,
    ) -> Result<()>
    where
        T: std::fmt::Display + serde::Serialize,
    {
        let markdown = OperationResult {
            operation,
            kind,
            id,
            resource,
        }
        .to_string();
        self.renderer.emit(&markdown, resource)
    }

    pub fn shutdown(&self) {
        self.db.shutdown();
    }
}
