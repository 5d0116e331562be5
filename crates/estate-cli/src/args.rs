//! Command-line argument definitions using clap
//!
//! Each subcommand's arguments live in a clap struct that converts into the
//! matching core parameter type, keeping clap attributes out of
//! `estate-core`:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Crm
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use estate_core::{
    params::{CustomerData, Id, ListCustomers, ListViewingRecords, ViewingRecordData},
    ViewingFeedback,
};

/// Customer and property-viewing records for real-estate agents
///
/// Stores customers and the viewings arranged for them in a local SQLite
/// database and reports pipeline statistics.
#[derive(Parser)]
#[command(version, about, name = "estate")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/estate/estate.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Maximum number of simultaneously open database connections
    #[arg(long, global = true, default_value_t = 5)]
    pub max_connections: usize,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print results as JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage customers
    #[command(alias = "c")]
    Customer {
        #[command(subcommand)]
        command: CustomerCommands,
    },
    /// Manage viewing records
    #[command(alias = "v")]
    Viewing {
        #[command(subcommand)]
        command: ViewingCommands,
    },
    /// Show customer and viewing statistics
    Stats,
    /// Check that the database is reachable
    Health,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Register a new customer
    #[command(alias = "a")]
    Add(AddCustomerArgs),
    /// List customers
    #[command(aliases = ["l", "ls"])]
    List(ListCustomersArgs),
    /// Show details of a customer
    #[command(alias = "s")]
    Show(IdArgs),
    /// Change a customer's details
    #[command(alias = "u")]
    Update(UpdateCustomerArgs),
    /// Delete a customer and their viewing records
    #[command(aliases = ["d", "rm"])]
    Delete(IdArgs),
}

#[derive(Subcommand)]
pub enum ViewingCommands {
    /// Record a viewing for a customer
    #[command(alias = "a")]
    Add(AddViewingArgs),
    /// List viewing records
    #[command(aliases = ["l", "ls"])]
    List(ListViewingsArgs),
    /// Show details of a viewing record
    #[command(alias = "s")]
    Show(IdArgs),
    /// Change a viewing record
    #[command(alias = "u")]
    Update(UpdateViewingArgs),
    /// Delete a viewing record
    #[command(aliases = ["d", "rm"])]
    Delete(IdArgs),
}

#[derive(ClapArgs)]
pub struct IdArgs {
    #[arg(help = "Unique identifier of the record")]
    pub id: u64,
}

impl From<IdArgs> for Id {
    fn from(val: IdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Customer fields shared by `add` and `update`
#[derive(ClapArgs)]
pub struct CustomerFields {
    #[arg(short, long, help = "Residential community the customer is interested in")]
    pub community: Option<String>,
    #[arg(
        short,
        long,
        help = "Status code: 1 new, 2 following up, 3 viewed, 4 closed, 5 lost"
    )]
    pub status: Option<i64>,
    #[arg(short, long, help = "Free-form notes")]
    pub remark: Option<String>,
}

#[derive(ClapArgs)]
pub struct AddCustomerArgs {
    /// Customer name
    pub name: String,
    /// Mainland mobile number, 11 digits starting with 1
    pub phone: String,
    #[command(flatten)]
    pub fields: CustomerFields,
}

impl From<AddCustomerArgs> for CustomerData {
    fn from(val: AddCustomerArgs) -> Self {
        CustomerData {
            name: Some(val.name),
            phone: Some(val.phone),
            community: val.fields.community,
            status: val.fields.status,
            remark: val.fields.remark,
        }
    }
}

#[derive(ClapArgs)]
pub struct UpdateCustomerArgs {
    #[arg(help = "Unique identifier of the customer to update")]
    pub id: u64,
    #[arg(short, long, help = "New name")]
    pub name: Option<String>,
    #[arg(short, long, help = "New mobile number")]
    pub phone: Option<String>,
    #[command(flatten)]
    pub fields: CustomerFields,
}

impl UpdateCustomerArgs {
    pub fn into_params(self) -> (Id, CustomerData) {
        (
            Id { id: self.id },
            CustomerData {
                name: self.name,
                phone: self.phone,
                community: self.fields.community,
                status: self.fields.status,
                remark: self.fields.remark,
            },
        )
    }
}

#[derive(ClapArgs)]
pub struct ListCustomersArgs {
    #[arg(short, long, help = "Only customers with this status code")]
    pub status: Option<i64>,
    #[arg(short = 'q', long, help = "Match name, phone or community")]
    pub search: Option<String>,
    #[arg(long, help = "Maximum number of customers to show")]
    pub limit: Option<u32>,
    #[arg(long, help = "Number of customers to skip")]
    pub offset: Option<u32>,
}

impl From<ListCustomersArgs> for ListCustomers {
    fn from(val: ListCustomersArgs) -> Self {
        ListCustomers {
            status: val.status,
            search: val.search,
            limit: val.limit,
            offset: val.offset,
        }
    }
}

/// Customer reaction to a viewing
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FeedbackArg {
    /// Customer is interested
    Interested,
    /// Customer is not interested
    NotInterested,
}

impl From<FeedbackArg> for ViewingFeedback {
    fn from(val: FeedbackArg) -> Self {
        match val {
            FeedbackArg::Interested => ViewingFeedback::Interested,
            FeedbackArg::NotInterested => ViewingFeedback::NotInterested,
        }
    }
}

/// Viewing fields shared by `add` and `update`
#[derive(ClapArgs)]
pub struct ViewingFields {
    #[arg(short, long, help = "Name of the property or development")]
    pub property: Option<String>,
    #[arg(short, long, help = "Street address of the property")]
    pub address: Option<String>,
    #[arg(short, long, help = "Viewing time, e.g. '2024-05-01 14:30'")]
    pub time: Option<String>,
    #[arg(short, long, help = "Commission amount")]
    pub commission: Option<f64>,
    #[arg(
        short,
        long,
        help = "Status code: 1 scheduled, 2 viewed, 3 cancelled, 4 deal closed"
    )]
    pub status: Option<i64>,
    #[arg(short, long, value_enum, help = "Customer feedback")]
    pub feedback: Option<FeedbackArg>,
    #[arg(short, long, help = "Business type, e.g. sale or rent")]
    pub business_type: Option<String>,
    #[arg(long, help = "Agent who led the viewing")]
    pub viewer: Option<String>,
}

impl ViewingFields {
    fn into_data(self, customer_id: Option<u64>) -> ViewingRecordData {
        ViewingRecordData {
            customer_id,
            property_name: self.property,
            property_address: self.address,
            viewing_time: self.time,
            commission: self.commission,
            viewing_status: self.status,
            viewing_feedback: self.feedback.map(|f| ViewingFeedback::from(f).code()),
            business_type: self.business_type,
            viewer_name: self.viewer,
        }
    }
}

#[derive(ClapArgs)]
pub struct AddViewingArgs {
    #[arg(help = "Customer the viewing belongs to")]
    pub customer_id: u64,
    #[command(flatten)]
    pub fields: ViewingFields,
}

impl From<AddViewingArgs> for ViewingRecordData {
    fn from(val: AddViewingArgs) -> Self {
        val.fields.into_data(Some(val.customer_id))
    }
}

#[derive(ClapArgs)]
pub struct UpdateViewingArgs {
    #[arg(help = "Unique identifier of the viewing record to update")]
    pub id: u64,
    #[arg(long, help = "Move the record to another customer")]
    pub customer_id: Option<u64>,
    #[command(flatten)]
    pub fields: ViewingFields,
}

impl UpdateViewingArgs {
    pub fn into_params(self) -> (Id, ViewingRecordData) {
        (Id { id: self.id }, self.fields.into_data(self.customer_id))
    }
}

#[derive(ClapArgs)]
pub struct ListViewingsArgs {
    #[arg(long, help = "Only viewings for this customer")]
    pub customer_id: Option<u64>,
    #[arg(short, long, help = "Only viewings with this status code")]
    pub status: Option<i64>,
    #[arg(long, help = "Maximum number of records to show")]
    pub limit: Option<u32>,
    #[arg(long, help = "Number of records to skip")]
    pub offset: Option<u32>,
}

impl From<ListViewingsArgs> for ListViewingRecords {
    fn from(val: ListViewingsArgs) -> Self {
        ListViewingRecords {
            customer_id: val.customer_id,
            viewing_status: val.status,
            limit: val.limit,
            offset: val.offset,
        }
    }
}
