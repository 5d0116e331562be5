//! Customer operations for the CRM service.

use jiff::Timestamp;

use super::{paginate, require, Crm, UpdateSet};
use crate::{
    db::Transaction,
    error::{CrmError, Result},
    models::{Customer, CustomerStatus},
    params,
    params::{CustomerData, ListCustomers},
    validation::validate_customer_data,
    value::Value,
};

const CUSTOMER_COLUMNS: &str =
    "id, name, phone, community, status, remark, created_at, updated_at";
const SELECT_CUSTOMER_SQL: &str = "SELECT id, name, phone, community, status, remark, created_at, updated_at FROM customers WHERE id = ?1";
const INSERT_CUSTOMER_SQL: &str = "INSERT INTO customers (name, phone, community, status, remark, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const FIND_CUSTOMER_BY_PHONE_SQL: &str = "SELECT id FROM customers WHERE phone = ?1";
const CHECK_CUSTOMER_EXISTS_SQL: &str = "SELECT id FROM customers WHERE id = ?1";
const DELETE_CUSTOMER_VIEWINGS_SQL: &str = "DELETE FROM viewing_records WHERE customer_id = ?1";
const DELETE_CUSTOMER_SQL: &str = "DELETE FROM customers WHERE id = ?1";

impl Crm<'_> {
    /// Registers a new customer. `name` and `phone` are required; `status`
    /// defaults to [`CustomerStatus::New`].
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `Conflict` when the phone number
    /// already belongs to another customer.
    pub async fn create_customer(&self, data: &CustomerData) -> Result<Customer> {
        validate_customer_data(data)?;
        let name = require(data.name.as_deref(), "name")?.trim().to_string();
        let phone = require(data.phone.as_deref(), "phone")?.to_string();

        let now = Timestamp::now().to_string();
        let insert = params![
            name,
            phone.clone(),
            data.community.clone(),
            data.status.unwrap_or(CustomerStatus::New.code()),
            data.remark.clone(),
            now.clone(),
            now,
        ];

        let id = self
            .db
            .transaction(move |tx| {
                ensure_phone_available(tx, &phone, None)?;
                Ok(tx.execute(INSERT_CUSTOMER_SQL, &insert)?.last_insert_rowid as u64)
            })
            .await?;

        self.get_customer(id).await?.ok_or(CrmError::NotFound {
            entity: "Customer",
            id,
        })
    }

    /// Retrieves a customer by ID.
    pub async fn get_customer(&self, id: u64) -> Result<Option<Customer>> {
        self.db
            .query_one(SELECT_CUSTOMER_SQL, &params![id])
            .await?
            .as_ref()
            .map(Customer::try_from)
            .transpose()
    }

    /// Lists customers, newest first.
    pub async fn list_customers(&self, filter: &ListCustomers) -> Result<Vec<Customer>> {
        let mut sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers");
        let mut params: Vec<Value> = Vec::new();
        let mut clauses = Vec::new();

        if let Some(status) = filter.status {
            params.push(status.into());
            clauses.push(format!("status = ?{}", params.len()));
        }
        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            params.push(format!("%{search}%").into());
            let n = params.len();
            clauses.push(format!(
                "(name LIKE ?{n} OR phone LIKE ?{n} OR community LIKE ?{n})"
            ));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");
        paginate(&mut sql, &mut params, filter.limit, filter.offset);

        self.db
            .query(&sql, &params)
            .await?
            .iter()
            .map(Customer::try_from)
            .collect()
    }

    /// Applies the fields present in `data` to an existing customer.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `NotFound` when the customer does
    /// not exist, `Conflict` when a new phone number is already taken.
    pub async fn update_customer(&self, id: u64, data: &CustomerData) -> Result<Customer> {
        validate_customer_data(data)?;

        let mut set = UpdateSet::default();
        if let Some(name) = &data.name {
            set.set("name", name.trim());
        }
        set.set_if("phone", data.phone.as_ref());
        set.set_if("community", data.community.as_ref());
        set.set_if("status", data.status.as_ref());
        set.set_if("remark", data.remark.as_ref());

        if !set.is_empty() {
            set.set("updated_at", Timestamp::now().to_string());
            let (sql, params) = set.into_statement("customers", id);
            let phone = data.phone.clone();

            self.db
                .transaction(move |tx| {
                    ensure_customer_exists(tx, id)?;
                    if let Some(phone) = &phone {
                        ensure_phone_available(tx, phone, Some(id))?;
                    }
                    tx.execute(&sql, &params)?;
                    Ok(())
                })
                .await?;
        }

        self.get_customer(id).await?.ok_or(CrmError::NotFound {
            entity: "Customer",
            id,
        })
    }

    /// Deletes a customer together with their viewing records.
    pub async fn delete_customer(&self, id: u64) -> Result<Customer> {
        let customer = self.get_customer(id).await?.ok_or(CrmError::NotFound {
            entity: "Customer",
            id,
        })?;

        self.db
            .transaction(move |tx| {
                tx.execute(DELETE_CUSTOMER_VIEWINGS_SQL, &params![id])?;
                if tx.execute(DELETE_CUSTOMER_SQL, &params![id])?.changes == 0 {
                    return Err(CrmError::NotFound {
                        entity: "Customer",
                        id,
                    });
                }
                Ok(())
            })
            .await?;

        Ok(customer)
    }
}

/// Fails with `NotFound` unless the customer exists.
pub(crate) fn ensure_customer_exists(tx: &mut Transaction<'_>, id: u64) -> Result<()> {
    match tx.query_one(CHECK_CUSTOMER_EXISTS_SQL, &params![id])? {
        Some(_) => Ok(()),
        None => Err(CrmError::NotFound {
            entity: "Customer",
            id,
        }),
    }
}

/// Fails with `Conflict` when `phone` belongs to a customer other than
/// `owner`.
fn ensure_phone_available(tx: &mut Transaction<'_>, phone: &str, owner: Option<u64>) -> Result<()> {
    let Some(row) = tx.query_one(FIND_CUSTOMER_BY_PHONE_SQL, &params![phone])? else {
        return Ok(());
    };
    let holder = row.get_i64("id").map(|id| id as u64);
    if holder.is_some() && holder == owner {
        return Ok(());
    }
    Err(CrmError::Conflict {
        field: "phone".to_string(),
        reason: format!("{phone} is already registered to another customer"),
    })
}
