//! Viewing record operations for the CRM service.

use jiff::Timestamp;

use super::{customer_ops::ensure_customer_exists, paginate, require, Crm, UpdateSet};
use crate::{
    error::{CrmError, Result},
    models::{canonical_timestamp, viewing::DEFAULT_PROPERTY_NAME, ViewingRecord, ViewingStatus},
    params,
    params::{ListViewingRecords, ViewingRecordData},
    validation::validate_viewing_record_data,
    value::Value,
};

const SELECT_VIEWING_SQL: &str = "SELECT v.id, v.customer_id, c.name AS customer_name, v.property_name, v.property_address, COALESCE(v.viewing_time, datetime(v.created_at)) AS viewing_time, v.commission, v.viewing_status, v.viewing_feedback, v.business_type, v.viewer_name, v.created_at, v.updated_at FROM viewing_records v LEFT JOIN customers c ON c.id = v.customer_id";
const INSERT_VIEWING_SQL: &str = "INSERT INTO viewing_records (customer_id, property_name, property_address, viewing_time, commission, viewing_status, viewing_feedback, business_type, viewer_name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";
const CHECK_VIEWING_EXISTS_SQL: &str = "SELECT id FROM viewing_records WHERE id = ?1";
const DELETE_VIEWING_SQL: &str = "DELETE FROM viewing_records WHERE id = ?1";

impl Crm<'_> {
    /// Records a viewing for an existing customer.
    ///
    /// `customer_id` is required. The existence check and the insert share
    /// one transaction, so a missing customer leaves nothing behind.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `NotFound` when the customer does
    /// not exist.
    pub async fn create_viewing_record(&self, data: &ViewingRecordData) -> Result<ViewingRecord> {
        validate_viewing_record_data(data)?;
        let customer_id = *require(data.customer_id.as_ref(), "customer_id")?;

        let viewing_time = stored_viewing_time(data)?;
        let now = Timestamp::now().to_string();
        let insert = params![
            customer_id,
            data.property_name
                .as_deref()
                .map_or(DEFAULT_PROPERTY_NAME, str::trim),
            data.property_address.clone(),
            viewing_time,
            data.commission.unwrap_or(0.0),
            data.viewing_status.unwrap_or(ViewingStatus::Scheduled.code()),
            data.viewing_feedback,
            data.business_type.clone(),
            data.viewer_name.clone(),
            now.clone(),
            now,
        ];

        let id = self
            .db
            .transaction(move |tx| {
                ensure_customer_exists(tx, customer_id)?;
                Ok(tx.execute(INSERT_VIEWING_SQL, &insert)?.last_insert_rowid as u64)
            })
            .await?;

        self.get_viewing_record(id)
            .await?
            .ok_or(CrmError::NotFound {
                entity: "Viewing record",
                id,
            })
    }

    /// Retrieves a viewing record by ID.
    pub async fn get_viewing_record(&self, id: u64) -> Result<Option<ViewingRecord>> {
        let sql = format!("{SELECT_VIEWING_SQL} WHERE v.id = ?1");
        self.db
            .query_one(&sql, &params![id])
            .await?
            .as_ref()
            .map(ViewingRecord::try_from)
            .transpose()
    }

    /// Lists viewing records, most recent viewing first.
    pub async fn list_viewing_records(
        &self,
        filter: &ListViewingRecords,
    ) -> Result<Vec<ViewingRecord>> {
        let mut sql = SELECT_VIEWING_SQL.to_string();
        let mut params: Vec<Value> = Vec::new();
        let mut clauses = Vec::new();

        if let Some(customer_id) = filter.customer_id {
            params.push(customer_id.into());
            clauses.push(format!("v.customer_id = ?{}", params.len()));
        }
        if let Some(status) = filter.viewing_status {
            params.push(status.into());
            clauses.push(format!("v.viewing_status = ?{}", params.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY datetime(COALESCE(v.viewing_time, v.created_at)) DESC, v.id DESC");
        paginate(&mut sql, &mut params, filter.limit, filter.offset);

        self.db
            .query(&sql, &params)
            .await?
            .iter()
            .map(ViewingRecord::try_from)
            .collect()
    }

    /// Applies the fields present in `data` to an existing viewing record.
    ///
    /// # Errors
    ///
    /// `Validation` for malformed input, `NotFound` when the record, or the
    /// customer it is being moved to, does not exist.
    pub async fn update_viewing_record(
        &self,
        id: u64,
        data: &ViewingRecordData,
    ) -> Result<ViewingRecord> {
        validate_viewing_record_data(data)?;
        let viewing_time = stored_viewing_time(data)?;

        let mut set = UpdateSet::default();
        set.set_if("customer_id", data.customer_id.as_ref());
        if let Some(name) = &data.property_name {
            set.set("property_name", name.trim());
        }
        set.set_if("property_address", data.property_address.as_ref());
        set.set_if("viewing_time", viewing_time.as_ref());
        set.set_if("commission", data.commission.as_ref());
        set.set_if("viewing_status", data.viewing_status.as_ref());
        set.set_if("viewing_feedback", data.viewing_feedback.as_ref());
        set.set_if("business_type", data.business_type.as_ref());
        set.set_if("viewer_name", data.viewer_name.as_ref());

        if !set.is_empty() {
            set.set("updated_at", Timestamp::now().to_string());
            let (sql, params) = set.into_statement("viewing_records", id);
            let customer_id = data.customer_id;

            self.db
                .transaction(move |tx| {
                    if tx
                        .query_one(CHECK_VIEWING_EXISTS_SQL, &params![id])?
                        .is_none()
                    {
                        return Err(CrmError::NotFound {
                            entity: "Viewing record",
                            id,
                        });
                    }
                    if let Some(customer_id) = customer_id {
                        ensure_customer_exists(tx, customer_id)?;
                    }
                    tx.execute(&sql, &params)?;
                    Ok(())
                })
                .await?;
        }

        self.get_viewing_record(id)
            .await?
            .ok_or(CrmError::NotFound {
                entity: "Viewing record",
                id,
            })
    }

    /// Deletes a viewing record and returns what was removed.
    pub async fn delete_viewing_record(&self, id: u64) -> Result<ViewingRecord> {
        let record = self
            .get_viewing_record(id)
            .await?
            .ok_or(CrmError::NotFound {
                entity: "Viewing record",
                id,
            })?;

        if self.db.execute(DELETE_VIEWING_SQL, &params![id]).await?.changes == 0 {
            return Err(CrmError::NotFound {
                entity: "Viewing record",
                id,
            });
        }
        Ok(record)
    }
}

/// Caller-supplied viewing time in its stored form.
fn stored_viewing_time(data: &ViewingRecordData) -> Result<Option<String>> {
    data.viewing_time
        .as_deref()
        .map(|raw| {
            canonical_timestamp(raw).ok_or_else(|| {
                CrmError::validation("viewing_time")
                    .with_reason(format!("'{raw}' is not a recognizable date and time"))
            })
        })
        .transpose()
}
