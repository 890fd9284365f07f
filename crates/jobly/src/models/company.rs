//! Companies repository.

use crate::changeset::ValidationErrors;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::logging::log_sql;
use crate::row::{FromRow, RowExt};
use crate::update::{FieldNameMap, UpdatePayload};
use crate::validate::{self, Field, Rule};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

const UPDATABLE: &[Field] = &[
    Field::new("name", Rule::NonEmptyText),
    Field::new("description", Rule::Text),
    Field::nullable("numEmployees", Rule::NonNegativeInt),
    Field::nullable("logoUrl", Rule::Url),
];

/// Payload field names that differ from their column.
pub fn field_map() -> FieldNameMap {
    FieldNameMap::from_pairs([("numEmployees", "num_employees"), ("logoUrl", "logo_url")])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// Input for [`Companies::create`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate::check_non_empty(&mut errors, "handle", &self.handle);
        validate::check_non_empty(&mut errors, "name", &self.name);
        if let Some(n) = self.num_employees {
            validate::check_non_negative(&mut errors, "numEmployees", n.into());
        }
        if let Some(url) = &self.logo_url {
            validate::check_url(&mut errors, "logoUrl", url);
        }
        errors.into_result()
    }
}

pub struct Companies;

impl Companies {
    pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
        data.validate()?;

        let sql = format!(
            "INSERT INTO companies ({COMPANY_COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {COMPANY_COLUMNS}"
        );
        log_sql("companies.create", &sql, 5);
        let row = conn
            .query_one(
                &sql,
                &[
                    &data.handle,
                    &data.name,
                    &data.description,
                    &data.num_employees,
                    &data.logo_url,
                ],
            )
            .await?;
        Company::from_row(&row)
    }

    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<Company> {
        Self::find(conn, handle)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))
    }

    pub(crate) async fn find(
        conn: &impl GenericClient,
        handle: &str,
    ) -> JoblyResult<Option<Company>> {
        let sql = format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = $1");
        log_sql("companies.get", &sql, 1);
        let row = conn.query_opt(&sql, &[&handle]).await?;
        row.as_ref().map(Company::from_row).transpose()
    }

    /// Partially update a company. Payload keys use the API's camelCase names.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        data: &UpdatePayload,
    ) -> JoblyResult<Company> {
        validate::validate_update(data, UPDATABLE)?;

        let mut set = data.to_set_clause(&field_map())?;
        let handle_idx = set.push_value(handle);
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${handle_idx} RETURNING {COMPANY_COLUMNS}",
            set.sql
        );
        log_sql("companies.update", &sql, set.values.len());
        let row = conn.query_opt(&sql, &set.params_ref()).await?;
        match row {
            Some(row) => Company::from_row(&row),
            None => Err(JoblyError::not_found(format!("No company: {handle}"))),
        }
    }

    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let sql = "DELETE FROM companies WHERE handle = $1 RETURNING handle";
        log_sql("companies.remove", sql, 1);
        let row = conn.query_opt(sql, &[&handle]).await?;
        if row.is_none() {
            return Err(JoblyError::not_found(format!("No company: {handle}")));
        }
        Ok(())
    }
}
