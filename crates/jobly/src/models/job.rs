//! Jobs repository.
//!
//! Search goes through [`build_filter_query`] and partial updates through
//! [`UpdatePayload::to_set_clause`]; every other statement is static SQL.

use crate::changeset::ValidationErrors;
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{FilterCriteria, build_filter_query};
use crate::logging::log_sql;
use crate::models::company::{Companies, Company};
use crate::row::{FromRow, RowExt};
use crate::update::{FieldNameMap, UpdatePayload};
use crate::validate::{self, Field, Rule};
use crate::value::Value;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Search base query. Filter predicates refer to the `j` alias.
pub const FIND_ALL_BASE: &str = "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, \
     c.name AS company_name \
     FROM jobs j \
     LEFT JOIN companies AS c ON c.handle = j.company_handle";

const UPDATABLE: &[Field] = &[
    Field::new("title", Rule::NonEmptyText),
    Field::nullable("salary", Rule::NonNegativeInt),
    Field::nullable("equity", Rule::Equity),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A search result row: the job plus its company's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub company_name: Option<String>,
}

impl FromRow for JobListing {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            job: Job::from_row(row)?,
            company_name: row.try_get_column("company_name")?,
        })
    }
}

/// A single job with its company attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Option<Company>,
}

/// Input for [`Jobs::create`]. `equity` is a decimal string such as `"0.1"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<String>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        validate::check_non_empty(&mut errors, "title", &self.title);
        validate::check_non_empty(&mut errors, "companyHandle", &self.company_handle);
        if let Some(salary) = self.salary {
            validate::check_non_negative(&mut errors, "salary", salary.into());
        }
        if let Some(equity) = &self.equity {
            validate::check_equity(&mut errors, "equity", equity);
        }
        errors.into_result()
    }
}

pub struct Jobs;

impl Jobs {
    /// Job update payload keys match the column names.
    pub fn field_map() -> FieldNameMap {
        FieldNameMap::identity()
    }

    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        data.validate()?;

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) RETURNING {JOB_COLUMNS}"
        );
        log_sql("jobs.create", &sql, 4);
        let equity = Value::from(data.equity.clone());
        let row = conn
            .query_one(
                &sql,
                &[&data.title, &data.salary, &equity, &data.company_handle],
            )
            .await?;
        Job::from_row(&row)
    }

    /// All jobs matching `criteria`, ordered by title.
    pub async fn find_all(
        conn: &impl GenericClient,
        criteria: &FilterCriteria,
    ) -> JoblyResult<Vec<JobListing>> {
        let query = build_filter_query(FIND_ALL_BASE, criteria);
        log_sql("jobs.find_all", &query.sql, query.values.len());
        let rows = conn.query(&query.sql, &query.params_ref()).await?;
        rows.iter().map(JobListing::from_row).collect()
    }

    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobDetail> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        log_sql("jobs.get", &sql, 1);
        let job = match conn.query_opt(&sql, &[&id]).await? {
            Some(row) => Job::from_row(&row)?,
            None => return Err(JoblyError::not_found(format!("No job with id: {id}"))),
        };

        let company = Companies::find(conn, &job.company_handle).await?;
        Ok(JobDetail {
            id: job.id,
            title: job.title,
            salary: job.salary,
            equity: job.equity,
            company,
        })
    }

    /// Partially update a job's `title`, `salary` and/or `equity`.
    pub async fn update(
        conn: &impl GenericClient,
        id: i32,
        data: &UpdatePayload,
    ) -> JoblyResult<Job> {
        validate::validate_update(data, UPDATABLE)?;

        let mut set = data.to_set_clause(&Self::field_map())?;
        let id_idx = set.push_value(id);
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${id_idx} RETURNING {JOB_COLUMNS}",
            set.sql
        );
        log_sql("jobs.update", &sql, set.values.len());
        match conn.query_opt(&sql, &set.params_ref()).await? {
            Some(row) => Job::from_row(&row),
            None => Err(JoblyError::not_found(format!("No job with id: {id}"))),
        }
    }

    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let sql = "DELETE FROM jobs WHERE id = $1 RETURNING id";
        log_sql("jobs.remove", sql, 1);
        if conn.query_opt(sql, &[&id]).await?.is_none() {
            return Err(JoblyError::not_found(format!("No job with id: {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_job() -> NewJob {
        NewJob {
            title: "Test".into(),
            salary: Some(100),
            equity: Some("0.1".into()),
            company_handle: "c1".into(),
        }
    }

    #[test]
    fn new_job_valid() {
        assert!(new_job().validate().is_ok());
    }

    #[test]
    fn new_job_rejects_bad_fields() {
        let job = NewJob {
            salary: Some(-5),
            equity: Some("1.1".into()),
            ..new_job()
        };
        let errors = job.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn new_job_requires_title_and_company() {
        let errors = NewJob::default().validate().unwrap_err();
        assert!(errors.has_field("title"));
        assert!(errors.has_field("companyHandle"));
    }

    #[test]
    fn new_job_from_json() {
        let job: NewJob = serde_json::from_value(serde_json::json!({
            "title": "Dev",
            "salary": 10,
            "equity": "0",
            "companyHandle": "c2",
        }))
        .unwrap();
        assert_eq!(job.company_handle, "c2");
        assert!(serde_json::from_value::<NewJob>(serde_json::json!({"title": "x", "companyHandle": "c", "id": 1})).is_err());
    }

    #[test]
    fn update_rejects_company_change() {
        let payload = UpdatePayload::new().with("company_handle", "c2");
        let errors = validate::validate_update(&payload, UPDATABLE).unwrap_err();
        assert!(errors.has_field("company_handle"));
    }

    #[test]
    fn search_sql_filters_and_orders() {
        let criteria = FilterCriteria::new().min_salary(200).title("eng");
        let query = build_filter_query(FIND_ALL_BASE, &criteria);
        assert!(query.sql.starts_with("SELECT j.id, j.title, j.salary, j.equity, j.company_handle, c.name AS company_name FROM jobs j LEFT JOIN companies AS c ON c.handle = j.company_handle WHERE "));
        assert!(query.sql.ends_with("j.salary >= $1 AND j.title ILIKE $2 ORDER BY title "));
    }

    #[test]
    fn listing_serializes_flat() {
        let listing = JobListing {
            job: Job {
                id: 1,
                title: "J1".into(),
                salary: Some(1),
                equity: Some(Decimal::new(1, 1)),
                company_handle: "c1".into(),
            },
            company_name: Some("C1".into()),
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["companyHandle"], "c1");
        assert_eq!(json["companyName"], "C1");
        assert_eq!(json["equity"], "0.1");
    }
}
