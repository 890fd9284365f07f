//! # jobly
//!
//! Job-listing records on PostgreSQL.
//!
//! The interesting part is dynamic query construction:
//!
//! - [`sql_for_partial_update`] turns a sparse [`UpdatePayload`] into a
//!   parameterized `SET` clause, remapping field names through a [`FieldNameMap`].
//! - [`build_filter_query`] turns optional [`FilterCriteria`] into a
//!   parameterized `WHERE` clause with a stable `ORDER BY`.
//!
//! Both return a [`SqlFragment`] whose `$1, $2, ...` placeholders line up with
//! its `values`, ready to hand to any [`GenericClient`].
//!
//! ```ignore
//! use jobly::{FieldNameMap, UpdatePayload, sql_for_partial_update};
//!
//! let payload = UpdatePayload::new().with("title", "New").with("salary", 500);
//! let mut set = sql_for_partial_update(&payload, &FieldNameMap::identity(), 1)?;
//! let id_idx = set.push_value(7);
//! let sql = format!("UPDATE jobs SET {} WHERE id = ${id_idx}", set.sql);
//! conn.execute(&sql, &set.params_ref()).await?;
//! ```
//!
//! The [`Jobs`] and [`Companies`] repositories wire the builders to the
//! database.

pub mod changeset;
pub mod client;
pub mod error;
pub mod filter;
pub mod fragment;
mod ident;
pub mod logging;
pub mod models;
pub mod row;
pub mod update;
pub mod validate;
pub mod value;

pub use changeset::{ValidationCode, ValidationError, ValidationErrors};
pub use client::GenericClient;
pub use error::{JoblyError, JoblyResult};
pub use filter::{FilterCriteria, build_filter_query, escape_like};
pub use fragment::{Placeholders, SqlFragment};
pub use models::{Companies, Company, Job, JobDetail, JobListing, Jobs, NewCompany, NewJob};
pub use row::{FromRow, RowExt};
pub use update::{FieldNameMap, UpdatePayload, sql_for_partial_update};
pub use value::Value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PooledClient, create_pool, create_pool_with_config};
