//! Record repositories for jobs and companies.
//!
//! Each repository is a unit struct with async associated functions taking any
//! [`GenericClient`](crate::GenericClient), so the same calls work on a pooled
//! connection or inside a caller-managed transaction.

pub mod company;
pub mod job;

pub use company::{Companies, Company, NewCompany};
pub use job::{Job, JobDetail, JobListing, Jobs, NewJob};
