use crate::cli::{CompaniesCommand, JobsCommand};
use jobly::{Companies, GenericClient, Jobs, NewCompany, NewJob, UpdatePayload};
use serde_json::{Value as Json, json};

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, raw: &str) -> anyhow::Result<T> {
    serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("invalid {what} JSON: {e}"))
}

fn parse_payload(raw: &str) -> anyhow::Result<UpdatePayload> {
    let json: Json = parse_json("update", raw)?;
    Ok(UpdatePayload::try_from(json)?)
}

pub async fn run_jobs(conn: &impl GenericClient, cmd: JobsCommand) -> anyhow::Result<Json> {
    let out = match cmd {
        JobsCommand::List(criteria) => {
            let jobs = Jobs::find_all(conn, &criteria).await?;
            json!({ "jobs": jobs })
        }
        JobsCommand::Get(id) => json!({ "job": Jobs::get(conn, id).await? }),
        JobsCommand::Create(raw) => {
            let data: NewJob = parse_json("job", &raw)?;
            json!({ "job": Jobs::create(conn, &data).await? })
        }
        JobsCommand::Update(id, raw) => {
            let payload = parse_payload(&raw)?;
            json!({ "job": Jobs::update(conn, id, &payload).await? })
        }
        JobsCommand::Delete(id) => {
            Jobs::remove(conn, id).await?;
            json!({ "deleted": id })
        }
    };
    Ok(out)
}

pub async fn run_companies(
    conn: &impl GenericClient,
    cmd: CompaniesCommand,
) -> anyhow::Result<Json> {
    let out = match cmd {
        CompaniesCommand::Get(handle) => json!({ "company": Companies::get(conn, &handle).await? }),
        CompaniesCommand::Create(raw) => {
            let data: NewCompany = parse_json("company", &raw)?;
            json!({ "company": Companies::create(conn, &data).await? })
        }
        CompaniesCommand::Update(handle, raw) => {
            let payload = parse_payload(&raw)?;
            json!({ "company": Companies::update(conn, &handle, &payload).await? })
        }
        CompaniesCommand::Delete(handle) => {
            Companies::remove(conn, &handle).await?;
            json!({ "deleted": handle })
        }
    };
    Ok(out)
}
