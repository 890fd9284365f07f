//! Repository tests against a live database.
//!
//! Set `DATABASE_URL` (or put it in `.env`) to run them; otherwise each test
//! returns early. Tables are created as temp tables on a fresh connection, so
//! tests do not see each other's rows.

use jobly::{
    Companies, FilterCriteria, GenericClient, JoblyError, Jobs, NewCompany, NewJob,
    UpdatePayload, Value,
};
use rust_decimal::Decimal;

async fn try_connect() -> Option<tokio_postgres::Client> {
    let _ = dotenvy::dotenv();
    let database_url = std::env::var("DATABASE_URL").ok()?;
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .expect("Failed to connect to DATABASE_URL with NoTls");
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("tokio-postgres connection error: {e}");
        }
    });
    Some(client)
}

async fn seeded() -> Option<(tokio_postgres::Client, Vec<i32>)> {
    let client = try_connect().await?;
    client
        .batch_execute(
            "CREATE TEMP TABLE companies (
                handle VARCHAR(25) PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                num_employees INTEGER CHECK (num_employees >= 0),
                description TEXT NOT NULL,
                logo_url TEXT
            );
            CREATE TEMP TABLE jobs (
                id SERIAL PRIMARY KEY,
                title TEXT NOT NULL,
                salary INTEGER CHECK (salary >= 0),
                equity NUMERIC CHECK (equity <= 1.0),
                company_handle VARCHAR(25) NOT NULL REFERENCES companies ON DELETE CASCADE
            );",
        )
        .await
        .unwrap();

    for (handle, name, employees) in [("c1", "C1", 1), ("c2", "C2", 2)] {
        Companies::create(
            &client,
            &NewCompany {
                handle: handle.into(),
                name: name.into(),
                description: format!("Desc {name}"),
                num_employees: Some(employees),
                logo_url: None,
            },
        )
        .await
        .unwrap();
    }

    let mut ids = Vec::new();
    for (title, salary, equity, handle) in [
        ("Engineer", 100_000, Some("0.05"), "c1"),
        ("Accountant", 60_000, None, "c1"),
        ("Senior Engineer", 150_000, Some("0"), "c2"),
    ] {
        let job = Jobs::create(
            &client,
            &NewJob {
                title: title.into(),
                salary: Some(salary),
                equity: equity.map(str::to_string),
                company_handle: handle.into(),
            },
        )
        .await
        .unwrap();
        ids.push(job.id);
    }

    Some((client, ids))
}

#[tokio::test]
async fn create_returns_row() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let job = Jobs::create(
        &client,
        &NewJob {
            title: "Test".into(),
            salary: Some(100),
            equity: Some("0.1".into()),
            company_handle: "c1".into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(job.title, "Test");
    assert_eq!(job.equity, Some(Decimal::new(1, 1)));
}

#[tokio::test]
async fn find_all_without_filters_orders_by_title() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let jobs = Jobs::find_all(&client, &FilterCriteria::new()).await.unwrap();
    let titles: Vec<&str> = jobs.iter().map(|j| j.job.title.as_str()).collect();
    assert_eq!(titles, ["Accountant", "Engineer", "Senior Engineer"]);
    assert_eq!(jobs[0].company_name.as_deref(), Some("C1"));
}

#[tokio::test]
async fn find_all_applies_every_filter() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let criteria = FilterCriteria::new().min_salary(90_000).has_equity(true).title("ENG");
    let jobs = Jobs::find_all(&client, &criteria).await.unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].job.title, "Engineer");
}

#[tokio::test]
async fn find_all_title_wildcards_match_literally() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let jobs = Jobs::find_all(&client, &FilterCriteria::new().title("%"))
        .await
        .unwrap();
    assert!(jobs.is_empty());
}

#[tokio::test]
async fn get_attaches_company() {
    let Some((client, ids)) = seeded().await else {
        return;
    };
    let job = Jobs::get(&client, ids[0]).await.unwrap();
    assert_eq!(job.title, "Engineer");
    assert_eq!(job.company.map(|c| c.handle), Some("c1".to_string()));
}

#[tokio::test]
async fn get_missing_is_not_found() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let err = Jobs::get(&client, 0).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_partial_fields() {
    let Some((client, ids)) = seeded().await else {
        return;
    };
    let payload = UpdatePayload::new()
        .with("title", "New")
        .with("salary", 500)
        .with("equity", "0.5");
    let job = Jobs::update(&client, ids[1], &payload).await.unwrap();
    assert_eq!(job.title, "New");
    assert_eq!(job.salary, Some(500));
    assert_eq!(job.equity, Some(Decimal::new(5, 1)));
    assert_eq!(job.company_handle, "c1");
}

#[tokio::test]
async fn update_null_clears_salary() {
    let Some((client, ids)) = seeded().await else {
        return;
    };
    let payload = UpdatePayload::new().with("salary", Value::Null);
    let job = Jobs::update(&client, ids[0], &payload).await.unwrap();
    assert_eq!(job.salary, None);
}

#[tokio::test]
async fn update_missing_is_not_found() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let payload = UpdatePayload::new().with("title", "test");
    let err = Jobs::update(&client, 0, &payload).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_with_no_data_is_bad_request() {
    let Some((client, ids)) = seeded().await else {
        return;
    };
    let err = Jobs::update(&client, ids[0], &UpdatePayload::new())
        .await
        .unwrap_err();
    assert!(matches!(err, JoblyError::BadRequest(_)));
}

#[tokio::test]
async fn remove_deletes_row() {
    let Some((client, ids)) = seeded().await else {
        return;
    };
    Jobs::remove(&client, ids[0]).await.unwrap();
    let rows = client
        .query("SELECT id FROM jobs WHERE id = $1", &[&ids[0]])
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn remove_missing_is_not_found() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    assert!(Jobs::remove(&client, 0).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn company_update_remaps_fields() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let payload = UpdatePayload::new()
        .with("numEmployees", 42)
        .with("logoUrl", "https://c1.test/logo.png");
    let company = Companies::update(&client, "c1", &payload).await.unwrap();
    assert_eq!(company.num_employees, Some(42));
    assert_eq!(company.logo_url.as_deref(), Some("https://c1.test/logo.png"));
}

#[tokio::test]
async fn duplicate_company_is_unique_violation() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let err = Companies::create(
        &client,
        &NewCompany {
            handle: "c1".into(),
            name: "Other".into(),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(err.is_unique_violation());
}

#[tokio::test]
async fn job_for_unknown_company_is_foreign_key_violation() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let err = Jobs::create(
        &client,
        &NewJob {
            title: "Orphan".into(),
            salary: Some(1),
            equity: None,
            company_handle: "nope".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, JoblyError::ForeignKeyViolation(_)), "{err:?}");
}

#[tokio::test]
async fn equity_above_one_is_check_violation() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let err = GenericClient::execute(
        &client,
        "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ('Bad', 1, 2, 'c1')",
        &[],
    )
    .await
    .unwrap_err();
    assert!(matches!(err, JoblyError::CheckViolation(_)), "{err:?}");
}

#[tokio::test]
async fn company_get_missing_is_not_found() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let err = Companies::get(&client, "nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn company_remove_missing_is_not_found() {
    let Some((client, _)) = seeded().await else {
        return;
    };
    let err = Companies::remove(&client, "nope").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn company_remove_cascades_to_jobs() {
    let Some((client, ids)) = seeded().await else {
        return;
    };
    Companies::remove(&client, "c2").await.unwrap();
    assert!(Companies::get(&client, "c2").await.unwrap_err().is_not_found());
    assert!(Jobs::get(&client, ids[2]).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn works_inside_transaction() {
    let Some((mut client, ids)) = seeded().await else {
        return;
    };
    let tx = client.transaction().await.unwrap();
    Jobs::remove(&tx, ids[2]).await.unwrap();
    tx.rollback().await.unwrap();
    assert!(Jobs::get(&client, ids[2]).await.is_ok());
}
