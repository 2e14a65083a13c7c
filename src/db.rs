use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{AnalysisResult, AnalysisSummary, TicketRecord, UsageRecord};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Demo data for one account: two weeks of declining usage, a fresh sev1
/// ticket, and notes that trip both keyword opportunities. Idempotent via
/// source keys.
pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let account = "ACME_CORP";
    let today = Utc::now().date_naive();

    for day in 0..14i64 {
        let recorded_on = today - Duration::days(13 - day);
        let dau = if day < 7 { 120.0 } else { 80.0 };

        sqlx::query(
            r#"
            INSERT INTO renewal_risk.usage_records
            (id, account_id, recorded_on, dau, used_seats, licensed_seats, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account)
        .bind(recorded_on.to_string())
        .bind(dau)
        .bind(52.0_f64)
        .bind(120.0_f64)
        .bind(format!("seed-usage-{day}"))
        .execute(pool)
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO renewal_risk.tickets
        (id, account_id, ticket_id, severity, created_at, source_key)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (source_key) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account)
    .bind("T-1042")
    .bind(1)
    .bind(today.to_string())
    .bind("seed-ticket-1042")
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO renewal_risk.account_notes (account_id, body)
        VALUES ($1, $2)
        ON CONFLICT (account_id) DO UPDATE SET body = EXCLUDED.body
        "#,
    )
    .bind(account)
    .bind(
        "Champion asked when the Teams feature ships.\n\
         Engineering wants higher API rate limits.",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn import_usage_csv(
    pool: &PgPool,
    account_id: &str,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        date: String,
        dau: f64,
        used_seats: f64,
        licensed_seats: f64,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open usage csv {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO renewal_risk.usage_records
            (id, account_id, recorded_on, dau, used_seats, licensed_seats, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&row.date)
        .bind(row.dau)
        .bind(row.used_seats)
        .bind(row.licensed_seats)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_tickets_csv(
    pool: &PgPool,
    account_id: &str,
    csv_path: &std::path::Path,
) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        ticket_id: Option<String>,
        severity: i32,
        created_at: String,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)
        .with_context(|| format!("failed to open tickets csv {}", csv_path.display()))?;
    let mut inserted = 0usize;

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO renewal_risk.tickets
            (id, account_id, ticket_id, severity, created_at, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account_id)
        .bind(&row.ticket_id)
        .bind(row.severity)
        .bind(&row.created_at)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn fetch_usage(pool: &PgPool, account_id: &str) -> anyhow::Result<Vec<UsageRecord>> {
    let rows = sqlx::query(
        "SELECT recorded_on, dau, used_seats, licensed_seats \
         FROM renewal_risk.usage_records \
         WHERE account_id = $1 \
         ORDER BY recorded_on",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| UsageRecord {
            date: row.get("recorded_on"),
            dau: row.get("dau"),
            used_seats: row.get("used_seats"),
            licensed_seats: row.get("licensed_seats"),
        })
        .collect())
}

pub async fn fetch_tickets(pool: &PgPool, account_id: &str) -> anyhow::Result<Vec<TicketRecord>> {
    let rows = sqlx::query(
        "SELECT ticket_id, severity, created_at \
         FROM renewal_risk.tickets \
         WHERE account_id = $1 \
         ORDER BY created_at",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| TicketRecord {
            ticket_id: row.get("ticket_id"),
            severity: row.get("severity"),
            created_at: row.get("created_at"),
        })
        .collect())
}

pub async fn fetch_notes(pool: &PgPool, account_id: &str) -> anyhow::Result<Option<String>> {
    let row = sqlx::query("SELECT body FROM renewal_risk.account_notes WHERE account_id = $1")
        .bind(account_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|row| row.get("body")))
}

pub async fn store_analysis(pool: &PgPool, result: &AnalysisResult) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO renewal_risk.analyses (id, account_id, risk_score, result)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(id)
    .bind(&result.account_id)
    .bind(result.risk_score)
    .bind(serde_json::to_value(result).context("failed to serialize analysis result")?)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn get_analysis(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<AnalysisResult>> {
    let row = sqlx::query("SELECT result FROM renewal_risk.analyses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match row {
        Some(row) => {
            let value: serde_json::Value = row.get("result");
            let result = serde_json::from_value(value)
                .context("stored analysis does not deserialize")?;
            Ok(Some(result))
        }
        None => Ok(None),
    }
}

pub async fn list_analyses(pool: &PgPool, limit: i64) -> anyhow::Result<Vec<AnalysisSummary>> {
    let rows = sqlx::query(
        "SELECT id, account_id, risk_score, created_at \
         FROM renewal_risk.analyses \
         ORDER BY created_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| AnalysisSummary {
            id: row.get("id"),
            account_id: row.get("account_id"),
            risk_score: row.get("risk_score"),
            created_at: row.get("created_at"),
        })
        .collect())
}
