use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

/// Run idempotent schema migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    info!("Running schema migrations...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS news (
            id            BIGSERIAL PRIMARY KEY,
            title         TEXT NOT NULL,
            content       TEXT NOT NULL,
            link_article  TEXT NOT NULL DEFAULT '',
            img_url       TEXT,
            source        TEXT NOT NULL,
            published_at  TIMESTAMPTZ NOT NULL,
            label         TEXT,
            embedding     JSONB,
            created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS issues (
            id                 BIGSERIAL PRIMARY KEY,
            title              TEXT NOT NULL,
            centroid_embedding JSONB,
            news_count         INTEGER NOT NULL DEFAULT 0,
            view_count         INTEGER NOT NULL DEFAULT 0,
            timemodified       TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await?;

    // The pair primary key enforces at most one link per (news, issue);
    // cascade removes links when an issue is deleted externally.
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS news_issues (
            news_id    BIGINT NOT NULL REFERENCES news(id) ON DELETE CASCADE,
            issue_id   BIGINT NOT NULL REFERENCES issues(id) ON DELETE CASCADE,
            similarity DOUBLE PRECISION NOT NULL,
            PRIMARY KEY (news_id, issue_id)
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS news_issues_issue_idx ON news_issues (issue_id)")
        .execute(pool)
        .await?;

    info!("Schema migrations complete");
    Ok(())
}
