use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::{error::AppError, utils::config::AppConfig, utils::ident::STAGING_TABLE_PREFIX};

/// Staging area for uploaded CSVs: one text-typed table per upload with a
/// synthetic `row_id` key. Tables are created and populated once, then
/// only touched again by teardown.
#[derive(Clone)]
pub struct StagingStore {
    pool: PgPool,
}

impl StagingStore {
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(config.pg_connect_options())
            .await?;
        Ok(Self { pool })
    }

    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_staged_table(
        &self,
        table: &str,
        columns: &[String],
    ) -> Result<(), AppError> {
        sqlx::query(&create_table_sql(table, columns))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Inserts every row with bound parameters. Column *values* never meet
    /// the SQL text, only quoted column names do.
    pub async fn insert_rows(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Vec<String>],
    ) -> Result<u64, AppError> {
        let statement = insert_row_sql(table, columns);
        let mut inserted = 0u64;
        for row in rows {
            let mut query = sqlx::query(&statement);
            for value in row {
                query = query.bind(value);
            }
            query.execute(&self.pool).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    /// Staged tables only: everything in the public schema carrying the
    /// staging prefix. The underscore is escaped so LIKE treats it
    /// literally.
    pub async fn list_staged_tables(&self) -> Result<Vec<String>, AppError> {
        let pattern = format!("{}%", STAGING_TABLE_PREFIX.replace('_', "\\_"));
        let rows = sqlx::query(
            "SELECT tablename FROM pg_tables WHERE schemaname = 'public' AND tablename LIKE $1",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| row.get::<String, _>("tablename"))
            .collect())
    }

    pub async fn drop_staged_table(&self, table: &str) -> Result<(), AppError> {
        sqlx::query(&format!("DROP TABLE IF EXISTS \"{table}\" CASCADE"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn create_table_sql(table: &str, columns: &[String]) -> String {
    let column_defs = columns
        .iter()
        .map(|column| format!("\"{column}\" TEXT"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {table} (row_id BIGSERIAL PRIMARY KEY, {column_defs})")
}

fn insert_row_sql(table: &str, columns: &[String]) -> String {
    let column_list = columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|position| format!("${position}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {table} ({column_list}) VALUES ({placeholders})")
}
