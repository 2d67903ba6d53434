use super::EventRecord;
use crate::{utils, CrawlerError, Sink, Table};
use sqlx::{sqlite::SqliteConnectOptions, Row, SqlitePool};
use std::path::Path;

pub struct EventRecordTable {
    name: String,
    pool: SqlitePool,
}

#[async_trait::async_trait]
impl Table for EventRecordTable {
    type Record<'a> = (&'a str, i64, &'a EventRecord);

    fn get_name(&self) -> &str {
        self.name.as_str()
    }

    fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create(&self) -> Result<(), sqlx::Error> {
        let query = format!(
            r#"
                    CREATE TABLE {} (
                        id INTEGER PRIMARY KEY AUTOINCREMENT,
                        url TEXT,
                        position INTEGER,
                        title TEXT,
                        description TEXT,
                        created_at DATETIME
                    )
                "#,
            &self.name
        );
        sqlx::query(query.as_str()).execute(self.get_pool()).await?;
        Ok(())
    }

    async fn insert<'a>(
        &self,
        (url, position, record): Self::Record<'a>,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.get_pool().begin().await?;
        let query = format!(
            r#"INSERT INTO {} (
                url,
                position,
                title,
                description,
                created_at) VALUES (?, ?, ?, ?, ?)"#,
            self.name
        );
        sqlx::query(&query)
            .bind(url.trim())
            .bind(position)
            .bind(record.title.as_deref())
            .bind(record.description.as_str())
            .bind(utils::get_now())
            .execute(&mut tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// SQLite feed: records land in `<name>_results`.
pub struct EventsData {
    pub results: EventRecordTable,
    pool: SqlitePool,
}

impl EventsData {
    pub async fn new<P: AsRef<Path>>(
        path: P,
        name: &str,
        overwrite: bool,
    ) -> Result<EventsData, CrawlerError> {
        let opt = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(opt).await?;
        let p = EventsData {
            results: EventRecordTable {
                name: format!("{}_results", name),
                pool: pool.clone(),
            },
            pool,
        };

        if !utils::is_table_exists(&p.pool, &p.results.name).await? {
            tracing::debug!("Create table {}", p.results.name);
            p.results.create().await?;
        } else if overwrite {
            tracing::debug!("Clear table {}", p.results.name);
            p.results.clear().await?;
        } else {
            tracing::debug!("Use table {}", p.results.name);
        }

        Ok(p)
    }

    pub async fn results_get(&self) -> Result<Vec<EventRecord>, CrawlerError> {
        let mut records = vec![];
        let query = format!(
            "SELECT title, description FROM {} ORDER BY id",
            self.results.name
        );
        for row in sqlx::query(&query).fetch_all(&self.pool).await? {
            records.push(EventRecord {
                title: row.try_get("title")?,
                description: row.try_get("description")?,
            });
        }
        Ok(records)
    }
}

#[async_trait::async_trait]
impl Sink for EventsData {
    type Record = EventRecord;

    async fn insert(&mut self, url: &str, records: Vec<EventRecord>) -> Result<usize, CrawlerError> {
        for (position, record) in records.iter().enumerate() {
            self.results.insert((url, position as i64, record)).await?;
        }
        Ok(records.len())
    }

    async fn finish(&mut self) -> Result<(), CrawlerError> {
        self.pool.close().await;
        Ok(())
    }
}
