//! SQLite quote store.

use crate::domain::error::TradesimError;
use crate::domain::quote::DailyQuote;
use crate::ports::config_port::ConfigPort;
use crate::ports::quote_port::QuoteSeriesProvider;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> TradesimError {
    TradesimError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn parse_stored_date(value: &str) -> Result<NaiveDate, TradesimError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|e| TradesimError::Database {
        reason: format!("stored date '{}' is invalid: {}", value, e),
    })
}

impl SqliteAdapter {
    /// Open the pool described by `[sqlite]`. The schema is created unless
    /// `create_schema = false`.
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, TradesimError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| TradesimError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let raw_pool_size = config.get_int("sqlite", "pool_size", 4);
        let pool_size = u32::try_from(raw_pool_size)
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| TradesimError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: format!("must be a positive integer, got {}", raw_pool_size),
            })?;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| TradesimError::Database {
                reason: format!("failed to open {}: {}", db_path, e),
            })?;

        let adapter = Self { pool };
        if config.get_bool("sqlite", "create_schema", true) {
            adapter.initialize_schema()?;
        }
        tracing::debug!(path = %db_path, pool_size, "opened sqlite quote store");
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, TradesimError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TradesimError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TradesimError> {
        self.pool.get().map_err(|e: r2d2::Error| TradesimError::Database {
            reason: e.to_string(),
        })
    }

    pub fn initialize_schema(&self) -> Result<(), TradesimError> {
        self.conn()?
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS quotes_daily (
                    date TEXT PRIMARY KEY,
                    close REAL NOT NULL,
                    fx_rate REAL,
                    vix REAL,
                    etf_volume REAL
                );",
            )
            .map_err(query_err)
    }

    /// Upsert `quotes` in a single transaction.
    pub fn insert_quotes(&self, quotes: &[DailyQuote]) -> Result<usize, TradesimError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        for q in quotes {
            tx.execute(
                "INSERT OR REPLACE INTO quotes_daily (date, close, fx_rate, vix, etf_volume)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    q.date.format(DATE_FORMAT).to_string(),
                    q.close,
                    q.fx_rate,
                    q.vix,
                    q.etf_volume
                ],
            )
            .map_err(query_err)?;
        }

        tx.commit().map_err(query_err)?;
        Ok(quotes.len())
    }
}

impl QuoteSeriesProvider for SqliteAdapter {
    fn fetch_quotes(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyQuote>, TradesimError> {
        let conn = self.conn()?;

        let mut stmt = conn
            .prepare(
                "SELECT date, close, fx_rate, vix, etf_volume
                 FROM quotes_daily
                 WHERE date >= ?1 AND date <= ?2
                 ORDER BY date ASC",
            )
            .map_err(query_err)?;

        let rows = stmt
            .query_map(
                params![
                    start_date.format(DATE_FORMAT).to_string(),
                    end_date.format(DATE_FORMAT).to_string()
                ],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                        row.get::<_, Option<f64>>(4)?,
                    ))
                },
            )
            .map_err(query_err)?;

        let mut quotes = Vec::new();
        for row in rows {
            let (date, close, fx_rate, vix, etf_volume) = row.map_err(query_err)?;
            quotes.push(DailyQuote {
                date: parse_stored_date(&date)?,
                close,
                fx_rate,
                vix,
                etf_volume,
            });
        }

        Ok(quotes)
    }

    fn data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TradesimError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM quotes_daily",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(min), Some(max), count) if count > 0 => Ok(Some((
                parse_stored_date(&min)?,
                parse_stored_date(&max)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}
