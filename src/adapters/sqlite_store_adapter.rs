//! SQLite trigger/alert store adapter.

use crate::domain::alert::Alert;
use crate::domain::error::LaddersimError;
use crate::domain::trigger::Trigger;
use crate::domain::user::User;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use chrono::{DateTime, NaiveDateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

const TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct SqliteStoreAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteStoreAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, LaddersimError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| LaddersimError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e: r2d2::Error| LaddersimError::Store {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, LaddersimError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| LaddersimError::Store {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), LaddersimError> {
        let conn = self.conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                channel_id TEXT NOT NULL,
                broker_token TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS triggers (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                instrument TEXT,
                reference TEXT NOT NULL,
                direction TEXT NOT NULL,
                threshold REAL NOT NULL
            );
            CREATE TABLE IF NOT EXISTS alerts (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                trigger_id INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_triggers_user ON triggers(user_id);
            CREATE INDEX IF NOT EXISTS idx_alerts_trigger ON alerts(trigger_id);
            CREATE INDEX IF NOT EXISTS idx_alerts_user ON alerts(user_id);",
        )
        .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
            reason: e.to_string(),
        })?;
        Ok(())
    }

    pub fn insert_user(
        &self,
        username: &str,
        channel_id: &str,
        broker_token: &str,
    ) -> Result<i64, LaddersimError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, channel_id, broker_token) VALUES (?1, ?2, ?3)",
            params![username, channel_id, broker_token],
        )
        .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
            reason: e.to_string(),
        })?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_trigger(
        &self,
        user_id: i64,
        instrument: Option<&str>,
        reference: &str,
        direction: &str,
        threshold: f64,
    ) -> Result<i64, LaddersimError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO triggers (user_id, instrument, reference, direction, threshold)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, instrument, reference, direction, threshold],
        )
        .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
            reason: e.to_string(),
        })?;
        Ok(conn.last_insert_rowid())
    }

    fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, LaddersimError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| LaddersimError::Store {
                reason: e.to_string(),
            })
    }
}

fn parse_ts(value: &str) -> Result<DateTime<Utc>, LaddersimError> {
    NaiveDateTime::parse_from_str(value, TS_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|e| LaddersimError::StoreQuery {
            reason: format!("invalid timestamp '{value}': {e}"),
        })
}

fn collect_alerts(
    rows: Vec<(i64, i64, i64, String)>,
) -> Result<Vec<Alert>, LaddersimError> {
    rows.into_iter()
        .map(|(id, user_id, trigger_id, created_at)| {
            Ok(Alert {
                id,
                user_id,
                trigger_id,
                created_at: parse_ts(&created_at)?,
            })
        })
        .collect()
}

impl StorePort for SqliteStoreAdapter {
    fn users(&self) -> Result<Vec<User>, LaddersimError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT id, username, channel_id, broker_token FROM users ORDER BY id")
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(User {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    channel_id: row.get(2)?,
                    broker_token: row.get(3)?,
                })
            })
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?);
        }
        Ok(users)
    }

    fn triggers_for_user(&self, user_id: i64) -> Result<Vec<Trigger>, LaddersimError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, instrument, reference, direction, threshold
                 FROM triggers WHERE user_id = ?1 ORDER BY id",
            )
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                ))
            })
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let mut triggers = Vec::new();
        for row in rows {
            let (id, user_id, instrument, reference, direction, threshold) =
                row.map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                    reason: e.to_string(),
                })?;
            // Unknown codes are a configuration error, fatal at first read.
            triggers.push(Trigger {
                id,
                user_id,
                instrument,
                reference: reference.parse()?,
                direction: direction.parse()?,
                threshold,
            });
        }
        Ok(triggers)
    }

    fn delete_triggers_for_instrument(
        &self,
        user_id: i64,
        instrument: &str,
    ) -> Result<(), LaddersimError> {
        let conn = self.conn()?;
        conn.execute(
            "DELETE FROM triggers WHERE user_id = ?1 AND instrument = ?2",
            params![user_id, instrument],
        )
        .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
            reason: e.to_string(),
        })?;
        Ok(())
    }

    fn alerts_for_trigger(&self, trigger_id: i64) -> Result<Vec<Alert>, LaddersimError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, trigger_id, created_at
                 FROM alerts WHERE trigger_id = ?1 ORDER BY created_at DESC",
            )
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![trigger_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let mut raw = Vec::new();
        for row in rows {
            raw.push(row.map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?);
        }
        collect_alerts(raw)
    }

    fn recent_alerts_for_user(
        &self,
        user_id: i64,
        limit: usize,
    ) -> Result<Vec<Alert>, LaddersimError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, trigger_id, created_at
                 FROM alerts WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
            )
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let rows = stmt
            .query_map(params![user_id, limit as i64], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })
            .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?;

        let mut raw = Vec::new();
        for row in rows {
            raw.push(row.map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
                reason: e.to_string(),
            })?);
        }
        collect_alerts(raw)
    }

    fn record_alert(
        &self,
        user_id: i64,
        trigger_id: i64,
        created_at: DateTime<Utc>,
    ) -> Result<(), LaddersimError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO alerts (user_id, trigger_id, created_at) VALUES (?1, ?2, ?3)",
            params![
                user_id,
                trigger_id,
                created_at.format(TS_FORMAT).to_string()
            ],
        )
        .map_err(|e: rusqlite::Error| LaddersimError::StoreQuery {
            reason: e.to_string(),
        })?;
        Ok(())
    }
}
