use crate::app::ports::DatasetSink;
use crate::error::Result;
use crate::types::{CrawlDataset, ReservationRecord, VenueRecord};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes the whole dataset as one JSON document, replacing any previous file.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DatasetSink for JsonFileSink {
    async fn persist(&self, dataset: &CrawlDataset) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(dataset)?;

        // Write beside the target and rename so readers never see a partial file.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        tokio::fs::write(&tmp, content).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Wrote dataset to {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// Relational sink with idempotent upserts keyed on
/// (facility_number, reservation_date, time_slot).
pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    /// Opens (creating if needed) the database and ensures the schema exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let sink = Self { path: path.into() };
        if let Some(parent) = sink.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        sink.connect()?;
        Ok(sink)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS facilities (
                facility_number TEXT PRIMARY KEY,
                district        TEXT NOT NULL,
                facility_name   TEXT NOT NULL,
                location_type   TEXT NOT NULL,
                capacity        TEXT NOT NULL,
                price           TEXT NOT NULL,
                url             TEXT NOT NULL,
                updated_at      TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS reservations (
                id               INTEGER PRIMARY KEY AUTOINCREMENT,
                facility_number  TEXT NOT NULL,
                reservation_date DATE NOT NULL,
                time_slot        TEXT NOT NULL,
                status           TEXT NOT NULL,
                created_at       TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                updated_at       TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(facility_number, reservation_date, time_slot)
            );
            "#,
        )?;
        Ok(conn)
    }

    /// Insert or update facilities and reservations in one transaction
    pub fn upsert(&self, facilities: &[VenueRecord], reservations: &[ReservationRecord]) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO facilities (facility_number, district, facility_name, location_type, capacity, price, url)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(facility_number) DO UPDATE SET
                    district=excluded.district, facility_name=excluded.facility_name,
                    location_type=excluded.location_type, capacity=excluded.capacity,
                    price=excluded.price, url=excluded.url, updated_at=CURRENT_TIMESTAMP",
            )?;
            for f in facilities {
                stmt.execute(params![
                    f.facility_number,
                    f.district,
                    f.name,
                    f.location_type,
                    f.capacity,
                    f.price,
                    f.url
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO reservations (facility_number, reservation_date, time_slot, status)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(facility_number, reservation_date, time_slot) DO UPDATE SET
                    status=excluded.status, updated_at=CURRENT_TIMESTAMP",
            )?;
            for r in reservations {
                stmt.execute(params![
                    r.facility_number,
                    r.date.format("%Y-%m-%d").to_string(),
                    r.time_slot.to_string(),
                    r.status.as_str()
                ])?;
            }
        }
        tx.commit()?;
        debug!(
            "Upserted {} facilities and {} reservations into {}",
            facilities.len(),
            reservations.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn reservation_count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM reservations", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// (time_slot, status) rows for one venue-date, ordered by slot
    pub fn slots_for(&self, facility_number: &str, date: &str) -> Result<Vec<(String, String)>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT time_slot, status FROM reservations
             WHERE facility_number = ?1 AND reservation_date = ?2
             ORDER BY time_slot",
        )?;
        let rows = stmt.query_map(params![facility_number, date], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[async_trait]
impl DatasetSink for SqliteSink {
    async fn persist(&self, dataset: &CrawlDataset) -> Result<()> {
        let sink = SqliteSink {
            path: self.path.clone(),
        };
        let facilities = dataset.facilities.clone();
        let reservations = dataset.reservations.clone();
        tokio::task::spawn_blocking(move || sink.upsert(&facilities, &reservations)).await?
    }

    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }
}
