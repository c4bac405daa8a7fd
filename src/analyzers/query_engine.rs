use crate::error::Result;
use crate::models::{FinalRecord, QueryResultSet, QueryTable, Row};
use crate::utils::constants::*;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection};
use serde_json::{Number, Value};
use std::path::Path;
use tracing::{debug, info};

/// One of the fixed summary queries run against the weather table
#[derive(Debug, Clone, Copy)]
pub struct AnalyticalQuery {
    pub name: &'static str,
    pub description: &'static str,
    pub sql: &'static str,
}

/// The summary queries, in execution order. Extreme-value queries break ties
/// on insertion order.
pub const QUERIES: [AnalyticalQuery; 5] = [
    AnalyticalQuery {
        name: QUERY_AVG_TEMP_BY_STATION_YEAR,
        description: "Average temperature by station and year",
        sql: "SELECT station_name,
                     substr(date_month, 1, 4) AS year,
                     round(avg(temperature_celsius_avg), 2) AS avg_temperature
              FROM weather_data
              GROUP BY station_name, year
              ORDER BY station_name, year",
    },
    AnalyticalQuery {
        name: QUERY_MONTHLY_TEMP_VARIATIONS,
        description: "Monthly temperature variations",
        sql: "SELECT station_name,
                     substr(date_month, 6, 2) AS month,
                     round(avg(temperature_celsius_max - temperature_celsius_min), 2) AS avg_daily_variation
              FROM weather_data
              GROUP BY station_name, month
              ORDER BY station_name, month",
    },
    AnalyticalQuery {
        name: QUERY_YOY_TEMP_CHANGE,
        description: "Year-over-year temperature change",
        sql: "SELECT station_name,
                     substr(date_month, 6, 2) AS month,
                     round(avg(temperature_celsius_yoy_avg), 2) AS avg_yoy_change
              FROM weather_data
              WHERE temperature_celsius_yoy_avg IS NOT NULL
              GROUP BY station_name, month
              ORDER BY station_name, month",
    },
    AnalyticalQuery {
        name: QUERY_EXTREME_HIGH_TEMPS,
        description: "Most extreme temperature months (highest max)",
        sql: "SELECT station_name,
                     date_month,
                     temperature_celsius_max AS max_temperature
              FROM weather_data
              ORDER BY temperature_celsius_max DESC, rowid
              LIMIT 10",
    },
    AnalyticalQuery {
        name: QUERY_EXTREME_LOW_TEMPS,
        description: "Most extreme temperature months (lowest min)",
        sql: "SELECT station_name,
                     date_month,
                     temperature_celsius_min AS min_temperature
              FROM weather_data
              ORDER BY temperature_celsius_min ASC, rowid
              LIMIT 10",
    },
];

const CREATE_TABLE: &str = "
    DROP TABLE IF EXISTS weather_data;
    CREATE TABLE weather_data (
        station_name                TEXT NOT NULL,
        climate_id                  TEXT NOT NULL,
        latitude                    REAL NOT NULL,
        longitude                   REAL NOT NULL,
        date_month                  TEXT NOT NULL,
        feature_id                  TEXT NOT NULL,
        map                         TEXT NOT NULL,
        temperature_celsius_avg     REAL NOT NULL,
        temperature_celsius_min     REAL NOT NULL,
        temperature_celsius_max     REAL NOT NULL,
        temperature_celsius_yoy_avg REAL
    );";

const INSERT_ROW: &str = "INSERT INTO weather_data VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

/// SQLite-backed store the final dataset is loaded into for analysis
pub struct QueryEngine {
    conn: Connection,
}

impl QueryEngine {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self {
            conn: Connection::open(db_path)?,
        })
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Replace the weather table with `records`
    pub fn load(&mut self, records: &[FinalRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(CREATE_TABLE)?;
        {
            let mut stmt = tx.prepare(INSERT_ROW)?;
            for r in records {
                stmt.execute(params![
                    r.station_name,
                    r.climate_id,
                    r.latitude,
                    r.longitude,
                    r.date_month,
                    r.feature_id,
                    r.map,
                    r.temperature_celsius_avg,
                    r.temperature_celsius_min,
                    r.temperature_celsius_max,
                    r.temperature_celsius_yoy_avg,
                ])?;
            }
        }
        tx.commit()?;

        info!("Loaded {} rows into {}", records.len(), WEATHER_TABLE);
        Ok(records.len())
    }

    /// Run every summary query in order
    pub fn run_all(&self) -> Result<QueryResultSet> {
        let mut results = QueryResultSet::new();
        for query in &QUERIES {
            info!("Running query {}: {}", query.name, query.description);
            let table = self.run_query(query)?;
            debug!("{} returned {} rows", query.name, table.len());
            results.push(table);
        }
        Ok(results)
    }

    pub fn run_query(&self, query: &AnalyticalQuery) -> Result<QueryTable> {
        let mut stmt = self.conn.prepare(query.sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let rows = stmt
            .query_map([], |row| {
                let mut out = Row::new();
                for (idx, name) in columns.iter().enumerate() {
                    let value: SqlValue = row.get(idx)?;
                    out.insert(name.clone(), to_json(value));
                }
                Ok(out)
            })?
            .collect::<rusqlite::Result<Vec<Row>>>()?;

        let mut table = QueryTable::new(query.name, columns);
        table.rows = rows;
        Ok(table)
    }

    /// Load `records` and run the summary queries on them
    pub fn analyze(&mut self, records: &[FinalRecord]) -> Result<QueryResultSet> {
        self.load(records)?;
        self.run_all()
    }
}

fn to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
    }
}
