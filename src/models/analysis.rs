use serde_json::{json, Map, Value};

pub type Row = Map<String, Value>;

/// Ordered output of one named query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTable {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl QueryTable {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order
    pub fn column(&self, name: &str) -> Vec<&Value> {
        self.rows.iter().filter_map(|r| r.get(name)).collect()
    }

    /// Plain-text rendering for the terminal
    pub fn render(&self) -> String {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| match row.get(c) {
                        Some(Value::String(s)) => s.clone(),
                        Some(Value::Null) | None => "-".to_string(),
                        Some(other) => other.to_string(),
                    })
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                cells
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(c.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let format_line = |values: Vec<&str>| {
            values
                .iter()
                .zip(&widths)
                .map(|(v, w)| format!("{:<width$}", v, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };

        let mut out = format!("=== {} ===\n", self.name);
        out.push_str(&format_line(self.columns.iter().map(String::as_str).collect()));
        out.push('\n');
        for row in &cells {
            out.push_str(&format_line(row.iter().map(String::as_str).collect()));
            out.push('\n');
        }
        out
    }
}

/// The five query outputs of one analysis run, in execution order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResultSet {
    tables: Vec<QueryTable>,
}

impl QueryResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, table: QueryTable) {
        self.tables.push(table);
    }

    pub fn get(&self, name: &str) -> Option<&QueryTable> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn tables(&self) -> &[QueryTable] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Mapping of query name to its ordered rows
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .tables
            .iter()
            .map(|t| {
                let rows = t.rows.iter().cloned().map(Value::Object).collect();
                (t.name.clone(), Value::Array(rows))
            })
            .collect();
        Value::Object(map)
    }
}

/// Whatever reached the save step of an analysis run
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisPayload {
    Success(QueryResultSet),
    RawText(String),
    Absent,
}

impl AnalysisPayload {
    /// Wrap an opaque hand-off value (e.g. a file that may not exist)
    pub fn from_handoff(text: Option<String>) -> Self {
        match text {
            Some(t) => AnalysisPayload::RawText(t),
            None => AnalysisPayload::Absent,
        }
    }

    /// The JSON object written to the results artifact. Never fails: a text
    /// payload that is a JSON object is kept as-is, anything else is wrapped.
    pub fn to_artifact(&self) -> Value {
        match self {
            AnalysisPayload::Success(results) => results.to_json(),
            AnalysisPayload::RawText(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Object(map)) => Value::Object(map),
                _ => json!({ "raw_data": text }),
            },
            AnalysisPayload::Absent => json!({ "error": "No results data available" }),
        }
    }
}
