#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use uptime_archiver::app::{ProgressEvent, ProgressSink};
use uptime_archiver::archive::Cooldown;
use uptime_archiver::domain::UptimeWindow;
use uptime_archiver::error::ArchiverError;
use uptime_archiver::grid::{CellRef, Dimension, RangeRef, SheetsClient, TabProperties};
use uptime_archiver::nodeping::{Check, ContactGroup, NodepingClient, UptimeEntry};

pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Default)]
pub struct CountingCooldown {
    pauses: Mutex<Vec<Duration>>,
}

impl CountingCooldown {
    pub fn count(&self) -> usize {
        self.pauses.lock().unwrap().len()
    }
}

impl Cooldown for CountingCooldown {
    fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridCall {
    CreateTab(String),
    Insert(Dimension, usize),
    Append(Dimension, usize),
    Write(CellRef, String),
}

#[derive(Debug, Clone)]
struct MemoryTab {
    properties: TabProperties,
    cells: Vec<Vec<String>>,
}

/// In-memory spreadsheet with Sheets-like insert, append and read semantics.
#[derive(Default)]
pub struct MemoryGrid {
    tabs: Mutex<Vec<MemoryTab>>,
    calls: Mutex<Vec<GridCall>>,
    pub reject_create: bool,
    pub lose_created_tabs: bool,
    pub reject_writes_from: Option<usize>,
}

impl MemoryGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tab sized like a fresh Sheets tab (1000 x 26).
    pub fn with_tab(self, title: &str, rows: &[&[&str]]) -> Self {
        self.with_sized_tab(title, rows, 1000, 26)
    }

    pub fn with_sized_tab(
        self,
        title: &str,
        rows: &[&[&str]],
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let cells = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        {
            let mut tabs = self.tabs.lock().unwrap();
            let id = 100 + tabs.len() as i64;
            tabs.push(MemoryTab {
                properties: TabProperties {
                    id,
                    title: title.to_string(),
                    row_count,
                    column_count,
                },
                cells,
            });
        }
        self
    }

    pub fn calls(&self) -> Vec<GridCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn structural_calls(&self) -> Vec<GridCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, GridCall::Insert(..) | GridCall::Append(..)))
            .collect()
    }

    pub fn tab_properties(&self, title: &str) -> Option<TabProperties> {
        self.tabs
            .lock()
            .unwrap()
            .iter()
            .find(|tab| tab.properties.title == title)
            .map(|tab| tab.properties.clone())
    }

    pub fn cell(&self, title: &str, row: usize, column: usize) -> String {
        let tabs = self.tabs.lock().unwrap();
        tabs.iter()
            .find(|tab| tab.properties.title == title)
            .and_then(|tab| tab.cells.get(row))
            .and_then(|cells| cells.get(column))
            .cloned()
            .unwrap_or_default()
    }

    /// Non-blank values of `column` from `from_row` down to the last used row.
    pub fn column(&self, title: &str, column: usize, from_row: usize) -> Vec<String> {
        let rows = self
            .tabs
            .lock()
            .unwrap()
            .iter()
            .find(|tab| tab.properties.title == title)
            .map(|tab| tab.cells.len())
            .unwrap_or(0);
        (from_row..rows)
            .map(|row| self.cell(title, row, column))
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Non-blank values of `row` from `from_column` rightwards.
    pub fn row(&self, title: &str, row: usize, from_column: usize) -> Vec<String> {
        let width = self
            .tabs
            .lock()
            .unwrap()
            .iter()
            .find(|tab| tab.properties.title == title)
            .and_then(|tab| tab.cells.get(row))
            .map(|cells| cells.len())
            .unwrap_or(0);
        (from_column..width)
            .map(|column| self.cell(title, row, column))
            .filter(|value| !value.is_empty())
            .collect()
    }

    pub fn snapshot(&self, title: &str) -> Vec<Vec<String>> {
        let tabs = self.tabs.lock().unwrap();
        let mut cells = tabs
            .iter()
            .find(|tab| tab.properties.title == title)
            .map(|tab| tab.cells.clone())
            .unwrap_or_default();
        for row in cells.iter_mut() {
            while row.last().is_some_and(|cell| cell.is_empty()) {
                row.pop();
            }
        }
        while cells.last().is_some_and(|row| row.is_empty()) {
            cells.pop();
        }
        cells
    }

    fn record(&self, call: GridCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn write_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, GridCall::Write(..)))
            .count()
    }
}

fn rejected(message: &str) -> ArchiverError {
    ArchiverError::SheetsStatus {
        status: 400,
        message: message.to_string(),
    }
}

impl SheetsClient for MemoryGrid {
    fn find_tab(&self, title: &str) -> Result<Option<TabProperties>, ArchiverError> {
        Ok(self.tab_properties(title))
    }

    fn create_tab(&self, title: &str) -> Result<(), ArchiverError> {
        self.record(GridCall::CreateTab(title.to_string()));
        if self.reject_create {
            return Err(rejected("addSheet rejected"));
        }
        if self.lose_created_tabs {
            return Ok(());
        }
        let mut tabs = self.tabs.lock().unwrap();
        if tabs.iter().any(|tab| tab.properties.title == title) {
            return Err(rejected("duplicate sheet name"));
        }
        let id = 100 + tabs.len() as i64;
        tabs.push(MemoryTab {
            properties: TabProperties {
                id,
                title: title.to_string(),
                row_count: 1000,
                column_count: 26,
            },
            cells: Vec::new(),
        });
        Ok(())
    }

    fn read_range(&self, tab: &str, range: RangeRef) -> Result<Vec<Vec<String>>, ArchiverError> {
        let tabs = self.tabs.lock().unwrap();
        let memory = tabs
            .iter()
            .find(|candidate| candidate.properties.title == tab)
            .ok_or_else(|| rejected("unable to parse range"))?;

        let last_row = match range.end_row {
            Some(end) => end.min(memory.cells.len().saturating_sub(1)),
            None => memory.cells.len().saturating_sub(1),
        };
        let mut rows = Vec::new();
        if !memory.cells.is_empty() {
            for row in range.start.row..=last_row {
                let Some(cells) = memory.cells.get(row) else {
                    rows.push(Vec::new());
                    continue;
                };
                let mut values: Vec<String> = cells
                    .iter()
                    .enumerate()
                    .filter(|(column, _)| range.contains(CellRef::new(row, *column)))
                    .map(|(_, value)| value.clone())
                    .collect();
                while values.last().is_some_and(|value| value.is_empty()) {
                    values.pop();
                }
                rows.push(values);
            }
        }
        while rows.last().is_some_and(|row| row.is_empty()) {
            rows.pop();
        }
        Ok(rows)
    }

    fn write_cell(&self, tab: &str, cell: CellRef, value: &str) -> Result<(), ArchiverError> {
        if self
            .reject_writes_from
            .is_some_and(|limit| self.write_count() >= limit)
        {
            return Err(rejected("quota exceeded"));
        }
        self.record(GridCall::Write(cell, value.to_string()));
        let mut tabs = self.tabs.lock().unwrap();
        let memory = tabs
            .iter_mut()
            .find(|candidate| candidate.properties.title == tab)
            .ok_or_else(|| rejected("unable to parse range"))?;
        if cell.row >= memory.properties.row_count || cell.column >= memory.properties.column_count
        {
            return Err(rejected("range exceeds grid limits"));
        }
        if memory.cells.len() <= cell.row {
            memory.cells.resize(cell.row + 1, Vec::new());
        }
        let row = &mut memory.cells[cell.row];
        if row.len() <= cell.column {
            row.resize(cell.column + 1, String::new());
        }
        row[cell.column] = value.to_string();
        Ok(())
    }

    fn insert_dimension(
        &self,
        tab_id: i64,
        dimension: Dimension,
        index: usize,
    ) -> Result<(), ArchiverError> {
        self.record(GridCall::Insert(dimension, index));
        let mut tabs = self.tabs.lock().unwrap();
        let memory = tabs
            .iter_mut()
            .find(|candidate| candidate.properties.id == tab_id)
            .ok_or_else(|| rejected("no grid with id"))?;
        match dimension {
            Dimension::Rows => {
                if index >= memory.properties.row_count {
                    return Err(rejected("insert past grid end"));
                }
                if index < memory.cells.len() {
                    memory.cells.insert(index, Vec::new());
                }
                memory.properties.row_count += 1;
            }
            Dimension::Columns => {
                if index >= memory.properties.column_count {
                    return Err(rejected("insert past grid end"));
                }
                for row in memory.cells.iter_mut() {
                    if index < row.len() {
                        row.insert(index, String::new());
                    }
                }
                memory.properties.column_count += 1;
            }
        }
        Ok(())
    }

    fn append_dimension(
        &self,
        tab_id: i64,
        dimension: Dimension,
        count: usize,
    ) -> Result<(), ArchiverError> {
        self.record(GridCall::Append(dimension, count));
        let mut tabs = self.tabs.lock().unwrap();
        let memory = tabs
            .iter_mut()
            .find(|candidate| candidate.properties.id == tab_id)
            .ok_or_else(|| rejected("no grid with id"))?;
        match dimension {
            Dimension::Rows => memory.properties.row_count += count,
            Dimension::Columns => memory.properties.column_count += count,
        }
        Ok(())
    }
}

/// NodePing double serving fixed groups, checks and uptimes.
#[derive(Default)]
pub struct MockNodeping {
    pub groups: HashMap<String, ContactGroup>,
    pub checks: Vec<Check>,
    pub uptimes: HashMap<String, f64>,
    pub failing_checks: Vec<String>,
    pub requests: Mutex<Vec<String>>,
}

impl MockNodeping {
    pub fn with_group(mut self, id: &str, name: &str) -> Self {
        self.groups.insert(
            id.to_string(),
            ContactGroup {
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_check(mut self, id: &str, label: &str, group_id: &str, uptime: f64) -> Self {
        let mut notification = HashMap::new();
        notification.insert(
            group_id.to_string(),
            serde_json::json!({ "delay": 0, "schedule": "All" }),
        );
        self.checks.push(Check {
            id: id.to_string(),
            label: label.to_string(),
            notifications: vec![notification],
        });
        self.uptimes.insert(id.to_string(), uptime);
        self
    }
}

impl NodepingClient for MockNodeping {
    fn list_contact_groups(&self) -> Result<HashMap<String, ContactGroup>, ArchiverError> {
        self.requests.lock().unwrap().push("contactgroups".to_string());
        Ok(self.groups.clone())
    }

    fn list_checks(&self) -> Result<Vec<Check>, ArchiverError> {
        self.requests.lock().unwrap().push("checks".to_string());
        Ok(self.checks.clone())
    }

    fn get_uptime(
        &self,
        check_id: &str,
        _window: &UptimeWindow,
    ) -> Result<HashMap<String, UptimeEntry>, ArchiverError> {
        self.requests.lock().unwrap().push(format!("uptime/{check_id}"));
        if self.failing_checks.iter().any(|id| id == check_id) {
            return Err(ArchiverError::NodepingStatus {
                status: 500,
                message: "internal error".to_string(),
            });
        }
        let mut entries = HashMap::new();
        if let Some(uptime) = self.uptimes.get(check_id) {
            entries.insert("total".to_string(), UptimeEntry { uptime: *uptime });
        }
        Ok(entries)
    }
}
