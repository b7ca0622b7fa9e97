//! In-memory storage of systems and their reduced reports.
//!
//! Raw sample lists are not kept here; a report stores one reduced scalar
//! per metric plus the original document text. Reports are immutable once
//! inserted, so readers share them via `Arc`.

use crate::ingest::IngestedReport;
use crate::report::StoredMetric;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A registered machine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub name: String,
    #[serde(default)]
    pub owner_email: String,
    #[serde(default)]
    pub operating_system: String,
    #[serde(default)]
    pub processor: String,
    #[serde(default)]
    pub graphics: String,
    #[serde(default)]
    pub notes: String,
}

/// A stored report: reduced metrics plus the raw uploaded document.
#[derive(Debug)]
pub struct Report {
    pub id: u64,
    pub date: NaiveDateTime,
    pub metrics: BTreeMap<String, StoredMetric>,
    pub raw: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown system '{0}'")]
    UnknownSystem(String),
    #[error("a system named '{0}' already exists")]
    DuplicateSystem(String),
    #[error("system name must not be empty")]
    EmptyName,
    #[error("unknown report {1} for system '{0}'")]
    UnknownReport(String, u64),
}

#[derive(Default)]
pub struct Store {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    systems: BTreeMap<String, SystemEntry>,
    next_report_id: u64,
}

struct SystemEntry {
    info: SystemInfo,
    reports: Vec<Arc<Report>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Check that `name` is usable for a system. `existing_ok` names the one
    /// entry allowed to already hold it (the system being renamed onto
    /// itself); uniqueness against everything else still applies.
    fn validate_name(inner: &Inner, name: &str, existing_ok: Option<&str>) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        if existing_ok == Some(name) {
            return Ok(());
        }
        if inner.systems.contains_key(name) {
            return Err(StoreError::DuplicateSystem(name.to_string()));
        }
        Ok(())
    }

    pub fn register_system(&self, info: SystemInfo) -> Result<(), StoreError> {
        let mut inner = self.write();
        Self::validate_name(&inner, &info.name, None)?;
        inner.systems.insert(
            info.name.clone(),
            SystemEntry {
                info,
                reports: Vec::new(),
            },
        );
        Ok(())
    }

    /// Replace a system's details, possibly renaming it.
    pub fn update_system(&self, name: &str, info: SystemInfo) -> Result<(), StoreError> {
        let mut inner = self.write();
        if !inner.systems.contains_key(name) {
            return Err(StoreError::UnknownSystem(name.to_string()));
        }
        Self::validate_name(&inner, &info.name, Some(name))?;
        if let Some(mut entry) = inner.systems.remove(name) {
            entry.info = info.clone();
            inner.systems.insert(info.name, entry);
        }
        Ok(())
    }

    /// All systems in name order, with their report counts.
    pub fn list_systems(&self) -> Vec<(SystemInfo, usize)> {
        self.read()
            .systems
            .values()
            .map(|entry| (entry.info.clone(), entry.reports.len()))
            .collect()
    }

    pub fn system(&self, name: &str) -> Result<SystemInfo, StoreError> {
        self.read()
            .systems
            .get(name)
            .map(|entry| entry.info.clone())
            .ok_or_else(|| StoreError::UnknownSystem(name.to_string()))
    }

    pub fn insert_report(
        &self,
        system: &str,
        ingested: IngestedReport,
    ) -> Result<Arc<Report>, StoreError> {
        let mut inner = self.write();
        if !inner.systems.contains_key(system) {
            return Err(StoreError::UnknownSystem(system.to_string()));
        }
        inner.next_report_id += 1;
        let report = Arc::new(Report {
            id: inner.next_report_id,
            date: ingested.date,
            metrics: ingested.metrics,
            raw: ingested.raw,
        });
        if let Some(entry) = inner.systems.get_mut(system) {
            entry.reports.push(Arc::clone(&report));
        }
        Ok(report)
    }

    /// A system's reports, newest first, id and date only.
    pub fn list_reports(&self, system: &str) -> Result<Vec<(u64, NaiveDateTime)>, StoreError> {
        let inner = self.read();
        let entry = inner
            .systems
            .get(system)
            .ok_or_else(|| StoreError::UnknownSystem(system.to_string()))?;
        let mut reports: Vec<_> = entry.reports.iter().map(|r| (r.id, r.date)).collect();
        reports.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(reports)
    }

    /// Up to `limit` of a system's most recent reports, newest first.
    pub fn recent_reports(&self, system: &str, limit: usize) -> Result<Vec<Arc<Report>>, StoreError> {
        let inner = self.read();
        let entry = inner
            .systems
            .get(system)
            .ok_or_else(|| StoreError::UnknownSystem(system.to_string()))?;
        let mut reports = entry.reports.clone();
        reports.sort_by(|a, b| b.date.cmp(&a.date));
        reports.truncate(limit);
        Ok(reports)
    }

    pub fn get_report(&self, system: &str, id: u64) -> Result<Arc<Report>, StoreError> {
        let inner = self.read();
        let entry = inner
            .systems
            .get(system)
            .ok_or_else(|| StoreError::UnknownSystem(system.to_string()))?;
        entry
            .reports
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| StoreError::UnknownReport(system.to_string(), id))
    }

    /// The latest report of each system that has one, newest first, bounded
    /// by `max_systems`.
    pub fn overview_reports(&self, max_systems: usize) -> Vec<(String, Arc<Report>)> {
        let inner = self.read();
        let mut latest: Vec<(String, Arc<Report>)> = inner
            .systems
            .iter()
            .filter_map(|(name, entry)| {
                entry
                    .reports
                    .iter()
                    .max_by_key(|r| r.date)
                    .map(|r| (name.clone(), Arc::clone(r)))
            })
            .collect();
        latest.sort_by(|a, b| b.1.date.cmp(&a.1.date));
        latest.truncate(max_systems);
        latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::ingest;

    fn info(name: &str) -> SystemInfo {
        SystemInfo {
            name: name.to_string(),
            owner_email: String::new(),
            operating_system: String::new(),
            processor: String::new(),
            graphics: String::new(),
            notes: String::new(),
        }
    }

    fn report(date: &str) -> IngestedReport {
        ingest(&format!(
            r#"{{ "date": "{date}", "metrics": {{
                "redraw_time": {{ "units": "ms", "values": [10.0, 12.0] }}
            }} }}"#
        ))
        .unwrap()
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let store = Store::new();
        store.register_system(info("laptop")).unwrap();
        assert_eq!(
            store.register_system(info("laptop")),
            Err(StoreError::DuplicateSystem("laptop".to_string()))
        );
    }

    #[test]
    fn test_register_rejects_empty_name() {
        let store = Store::new();
        assert_eq!(store.register_system(info("  ")), Err(StoreError::EmptyName));
    }

    #[test]
    fn test_update_keeps_own_name() {
        let store = Store::new();
        store.register_system(info("laptop")).unwrap();

        let mut updated = info("laptop");
        updated.notes = "new GPU".to_string();
        store.update_system("laptop", updated).unwrap();
        assert_eq!(store.system("laptop").unwrap().notes, "new GPU");
    }

    #[test]
    fn test_update_rename_checks_uniqueness() {
        let store = Store::new();
        store.register_system(info("laptop")).unwrap();
        store.register_system(info("desktop")).unwrap();

        assert_eq!(
            store.update_system("laptop", info("desktop")),
            Err(StoreError::DuplicateSystem("desktop".to_string()))
        );

        store.update_system("laptop", info("workstation")).unwrap();
        assert!(store.system("workstation").is_ok());
        assert_eq!(
            store.system("laptop").unwrap_err(),
            StoreError::UnknownSystem("laptop".to_string())
        );
    }

    #[test]
    fn test_rename_keeps_reports() {
        let store = Store::new();
        store.register_system(info("laptop")).unwrap();
        store
            .insert_report("laptop", report("2026-08-01T00:00:00"))
            .unwrap();

        store.update_system("laptop", info("workstation")).unwrap();
        assert_eq!(store.list_reports("workstation").unwrap().len(), 1);
    }

    #[test]
    fn test_insert_report_unknown_system() {
        let store = Store::new();
        assert!(matches!(
            store.insert_report("ghost", report("2026-08-01T00:00:00")),
            Err(StoreError::UnknownSystem(_))
        ));
    }

    #[test]
    fn test_report_ids_are_unique_across_systems() {
        let store = Store::new();
        store.register_system(info("a")).unwrap();
        store.register_system(info("b")).unwrap();
        let first = store.insert_report("a", report("2026-08-01T00:00:00")).unwrap();
        let second = store.insert_report("b", report("2026-08-02T00:00:00")).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_recent_reports_newest_first_bounded() {
        let store = Store::new();
        store.register_system(info("laptop")).unwrap();
        for day in ["01", "03", "02"] {
            store
                .insert_report("laptop", report(&format!("2026-08-{day}T00:00:00")))
                .unwrap();
        }

        let recent = store.recent_reports("laptop", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent[0].date > recent[1].date);
        assert_eq!(recent[0].date.format("%d").to_string(), "03");
    }

    #[test]
    fn test_get_report() {
        let store = Store::new();
        store.register_system(info("laptop")).unwrap();
        let inserted = store
            .insert_report("laptop", report("2026-08-01T00:00:00"))
            .unwrap();

        let fetched = store.get_report("laptop", inserted.id).unwrap();
        assert_eq!(fetched.id, inserted.id);
        assert_eq!(
            store.get_report("laptop", 999).unwrap_err(),
            StoreError::UnknownReport("laptop".to_string(), 999)
        );
    }

    #[test]
    fn test_overview_latest_per_system() {
        let store = Store::new();
        for name in ["a", "b", "c"] {
            store.register_system(info(name)).unwrap();
        }
        store.insert_report("a", report("2026-08-01T00:00:00")).unwrap();
        store.insert_report("a", report("2026-08-04T00:00:00")).unwrap();
        store.insert_report("b", report("2026-08-02T00:00:00")).unwrap();
        store.insert_report("c", report("2026-08-03T00:00:00")).unwrap();

        let overview = store.overview_reports(2);
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].0, "a");
        assert_eq!(overview[1].0, "c");
    }
}
