use crate::error::StoreError;
use crate::events::Alert;
use crate::store::AlertStore;
use log::{debug, info};
use std::sync::RwLock;

/// Alert store kept in insertion order
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    alerts: RwLock<Vec<Alert>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for MemoryAlertStore {
    fn append(&self, alert: Alert) -> Result<(), StoreError> {
        self.alerts.write()?.push(alert);
        Ok(())
    }

    fn list(&self) -> Result<Vec<Alert>, StoreError> {
        let alerts = self.alerts.read()?;
        let mut listed = alerts.clone();
        // Stable sort keeps insertion order among equal timestamps, then reverse
        // so the latest appended alert comes first.
        listed.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        listed.reverse();
        Ok(listed)
    }

    fn get(&self, id: &str) -> Result<Option<Alert>, StoreError> {
        let alerts = self.alerts.read()?;
        Ok(alerts.iter().find(|alert| alert.id == id).cloned())
    }

    fn acknowledge(&self, id: &str) -> Result<(), StoreError> {
        let mut alerts = self.alerts.write()?;
        match alerts.iter_mut().find(|alert| alert.id == id) {
            Some(alert) => {
                if !alert.acknowledged {
                    alert.acknowledged = true;
                    debug!("Acknowledged alert {}", id);
                }
                Ok(())
            }
            None => Err(StoreError::AlertNotFound(id.to_string())),
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut alerts = self.alerts.write()?;
        let cleared = alerts.len();
        alerts.clear();
        info!("Cleared {} alerts", cleared);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{MetricType, Severity};
    use chrono::{Duration, Utc};

    fn alert_at(offset_seconds: i64, message: &str) -> Alert {
        Alert::new(
            MetricType::Cpu,
            Severity::Warning,
            message.to_string(),
            65.0,
            60.0,
            Utc::now() + Duration::seconds(offset_seconds),
        )
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = MemoryAlertStore::new();
        store.append(alert_at(0, "first")).unwrap();
        store.append(alert_at(10, "second")).unwrap();
        store.append(alert_at(5, "middle")).unwrap();

        let messages: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|alert| alert.message)
            .collect();
        assert_eq!(messages, vec!["second", "middle", "first"]);
    }

    #[test]
    fn test_list_same_timestamp_latest_append_first() {
        let store = MemoryAlertStore::new();
        let now = Utc::now();
        let mut first = alert_at(0, "first");
        let mut second = alert_at(0, "second");
        first.timestamp = now;
        second.timestamp = now;
        store.append(first).unwrap();
        store.append(second).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed[0].message, "second");
        assert_eq!(listed[1].message, "first");
    }

    #[test]
    fn test_acknowledge_is_idempotent() {
        let store = MemoryAlertStore::new();
        let alert = alert_at(0, "cpu");
        let id = alert.id.clone();
        store.append(alert).unwrap();

        store.acknowledge(&id).unwrap();
        store.acknowledge(&id).unwrap();

        assert!(store.get(&id).unwrap().unwrap().acknowledged);
    }

    #[test]
    fn test_acknowledge_unknown_alert() {
        let store = MemoryAlertStore::new();
        let result = store.acknowledge("missing");
        assert!(matches!(result, Err(StoreError::AlertNotFound(_))));
    }

    #[test]
    fn test_clear_removes_everything() {
        let store = MemoryAlertStore::new();
        store.append(alert_at(0, "a")).unwrap();
        store.append(alert_at(1, "b")).unwrap();

        store.clear().unwrap();
        assert!(store.list().unwrap().is_empty());

        // Clearing an empty store is fine
        store.clear().unwrap();
    }
}
