//! Lost & found registry
//!
//! The one piece of state that outlives a planning pass. Append-only; appends
//! are serialized through an async mutex.

use chrono::Local;
use sdk::schema::LostItemRecord;
use tokio::sync::Mutex;
use tracing::info;

pub const CLAIM_INSTRUCTIONS: &str = "If you found your item, please visit Customer Service \
     (Floor 1, Main Entrance) with a valid ID to claim it.";

const LOGGED_STATUS: &str = "Logged - Check back at Customer Service";
const AVAILABLE_STATUS: &str = "Available at Customer Service";

#[derive(Default)]
pub struct LostAndFoundRegistry {
    items: Mutex<Vec<LostItemRecord>>,
}

impl LostAndFoundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the items currently held at the desk
    pub fn seeded() -> Self {
        let found = |item_id: u32, description: &str, location: &str, date: &str| LostItemRecord {
            item_id,
            description: description.to_string(),
            location: location.to_string(),
            date: date.to_string(),
            contact_info: None,
            status: AVAILABLE_STATUS.to_string(),
        };

        Self {
            items: Mutex::new(vec![
                found(101, "Black iPhone 15 Pro", "Floor 3, Food Court", "2025-12-13"),
                found(102, "Brown leather wallet", "Floor 1, Near Fashion Forward", "2025-12-12"),
                found(103, "Car keys with BMW keychain", "Parking B2", "2025-12-14"),
            ]),
        }
    }

    /// Append a lost-item report and return it with its reference id
    pub async fn log(
        &self,
        description: &str,
        location: &str,
        contact_info: Option<&str>,
    ) -> LostItemRecord {
        let mut items = self.items.lock().await;
        let item_id = items.iter().map(|i| i.item_id).max().unwrap_or(0) + 1;

        let record = LostItemRecord {
            item_id,
            description: description.to_string(),
            location: location.to_string(),
            date: Local::now().format("%Y-%m-%d %H:%M").to_string(),
            contact_info: contact_info.map(str::to_string),
            status: LOGGED_STATUS.to_string(),
        };
        items.push(record.clone());

        info!("Lost item logged with ID: {}", item_id);
        record
    }

    /// Items whose description contains `item_type` (case-insensitive)
    pub async fn search(&self, item_type: &str) -> Vec<LostItemRecord> {
        let needle = item_type.trim().to_lowercase();
        self.items
            .lock()
            .await
            .iter()
            .filter(|item| item.description.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seeded_search() {
        let registry = LostAndFoundRegistry::seeded();
        let wallets = registry.search("Wallet").await;
        assert_eq!(wallets.len(), 1);
        assert_eq!(wallets[0].item_id, 102);
        assert!(registry.search("umbrella").await.is_empty());
    }

    #[tokio::test]
    async fn test_log_assigns_next_id() {
        let registry = LostAndFoundRegistry::seeded();
        let record = registry
            .log("Blue umbrella", "Floor 2, Cinema", Some("555-0100"))
            .await;

        assert_eq!(record.item_id, 104);
        assert_eq!(record.contact_info.as_deref(), Some("555-0100"));
        assert_eq!(registry.len().await, 4);
        assert_eq!(registry.search("umbrella").await, vec![record]);
    }

    #[tokio::test]
    async fn test_empty_registry_starts_at_one() {
        let registry = LostAndFoundRegistry::new();
        assert!(registry.is_empty().await);
        let record = registry.log("Scarf", "Floor 1", None).await;
        assert_eq!(record.item_id, 1);
    }

    #[tokio::test]
    async fn test_concurrent_logs_get_distinct_ids() {
        let registry = std::sync::Arc::new(LostAndFoundRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = std::sync::Arc::clone(&registry);
                tokio::spawn(async move {
                    registry
                        .log(&format!("item {}", i), "Floor 1", None)
                        .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().item_id);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }
}
