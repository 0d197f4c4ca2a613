// Favorites ledger: the set of user-marked game ids, mirrored to a
// persistent store as a JSON array of integers.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::StoreError;
use crate::store::PersistentStore;

/// Store key holding the favorites blob.
pub const FAVORITES_KEY: &str = "courtside_favorites";

pub struct FavoritesLedger<P> {
    store: P,
    ids: BTreeSet<u64>,
}

impl<P: PersistentStore> FavoritesLedger<P> {
    /// Read the persisted set. An absent, unreadable or malformed blob yields
    /// an empty set; nothing here is fatal.
    pub fn load(store: P) -> Self {
        let ids = match store.get(FAVORITES_KEY) {
            Ok(Some(blob)) => match decode_favorites(&blob) {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("discarding favorites: {e}");
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                warn!("could not read favorites, starting empty: {e}");
                BTreeSet::new()
            }
        };
        debug!("loaded {} favorite game(s)", ids.len());
        Self { store, ids }
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Flip membership of `id` and persist the whole set. Returns whether
    /// `id` is a favorite afterwards.
    ///
    /// A failed write is logged and not retried; the in-memory set stays
    /// authoritative for the session.
    pub fn toggle(&mut self, id: u64) -> bool {
        let now_favorite = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };

        if let Err(e) = self.persist() {
            error!("failed to save favorites: {e}");
        }
        now_favorite
    }

    pub fn list(&self) -> &BTreeSet<u64> {
        &self.ids
    }

    fn persist(&self) -> Result<(), StoreError> {
        let blob = encode_favorites(&self.ids);
        self.store.set(FAVORITES_KEY, &blob)
    }
}

/// Serialize the set as a JSON array of integers, ascending.
pub fn encode_favorites(ids: &BTreeSet<u64>) -> String {
    let values: Vec<Value> = ids.iter().map(|id| Value::from(*id)).collect();
    Value::Array(values).to_string()
}

/// Parse a persisted blob. Anything but a JSON array is corrupt; entries that
/// are not non-negative integers are dropped.
pub fn decode_favorites(blob: &str) -> Result<BTreeSet<u64>, StoreError> {
    let corrupt = |message: String| StoreError::Corrupt {
        key: FAVORITES_KEY.to_string(),
        message,
    };

    let value: Value = serde_json::from_str(blob).map_err(|e| corrupt(e.to_string()))?;
    let Value::Array(entries) = value else {
        return Err(corrupt("expected a JSON array".into()));
    };

    let mut ids = BTreeSet::new();
    for entry in entries {
        match entry.as_u64() {
            Some(id) => {
                ids.insert(id);
            }
            None => warn!("dropping non-integer favorite entry {entry}"),
        }
    }
    Ok(ids)
}
