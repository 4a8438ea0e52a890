//! In-process key-value store.

use super::KvStore;
use async_trait::async_trait;
use larder_core::{LarderError, LarderResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
enum Slot {
    Bytes(Vec<u8>),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Entry {
    slot: Slot,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// [`KvStore`] held in a process-local map.
///
/// Expiry follows the tokio clock, so tests running with paused time can
/// step an entry past its TTL deterministically. Expired entries are dropped
/// lazily on access.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryKvStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `key` holds a live entry of any type.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries.lock().get(key).is_some_and(|e| e.is_live(now))
    }

    /// Returns the live keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        let mut keys: Vec<String> = self
            .entries
            .lock()
            .iter()
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Returns how long `key` has left to live.
    #[must_use]
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    fn live_entry<'a>(map: &'a mut HashMap<String, Entry>, key: &str, now: Instant) -> Option<&'a mut Entry> {
        if map.get(key).is_some_and(|e| !e.is_live(now)) {
            map.remove(key);
        }
        map.get_mut(key)
    }
}

fn wrong_type(key: &str) -> LarderError {
    LarderError::Cache(format!(
        "WRONGTYPE Operation against key '{key}' holding the wrong kind of value"
    ))
}

/// Matches `key` against a glob where `*` stands for any run of characters.
fn glob_match(pattern: &str, key: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return key.is_empty();
    };
    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };

    let parts: Vec<&str> = parts.collect();
    let Some((last, middle)) = parts.split_last() else {
        // No '*' in the pattern: exact match.
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> LarderResult<Option<Vec<u8>>> {
        let now = Instant::now();
        let mut map = self.entries.lock();
        match Self::live_entry(&mut map, key, now) {
            Some(Entry {
                slot: Slot::Bytes(bytes),
                ..
            }) => Ok(Some(bytes.clone())),
            Some(_) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> LarderResult<()> {
        let entry = Entry {
            slot: Slot::Bytes(value.to_vec()),
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> LarderResult<u64> {
        let now = Instant::now();
        let mut map = self.entries.lock();
        let mut deleted = 0;
        for key in keys {
            if map.remove(key).is_some_and(|e| e.is_live(now)) {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn set_add(&self, key: &str, member: &str, ttl: Duration) -> LarderResult<()> {
        let now = Instant::now();
        let mut map = self.entries.lock();
        let expires_at = now + ttl;
        match Self::live_entry(&mut map, key, now) {
            Some(entry) => {
                let Slot::Set(members) = &mut entry.slot else {
                    return Err(wrong_type(key));
                };
                members.insert(member.to_string());
                entry.expires_at = expires_at;
            }
            None => {
                map.insert(
                    key.to_string(),
                    Entry {
                        slot: Slot::Set(HashSet::from([member.to_string()])),
                        expires_at,
                    },
                );
            }
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> LarderResult<Vec<String>> {
        let now = Instant::now();
        let mut map = self.entries.lock();
        let mut members: Vec<String> = match Self::live_entry(&mut map, key, now) {
            Some(Entry {
                slot: Slot::Set(members),
                ..
            }) => members.iter().cloned().collect(),
            Some(_) => return Err(wrong_type(key)),
            None => Vec::new(),
        };
        members.sort();
        Ok(members)
    }

    async fn set_remove(&self, key: &str, members: &[String]) -> LarderResult<u64> {
        let now = Instant::now();
        let mut map = self.entries.lock();
        let (removed, now_empty) = match Self::live_entry(&mut map, key, now) {
            Some(Entry {
                slot: Slot::Set(set),
                ..
            }) => {
                let removed = members.iter().filter(|m| set.remove(m.as_str())).count() as u64;
                (removed, set.is_empty())
            }
            Some(_) => return Err(wrong_type(key)),
            None => (0, false),
        };
        if now_empty {
            map.remove(key);
        }
        Ok(removed)
    }

    async fn keys_by_pattern(&self, pattern: &str) -> LarderResult<Vec<String>> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| glob_match(pattern, key))
            .collect())
    }
}
