use crate::record::{ChunkRecord, ChunkState};
use delve_core::types::ChunkKey;
use std::collections::HashMap;

/// Per-state record counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub empty: u32,
    pub populating: u32,
    pub meshed: u32,
    pub uploading: u32,
    pub uploaded: u32,
}

impl StateCounts {
    pub fn total(&self) -> u32 {
        self.empty + self.populating + self.meshed + self.uploading + self.uploaded
    }
}

/// All tracked chunk records, keyed by chunk key.
#[derive(Debug, Default)]
pub struct ChunkMap {
    records: HashMap<ChunkKey, ChunkRecord>,
}

impl ChunkMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `key`, creating an `Empty` record if it isn't tracked yet.
    /// Returns true when a record was created.
    pub fn track(&mut self, key: ChunkKey, frame: u64) -> bool {
        match self.records.get_mut(&key) {
            Some(record) => {
                record.touch(frame);
                false
            }
            None => {
                self.records.insert(key, ChunkRecord::new(key, frame));
                true
            }
        }
    }

    /// Remove every record whose key fails `keep`.
    pub fn drain_where_not(&mut self, mut keep: impl FnMut(&ChunkKey) -> bool) -> Vec<ChunkRecord> {
        let doomed: Vec<ChunkKey> = self.records.keys().filter(|k| !keep(k)).copied().collect();
        doomed
            .iter()
            .filter_map(|key| self.records.remove(key))
            .collect()
    }

    /// Remove and return every record.
    pub fn drain_all(&mut self) -> Vec<ChunkRecord> {
        self.records.drain().map(|(_, record)| record).collect()
    }

    pub fn get(&self, key: &ChunkKey) -> Option<&ChunkRecord> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &ChunkKey) -> Option<&mut ChunkRecord> {
        self.records.get_mut(key)
    }

    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.records.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkKey, &ChunkRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn state_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for record in self.records.values() {
            match record.state {
                ChunkState::Empty => counts.empty += 1,
                ChunkState::Populating => counts.populating += 1,
                ChunkState::Meshed => counts.meshed += 1,
                ChunkState::Uploading => counts.uploading += 1,
                ChunkState::Uploaded => counts.uploaded += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_track_idempotent() {
        let mut map = ChunkMap::new();
        let key = IVec3::new(2, 0, 3);
        assert!(map.track(key, 1));
        assert!(!map.track(key, 2));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&key).expect("tracked").last_touched_frame, 2);
    }

    #[test]
    fn test_drain_where_not_evicts_outside() {
        let mut map = ChunkMap::new();
        for x in -2..=2 {
            map.track(IVec3::new(x, 0, 0), 0);
        }
        let evicted = map.drain_where_not(|k| k.x >= 0);
        assert_eq!(evicted.len(), 2);
        assert!(evicted.iter().all(|r| r.key.x < 0));
        assert_eq!(map.len(), 3);
        assert!(!map.contains(&IVec3::new(-1, 0, 0)));
    }

    #[test]
    fn test_state_counts() {
        let mut map = ChunkMap::new();
        let a = IVec3::new(0, 0, 0);
        let b = IVec3::new(1, 0, 0);
        let c = IVec3::new(2, 0, 0);
        map.track(a, 0);
        map.track(b, 0);
        map.track(c, 0);
        map.get_mut(&b).expect("tracked").state = ChunkState::Meshed;
        map.get_mut(&c).expect("tracked").state = ChunkState::Uploaded;

        let counts = map.state_counts();
        assert_eq!(counts.empty, 1);
        assert_eq!(counts.meshed, 1);
        assert_eq!(counts.uploaded, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_drain_all_empties_map() {
        let mut map = ChunkMap::new();
        map.track(IVec3::ZERO, 0);
        map.track(IVec3::Y, 0);
        assert_eq!(map.drain_all().len(), 2);
        assert!(map.is_empty());
    }
}
