//! Tracking of which accounts play from the same address.
//!
//! Addresses are never stored. Only a truncated SHA-256 of each one is kept, which is
//! enough to notice one address driving several accounts.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{board::Coordinate, history::ShotResult};

/// Number of leading digest bytes kept, printed as twice as many hex digits.
const HASH_BYTES: usize = 8;

/// Hash an address for storage, e.g. `"203.0.113.7"` to 16 hex digits.
pub fn hash_ip(ip: &str) -> String {
    Sha256::digest(ip.trim().as_bytes())
        .iter()
        .take(HASH_BYTES)
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// A move made from a tracked address.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct IpMove {
    pub username: String,
    #[serde(rename = "move")]
    pub coord: Coordinate,
    pub result: ShotResult,
    pub timestamp: DateTime<Utc>,
}

/// Everything seen from one hashed address.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct IpRecord {
    /// Accounts that played from this address.
    #[serde(default)]
    pub users: BTreeSet<String>,
    /// Latest moves from this address, oldest first.
    #[serde(default)]
    pub moves: VecDeque<IpMove>,
    pub first_seen: DateTime<Utc>,
    /// Rejected attempts from this address.
    #[serde(default)]
    pub violation_count: u32,
}

impl IpRecord {
    fn new(first_seen: DateTime<Utc>) -> Self {
        Self {
            users: BTreeSet::new(),
            moves: VecDeque::new(),
            first_seen,
            violation_count: 0,
        }
    }
}

/// Records for every hashed address, stored as `game2/ip_tracking.json`.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct IpTracking {
    #[serde(default)]
    ip_records: BTreeMap<String, IpRecord>,
}

impl IpTracking {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, ip_hash: &str, now: DateTime<Utc>) -> &mut IpRecord {
        self.ip_records
            .entry(ip_hash.to_owned())
            .or_insert_with(|| IpRecord::new(now))
    }

    /// Note an accepted move from `ip_hash`, keeping at most `limit` moves for it.
    pub fn track_move(&mut self, ip_hash: &str, entry: IpMove, limit: usize) {
        let record = self.record(ip_hash, entry.timestamp);
        record.users.insert(entry.username.clone());
        record.moves.push_back(entry);
        while record.moves.len() > limit {
            record.moves.pop_front();
        }
    }

    /// Count a rejected attempt against `ip_hash`.
    pub fn record_violation(&mut self, ip_hash: &str, now: DateTime<Utc>) {
        self.record(ip_hash, now).violation_count += 1;
    }

    /// The record for a hashed address, if it was ever seen.
    pub fn get(&self, ip_hash: &str) -> Option<&IpRecord> {
        self.ip_records.get(ip_hash)
    }

    pub fn len(&self) -> usize {
        self.ip_records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ip_records.is_empty()
    }

    /// Addresses with at least `min_violations` violations or more than `max_users`
    /// accounts, ordered by hash.
    pub fn suspicious(
        &self,
        min_violations: u32,
        max_users: usize,
    ) -> Vec<(&str, &IpRecord)> {
        self.ip_records
            .iter()
            .filter(|(_, r)| r.violation_count >= min_violations || r.users.len() > max_users)
            .map(|(hash, r)| (hash.as_str(), r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user: &str, cell: &str) -> IpMove {
        IpMove {
            username: user.into(),
            coord: cell.parse().unwrap(),
            result: ShotResult::Miss,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn hashes_are_short_and_stable() {
        let hash = hash_ip("203.0.113.7");
        assert_eq!(hash.len(), 16);
        assert!(hash.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(hash, hash_ip(" 203.0.113.7 "));
        assert_ne!(hash, hash_ip("203.0.113.8"));
        // Leading bytes of the SHA-256 of "abc".
        assert_eq!(hash_ip("abc"), "ba7816bf8f01cfea");
    }

    #[test]
    fn moves_are_bounded_per_address() {
        let mut tracking = IpTracking::new();
        for cell in &["A1", "A2", "A3"] {
            tracking.track_move("h1", entry("ann", cell), 2);
        }
        let record = tracking.get("h1").unwrap();
        assert_eq!(record.moves.len(), 2);
        assert_eq!(record.moves[0].coord.to_string(), "A2");
        assert_eq!(record.users.len(), 1);
    }

    #[test]
    fn flags_many_violations_or_many_accounts() {
        let now = Utc::now();
        let mut tracking = IpTracking::new();
        for _ in 0..5 {
            tracking.record_violation("noisy", now);
        }
        for user in &["a", "b", "c"] {
            tracking.track_move("shared", entry(user, "B2"), 100);
        }
        tracking.record_violation("quiet", now);
        let hashes: Vec<&str> = tracking.suspicious(5, 3).into_iter().map(|(h, _)| h).collect();
        assert_eq!(hashes, vec!["noisy"]);
        tracking.track_move("shared", entry("d", "B3"), 100);
        let hashes: Vec<&str> = tracking.suspicious(5, 3).into_iter().map(|(h, _)| h).collect();
        assert_eq!(hashes, vec!["noisy", "shared"]);
    }

    #[test]
    fn json_layout() {
        let mut tracking = IpTracking::new();
        tracking.track_move("h1", entry("ann", "C3"), 100);
        let json = serde_json::to_value(&tracking).unwrap();
        let record = &json["ip_records"]["h1"];
        assert_eq!(record["users"][0], "ann");
        assert_eq!(record["moves"][0]["move"], "C3");
        assert_eq!(record["violation_count"], 0);
        let back: IpTracking = serde_json::from_value(json).unwrap();
        assert_eq!(back, tracking);
    }
}
