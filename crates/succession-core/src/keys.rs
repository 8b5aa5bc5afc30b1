//! Key layout inside the contract store, and record id generation.
//!
//! The contract offers no enumeration, so every record id must also be listed
//! in the JSON array stored under [`KEY_INDEX`].

use chrono::{DateTime, Utc};
use rand::Rng;

/// Well-known key holding the JSON array of record ids.
pub const KEY_INDEX: &str = "succession_plan_keys";

/// Prefix of every record key: `succession_plan_<id>`.
pub const RECORD_KEY_PREFIX: &str = "succession_plan_";

const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Storage key for a record id.
pub fn record_key(id: &str) -> String {
    format!("{RECORD_KEY_PREFIX}{id}")
}

/// Generate a record id: `<unix millis>-<7 base36 chars>`.
///
/// Not checked against the existing index; two submissions in the same
/// millisecond collide with probability 36^-7.
pub fn generate_id(now: DateTime<Utc>) -> String {
    generate_id_with(now, &mut rand::thread_rng())
}

pub fn generate_id_with<R: Rng>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{suffix}", now.timestamp_millis())
}

/// Encode the key index as stored bytes.
pub fn encode_keys(keys: &[String]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(keys)
}

/// Decode stored key index bytes. Empty bytes are an empty index.
pub fn decode_keys(bytes: &[u8]) -> Result<Vec<String>, serde_json::Error> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
}
