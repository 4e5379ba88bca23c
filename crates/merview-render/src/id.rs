//! Unique diagram ids.

use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// Length of the random suffix.
const SUFFIX_LEN: usize = 9;

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a diagram id: `mermaid-{epoch millis}-{9 random base-36 chars}`.
///
/// The id is passed to the renderer and used as the stem of exported files.
#[must_use]
pub fn generate_diagram_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());

    let mut random = Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(SUFFIX_LEN);
    for _ in 0..SUFFIX_LEN {
        // Modulo 36 always fits in the alphabet
        #[allow(clippy::cast_possible_truncation)]
        let digit = (random % 36) as usize;
        suffix.push(char::from(ALPHABET[digit]));
        random /= 36;
    }

    format!("mermaid-{millis}-{suffix}")
}
