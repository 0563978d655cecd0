//! Connection identifier generation.

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a connection.
pub type ConnectionId = String;

/// Generates connection ids: a one-letter kind tag followed by a 6-character
/// base36 counter, e.g. `CAAAAAB`.
///
/// Remote and local connections share the counter, so ids never collide.
pub struct IdGenerator {
    counter: AtomicU64,
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Next id for a connection accepted from the network.
    pub fn next_remote(&self) -> ConnectionId {
        self.next('C')
    }

    /// Next id for a virtual local connection.
    pub fn next_local(&self) -> ConnectionId {
        self.next('L')
    }

    fn next(&self, tag: char) -> ConnectionId {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut id = String::with_capacity(ID_WIDTH + 1);
        id.push(tag);
        id.extend(base36_digits(seq));
        id
    }
}

const ID_WIDTH: usize = 6;
const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Most significant digit first, wrapping after 36^6 ids.
fn base36_digits(seq: u64) -> impl Iterator<Item = char> {
    (0..ID_WIDTH as u32).rev().map(move |place| {
        let digit = (seq / 36u64.pow(place)) % 36;
        char::from(ALPHABET[digit as usize])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(seq: u64) -> String {
        base36_digits(seq).collect()
    }

    #[test]
    fn ids_share_one_sequence() {
        let generator = IdGenerator::new();
        assert_eq!(generator.next_remote(), "CAAAAAA");
        assert_eq!(generator.next_local(), "LAAAAAB");
        assert_eq!(generator.next_remote(), "CAAAAAC");
    }

    #[test]
    fn digits_carry_and_wrap() {
        assert_eq!(encode(35), "AAAAA9");
        assert_eq!(encode(36), "AAAABA");
        assert_eq!(encode(36u64.pow(6) - 1), "999999");
        assert_eq!(encode(36u64.pow(6)), "AAAAAA");
    }
}
