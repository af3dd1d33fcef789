//! Short code generation.
//!
//! Codes are derived from a per-process sequence partitioned by machine id, so
//! several instances can mint codes without talking to the store first.

use std::ops::RangeInclusive;

use parking_lot::Mutex;

use super::base62;

/// The sequence wraps to zero when it reaches this value.
pub const SEQUENCE_CEILING: u64 = 9999;

/// Multiplier separating the machine partition from the sequence.
const MACHINE_STRIDE: u64 = 10_000;

/// Largest machine id accepted by configuration.
pub const MAX_MACHINE_ID: u64 = 999_999;

/// Injectable identifier source shared by every request handler.
///
/// Identifiers are `machine_id * 10000 + seq` where `seq` cycles through
/// `1..9999, 0`. A wrapped sequence can repeat an identifier that is still in
/// the store; the link service treats the resulting conflict as retryable.
#[derive(Debug)]
pub struct SequenceGenerator {
    machine_id: u64,
    seq: Mutex<u64>,
}

impl SequenceGenerator {
    pub fn new(machine_id: u64) -> Self {
        Self::starting_at(machine_id, 0)
    }

    /// Creates a generator whose next call yields `seq + 1` (wrapped).
    pub fn starting_at(machine_id: u64, seq: u64) -> Self {
        Self {
            machine_id,
            seq: Mutex::new(seq % SEQUENCE_CEILING),
        }
    }

    pub fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// Every identifier `machine_id` can produce.
    pub fn id_range(machine_id: u64) -> RangeInclusive<u64> {
        let base = machine_id * MACHINE_STRIDE;
        base..=base + SEQUENCE_CEILING - 1
    }

    /// Sequence component of an identifier.
    pub fn sequence_of(id: u64) -> u64 {
        id % MACHINE_STRIDE
    }

    /// Advances the sequence and returns the composed identifier.
    pub fn next_id(&self) -> u64 {
        let seq = {
            let mut guard = self.seq.lock();
            *guard = (*guard + 1) % SEQUENCE_CEILING;
            *guard
        };
        self.machine_id * MACHINE_STRIDE + seq
    }

    /// Returns the base62 short code for the next identifier.
    pub fn next_code(&self) -> String {
        base62::encode(self.next_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_id_is_partitioned_by_machine() {
        let generator = SequenceGenerator::new(164);
        assert_eq!(generator.next_id(), 1_640_001);
        assert_eq!(generator.next_id(), 1_640_002);
    }

    #[test]
    fn test_sequence_wraps_at_ceiling() {
        let generator = SequenceGenerator::starting_at(164, 9997);
        assert_eq!(generator.next_id(), 1_649_998);
        assert_eq!(generator.next_id(), 1_640_000);
        assert_eq!(generator.next_id(), 1_640_001);
    }

    #[test]
    fn test_machines_do_not_overlap() {
        let a = SequenceGenerator::new(1);
        let b = SequenceGenerator::new(2);

        let ids_a: HashSet<u64> = (0..SEQUENCE_CEILING).map(|_| a.next_id()).collect();
        let ids_b: HashSet<u64> = (0..SEQUENCE_CEILING).map(|_| b.next_id()).collect();

        assert!(ids_a.is_disjoint(&ids_b));
    }

    #[test]
    fn test_id_range_covers_partition() {
        let range = SequenceGenerator::id_range(164);
        assert_eq!(range, 1_640_000..=1_649_998);

        let generator = SequenceGenerator::starting_at(164, 9997);
        for _ in 0..3 {
            let id = generator.next_id();
            assert!(range.contains(&id));
            assert!(!SequenceGenerator::id_range(165).contains(&id));
        }
        assert_eq!(SequenceGenerator::sequence_of(1_640_042), 42);
    }

    #[test]
    fn test_next_code_uses_base62() {
        let generator = SequenceGenerator::new(164);
        assert_eq!(generator.next_code(), "6sdd");
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let generator = Arc::new(SequenceGenerator::new(7));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                thread::spawn(move || (0..1000).map(|_| generator.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 8000);
    }
}
