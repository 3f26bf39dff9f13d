//! Provider id generation behind an injectable seam.
//!
//! Production code mints UUIDs; tests swap in the sequential generator
//! so ids are assertable.

use uuid::Uuid;

pub trait IdGenerator: Send {
    fn next_id(&mut self) -> String;
}

/// Random v4 UUIDs, collision-resistant across imports.
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic counter with a fixed prefix. Deterministic.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: &'static str,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: 1 }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("prov")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
