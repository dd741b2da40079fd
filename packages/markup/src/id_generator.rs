//! Lazy ids for nodes that appear after a root was addressed.
//!
//! Ids look like `{seed}-{n}`: the seed is the CRC32 of the root's base id in
//! hex, `n` counts up from 1. They never look like a derived position id
//! (`{base}-{location}`), since the seed is not a base id.

use crc32fast::Hasher;

pub fn get_seed(base_id: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(base_id.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdGenerator {
    seed: String,
    issued: u32,
}

impl IdGenerator {
    pub fn new(base_id: &str) -> Self {
        Self::from_seed(get_seed(base_id))
    }

    pub fn from_seed(seed: String) -> Self {
        Self { seed, issued: 0 }
    }

    pub fn new_id(&mut self) -> String {
        self.issued += 1;
        format!("{}-{}", self.seed, self.issued)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }
}
