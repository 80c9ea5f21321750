//! Layer identifiers.
//!
//! Ids are short interned strings (`text_7`), so comparison and hashing
//! are O(1) while the layer panel and the snapshot format still see
//! readable names. Fresh ids come from a session counter that only moves
//! forward; restoring a snapshot *reserves* every id it contains, so an
//! id read back from a previous session can never be handed out again.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

/// Interner shared by every id in the process.
static NAMES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Source of fresh id numbers. Only ever advances: `generate` takes the
/// next number, `reserve` jumps it past any number seen in a snapshot.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Prefix of generated ids. Ids that don't carry it (hand-interned test
/// names, foreign snapshots) live outside the generator's number space
/// and cannot collide with it.
const GENERATED_PREFIX: &str = "text_";

/// A stable, interned identifier for one text layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(Spur);

impl LayerId {
    /// Intern a string as a LayerId, or return the existing id if
    /// already interned.
    pub fn intern(s: &str) -> Self {
        LayerId(NAMES.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        NAMES.resolve(&self.0)
    }

    /// Hand out a fresh `text_<n>` id. Numbers are never reused within a
    /// session, and `reserve` keeps restored snapshots out of the way.
    pub fn generate() -> Self {
        let n = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{GENERATED_PREFIX}{n}"))
    }

    /// Mark this id's number as taken, so `generate` skips past it.
    /// Called for every layer restored from a snapshot; ids without the
    /// generated prefix are ignored.
    pub fn reserve(&self) {
        let Some(n) = self
            .as_str()
            .strip_prefix(GENERATED_PREFIX)
            .and_then(|digits| digits.parse::<u64>().ok())
        else {
            return;
        };
        NEXT_ID.fetch_max(n + 1, Ordering::Relaxed);
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LayerId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for LayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(LayerId::intern(&s))
    }
}
