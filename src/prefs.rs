//! Persisted state: named presets, last-used port, the active preset, and
//! whether the tablet is enabled. The on-disk format is entirely up to the
//! embedder; this crate only defines the shape of the record.

use crate::settings::Settings;

#[derive(Clone, Debug, PartialEq)]
pub struct Preset {
    pub name: String,
    pub settings: Settings,
}

#[derive(Clone, Debug, Default)]
pub struct PrefRecord {
    pub presets: Vec<Preset>,
    pub last_port: Option<String>,
    pub active_preset: Option<usize>,
    pub tablet_enabled: bool,
}

/// Read/write access to the small persisted surface above. An embedder
/// supplies a concrete store (file, registry, whatever); this crate never
/// assumes a format.
pub trait PrefStore {
    fn load(&self) -> PrefRecord;
    fn save(&mut self, record: &PrefRecord);
}

/// An in-memory store, useful for tests and for `--command`-mode runs that
/// don't want to touch disk.
#[derive(Default)]
pub struct MemoryPrefStore {
    record: PrefRecord,
}

impl PrefStore for MemoryPrefStore {
    fn load(&self) -> PrefRecord {
        self.record.clone()
    }
    fn save(&mut self, record: &PrefRecord) {
        self.record = record.clone();
    }
}
