use cozy_chess::Move;
use std::sync::Mutex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
}

/// Direct-mapped transposition table, shared between root workers.
pub struct Tt {
    slots: Vec<Mutex<Option<Entry>>>,
}

impl Default for Tt {
    fn default() -> Self { Self::with_entries(1 << 16) }
}

impl Tt {
    pub fn with_entries(entries: usize) -> Self {
        let mut slots = Vec::with_capacity(entries.max(1));
        slots.resize_with(entries.max(1), || Mutex::new(None));
        Self { slots }
    }

    fn slot(&self, key: u64) -> &Mutex<Option<Entry>> {
        let mixed = key ^ (key >> 32);
        &self.slots[(mixed as usize) % self.slots.len()]
    }

    pub fn get(&self, key: u64) -> Option<Entry> {
        let entry = *self.slot(key).lock().unwrap_or_else(|p| p.into_inner());
        entry.filter(|e| e.key == key)
    }

    pub fn put(&self, e: Entry) {
        let mut g = self.slot(e.key).lock().unwrap_or_else(|p| p.into_inner());
        // Same position: keep the deeper result. Different position: always replace.
        let keep = matches!(*g, Some(cur) if cur.key == e.key && cur.depth > e.depth);
        if !keep {
            *g = Some(e);
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.lock().map(|g| g.is_some()).unwrap_or(false)).count()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}
