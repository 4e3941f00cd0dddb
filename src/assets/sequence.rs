use crate::{
    assets::decode::PreparedFrame,
    foundation::core::{FrameIndex, ViewportClass},
};

/// Number of populated slots out of the sequence length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoadProgress {
    /// Slots holding a decoded frame.
    pub loaded: u32,
    /// Sequence length N.
    pub total: u32,
}

impl LoadProgress {
    /// Loaded fraction in `[0, 1]`; an empty sequence reports 0.
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            f64::from(self.loaded) / f64::from(self.total)
        }
    }

    /// The loading bar stays up until every slot is populated.
    pub fn indicator_visible(self) -> bool {
        self.loaded < self.total
    }

    pub fn is_complete(self) -> bool {
        self.total > 0 && self.loaded == self.total
    }
}

/// Ordered frames for one viewport class. Each slot is empty or holds one decoded frame.
#[derive(Clone, Debug)]
pub struct FrameSequence {
    class: ViewportClass,
    slots: Vec<Option<PreparedFrame>>,
    loaded: u32,
    first_loaded: Option<FrameIndex>,
}

impl FrameSequence {
    /// Create `count` empty slots for `class`.
    pub fn new(class: ViewportClass, count: u32) -> Self {
        Self {
            class,
            slots: vec![None; count as usize],
            loaded: 0,
            first_loaded: None,
        }
    }

    pub fn class(&self) -> ViewportClass {
        self.class
    }

    pub fn len(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Populate an empty slot. Returns `false` (and changes nothing) when `index` is out of
    /// range or the slot is already populated, so progress counts each slot at most once.
    pub fn insert(&mut self, index: FrameIndex, frame: PreparedFrame) -> bool {
        let Some(slot) = self.slots.get_mut(index.as_usize()) else {
            return false;
        };
        if slot.is_some() {
            return false;
        }
        *slot = Some(frame);
        self.loaded += 1;
        self.first_loaded.get_or_insert(index);
        true
    }

    pub fn get(&self, index: FrameIndex) -> Option<&PreparedFrame> {
        self.slots.get(index.as_usize()).and_then(Option::as_ref)
    }

    pub fn is_loaded(&self, index: FrameIndex) -> bool {
        self.get(index).is_some()
    }

    /// The slot that finished loading first, which need not be slot 0.
    pub fn first_loaded(&self) -> Option<FrameIndex> {
        self.first_loaded
    }

    pub fn progress(&self) -> LoadProgress {
        LoadProgress {
            loaded: self.loaded,
            total: self.len(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sequence.rs"]
mod tests;
