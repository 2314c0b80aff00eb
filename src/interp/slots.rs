use crate::snapshot::Snapshot;

/// Interpolation endpoints: three storage slots whose roles
/// (last, next, one-after) rotate. `last` indexes the slot currently
/// playing the "last" role, the two others follow in ring order.
#[derive(Debug, Clone)]
pub(crate) struct Slots {
    buffer: [Snapshot; 3],
    last: usize,
    /// True when the one-after slot holds a freshly computed sample
    ready: bool,
}

impl Slots {
    /// Builds [Slots] from three chronological samples, look-ahead valid.
    pub fn new(last: Snapshot, next: Snapshot, one_after: Snapshot) -> Self {
        Self {
            buffer: [last, next, one_after],
            last: 0,
            ready: true,
        }
    }
    fn next_index(&self) -> usize {
        (self.last + 1) % 3
    }
    fn one_after_index(&self) -> usize {
        (self.last + 2) % 3
    }
    pub fn last(&self) -> &Snapshot {
        &self.buffer[self.last]
    }
    pub fn next(&self) -> &Snapshot {
        &self.buffer[self.next_index()]
    }
    #[cfg(test)]
    pub fn one_after(&self) -> &Snapshot {
        &self.buffer[self.one_after_index()]
    }
    pub fn ready(&self) -> bool {
        self.ready
    }
    /// next becomes last, one-after becomes next and the old last
    /// slot is recycled as the (stale) one-after slot.
    pub fn rotate(&mut self) {
        self.last = self.next_index();
        self.ready = false;
    }
    /// Publishes a new look-ahead sample
    pub fn fill(&mut self, one_after: Snapshot) {
        let idx = self.one_after_index();
        self.buffer[idx] = one_after;
        self.ready = true;
    }
}
