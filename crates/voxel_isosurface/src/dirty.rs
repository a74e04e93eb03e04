//! Dirty tracking between edits and mesh rebuilds.
//!
//! Each effective edit bumps a generation counter and grows a lattice-space
//! bounding box. The extraction driver compares the current generation with
//! the one it last built and clears the region once it has consumed it.

use glam::IVec3;

/// Lattice-space box covering every edit since the last build (inclusive).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRegion {
  pub min: IVec3,
  pub max: IVec3,
}

impl DirtyRegion {
  /// Region covering a single lattice point.
  pub fn point(p: IVec3) -> Self {
    Self { min: p, max: p }
  }

  /// Grow to include `p`.
  #[inline]
  pub fn encapsulate(&mut self, p: IVec3) {
    self.min = self.min.min(p);
    self.max = self.max.max(p);
  }

  /// Grow to include another region.
  #[inline]
  pub fn merge(&mut self, other: &DirtyRegion) {
    self.min = self.min.min(other.min);
    self.max = self.max.max(other.max);
  }

  /// Whether `p` lies inside the region.
  #[inline]
  pub fn contains(&self, p: IVec3) -> bool {
    p.cmpge(self.min).all() && p.cmple(self.max).all()
  }

  /// Number of lattice points on each axis.
  pub fn extent(&self) -> IVec3 {
    self.max - self.min + IVec3::ONE
  }
}

/// Generation counter plus accumulated region of pending edits.
#[derive(Clone, Debug, Default)]
pub struct DirtyTracker {
  generation: u64,
  built_generation: u64,
  region: Option<DirtyRegion>,
}

impl DirtyTracker {
  pub fn new() -> Self {
    Self::default()
  }

  /// Generation of the most recent edit.
  #[inline]
  pub fn generation(&self) -> u64 {
    self.generation
  }

  /// Generation the last build consumed.
  #[inline]
  pub fn built_generation(&self) -> u64 {
    self.built_generation
  }

  /// Whether edits are pending since the last build.
  #[inline]
  pub fn is_dirty(&self) -> bool {
    self.generation != self.built_generation
  }

  /// Region covered by pending edits, if any.
  #[inline]
  pub fn region(&self) -> Option<DirtyRegion> {
    self.region
  }

  /// Record an edit at one lattice point and return the new generation.
  pub fn mark(&mut self, p: IVec3) -> u64 {
    self.mark_region(DirtyRegion::point(p))
  }

  /// Record an edit covering a whole region and return the new generation.
  pub fn mark_region(&mut self, region: DirtyRegion) -> u64 {
    match &mut self.region {
      Some(existing) => existing.merge(&region),
      None => self.region = Some(region),
    }
    self.generation += 1;
    self.generation
  }

  /// Consume pending edits. Returns the region that was dirty.
  pub fn take(&mut self) -> Option<DirtyRegion> {
    self.built_generation = self.generation;
    self.region.take()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_new_tracker_is_clean() {
    let tracker = DirtyTracker::new();
    assert!(!tracker.is_dirty());
    assert!(tracker.region().is_none());
  }

  #[test]
  fn test_marks_accumulate_region() {
    let mut tracker = DirtyTracker::new();
    tracker.mark(IVec3::new(4, 1, 7));
    let generation = tracker.mark(IVec3::new(2, 9, 3));

    assert_eq!(generation, 2);
    assert!(tracker.is_dirty());
    let region = tracker.region().unwrap();
    assert_eq!(region.min, IVec3::new(2, 1, 3));
    assert_eq!(region.max, IVec3::new(4, 9, 7));
    assert_eq!(region.extent(), IVec3::new(3, 9, 5));
    assert!(region.contains(IVec3::new(3, 5, 5)));
    assert!(!region.contains(IVec3::new(5, 5, 5)));
  }

  #[test]
  fn test_take_clears_pending_edits() {
    let mut tracker = DirtyTracker::new();
    tracker.mark(IVec3::ONE);
    assert!(tracker.take().is_some());
    assert!(!tracker.is_dirty());
    assert_eq!(tracker.built_generation(), 1);
    assert!(tracker.take().is_none());
  }
}
