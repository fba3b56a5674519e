//! One-shot callbacks fired when a terrain part is destroyed.
//!
//! Gameplay code registers against a part handle, for example to drop a
//! crate resting on that part. Handles are generational, so a callback can
//! never fire for a later part that reuses a freed slot.

use std::collections::HashMap;
use std::fmt;

use crate::physics::PartHandle;

/// Callback fired once when its terrain part is destroyed.
pub type DamageCallback = Box<dyn FnOnce() + Send + Sync>;

/// Damage callbacks keyed by part handle.
///
/// Firing removes the entry, so each callback runs at most once.
pub struct DamageListenerRegistry<H: PartHandle> {
  listeners: HashMap<H, DamageCallback>,
}

impl<H: PartHandle> Default for DamageListenerRegistry<H> {
  fn default() -> Self {
    Self {
      listeners: HashMap::new(),
    }
  }
}

impl<H: PartHandle> DamageListenerRegistry<H> {
  /// Registers `callback` for `handle`, replacing any previous one.
  pub fn register(&mut self, handle: H, callback: DamageCallback) {
    self.listeners.insert(handle, callback);
  }

  /// Removes and runs the callback for `handle`. Returns whether one ran.
  pub fn fire(&mut self, handle: H) -> bool {
    match self.listeners.remove(&handle) {
      Some(callback) => {
        callback();
        true
      }
      None => false,
    }
  }

  /// Drops the callback for `handle` without running it.
  pub fn remove(&mut self, handle: H) -> bool {
    self.listeners.remove(&handle).is_some()
  }

  pub fn contains(&self, handle: H) -> bool {
    self.listeners.contains_key(&handle)
  }

  pub fn len(&self) -> usize {
    self.listeners.len()
  }

  pub fn is_empty(&self) -> bool {
    self.listeners.is_empty()
  }
}

impl<H: PartHandle> fmt::Debug for DamageListenerRegistry<H> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("DamageListenerRegistry")
      .field("handles", &self.listeners.keys().collect::<Vec<_>>())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::sync::atomic::{AtomicU32, Ordering};

  use super::*;

  #[test]
  fn fires_at_most_once() {
    let count = Arc::new(AtomicU32::new(0));
    let mut registry = DamageListenerRegistry::<u32>::default();
    let c = count.clone();
    registry.register(7, Box::new(move || {
      c.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(registry.fire(7));
    assert!(!registry.fire(7));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(registry.is_empty());
  }

  #[test]
  fn register_replaces_previous_callback() {
    let count = Arc::new(AtomicU32::new(0));
    let mut registry = DamageListenerRegistry::<u32>::default();
    let first = count.clone();
    registry.register(1, Box::new(move || {
      first.fetch_add(1, Ordering::SeqCst);
    }));
    let second = count.clone();
    registry.register(1, Box::new(move || {
      second.fetch_add(10, Ordering::SeqCst);
    }));

    assert_eq!(registry.len(), 1);
    registry.fire(1);
    assert_eq!(count.load(Ordering::SeqCst), 10);
  }

  #[test]
  fn remove_drops_without_firing() {
    let count = Arc::new(AtomicU32::new(0));
    let mut registry = DamageListenerRegistry::<u32>::default();
    let c = count.clone();
    registry.register(3, Box::new(move || {
      c.fetch_add(1, Ordering::SeqCst);
    }));

    assert!(registry.contains(3));
    assert!(registry.remove(3));
    assert!(!registry.contains(3));
    assert!(!registry.fire(3));
    assert_eq!(count.load(Ordering::SeqCst), 0);
  }
}
