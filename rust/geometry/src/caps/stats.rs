// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters filled in by the cap visibility resolver.
///
/// Safe to share between worker threads; pass one instance to every
/// [`cap_visibility`](super::cap_visibility) call of a run.
#[derive(Debug, Default)]
pub struct CapStats {
    caps_tested: AtomicUsize,
    caps_hidden: AtomicUsize,
    caps_shown: AtomicUsize,
    caps_without_connections: AtomicUsize,
    precise_agreements: AtomicUsize,
    precise_disagreements: AtomicUsize,
    precise_undetermined: AtomicUsize,
}

/// Plain copy of [`CapStats`] at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapStatsSnapshot {
    pub caps_tested: usize,
    pub caps_hidden: usize,
    pub caps_shown: usize,
    pub caps_without_connections: usize,
    /// Snout/snout caps where the ellipse containment test agreed with the
    /// radius comparison.
    pub precise_agreements: usize,
    pub precise_disagreements: usize,
    /// Snout/snout caps where a cap ellipse could not be built.
    pub precise_undetermined: usize,
}

impl CapStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_caps(&self, show_a: bool, show_b: bool) {
        self.caps_tested.fetch_add(2, Ordering::Relaxed);
        for shown in [show_a, show_b] {
            if shown {
                self.caps_shown.fetch_add(1, Ordering::Relaxed);
            } else {
                self.caps_hidden.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn record_unconnected(&self) {
        self.caps_without_connections.fetch_add(2, Ordering::Relaxed);
    }

    pub(crate) fn record_precise(&self, precise: Option<bool>, fast: bool) {
        let counter = match precise {
            None => &self.precise_undetermined,
            Some(p) if p == fast => &self.precise_agreements,
            Some(_) => &self.precise_disagreements,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CapStatsSnapshot {
        CapStatsSnapshot {
            caps_tested: self.caps_tested.load(Ordering::Relaxed),
            caps_hidden: self.caps_hidden.load(Ordering::Relaxed),
            caps_shown: self.caps_shown.load(Ordering::Relaxed),
            caps_without_connections: self.caps_without_connections.load(Ordering::Relaxed),
            precise_agreements: self.precise_agreements.load(Ordering::Relaxed),
            precise_disagreements: self.precise_disagreements.load(Ordering::Relaxed),
            precise_undetermined: self.precise_undetermined.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_caps_and_precise_outcomes() {
        let stats = CapStats::new();
        stats.record_caps(false, true);
        stats.record_unconnected();
        stats.record_precise(Some(true), true);
        stats.record_precise(Some(false), true);
        stats.record_precise(None, false);

        let snap = stats.snapshot();
        assert_eq!(snap.caps_tested, 2);
        assert_eq!(snap.caps_hidden, 1);
        assert_eq!(snap.caps_shown, 1);
        assert_eq!(snap.caps_without_connections, 2);
        assert_eq!(snap.precise_agreements, 1);
        assert_eq!(snap.precise_disagreements, 1);
        assert_eq!(snap.precise_undetermined, 1);
    }
}
