//! Hybrid logical clock state machine.

use crate::node::NodeId;
use crate::timestamp::Hlc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A hybrid logical clock.
///
/// The clock holds process-lifetime mutable state (`last_physical`,
/// `counter`) and produces timestamps that are strictly increasing on
/// this node, even when the wall clock stutters or moves backward.
/// Observing a remote timestamp via [`HybridClock::update`] advances
/// the clock so that every future local timestamp causally succeeds
/// everything this node has seen.
///
/// The clock is an explicit owned value, not a process singleton:
/// tests instantiate one clock per simulated node, and the sync
/// coordinator owns exactly one per device.
///
/// # Example
///
/// ```
/// use fieldsync_clock::{HybridClock, NodeId};
///
/// let mut clock = HybridClock::new(NodeId::new("truck-7").unwrap());
/// let a = clock.generate();
/// let b = clock.generate();
/// assert!(b > a);
/// ```
#[derive(Debug)]
pub struct HybridClock {
    node: NodeId,
    last_physical: u64,
    counter: u16,
}

impl HybridClock {
    /// Creates a clock for the given node identity.
    #[must_use]
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            last_physical: 0,
            counter: 0,
        }
    }

    /// Returns the node identity this clock stamps with.
    #[must_use]
    pub fn node(&self) -> &NodeId {
        &self.node
    }

    /// Generates the next timestamp from the wall clock.
    ///
    /// Successive calls return strictly increasing timestamps.
    pub fn generate(&mut self) -> Hlc {
        self.generate_at(wall_clock_millis())
    }

    /// Generates the next timestamp at an explicit physical time.
    ///
    /// This is the deterministic core of [`HybridClock::generate`];
    /// tests use it to simulate clock stutter and regression.
    pub fn generate_at(&mut self, now: u64) -> Hlc {
        if now > self.last_physical {
            self.last_physical = now;
            self.counter = 0;
        } else {
            // Wall clock stalled or went backward: keep the logical
            // component moving instead.
            self.bump_counter();
        }
        Hlc::new(self.last_physical, self.counter, self.node.clone())
    }

    /// Folds a remote timestamp into the clock, then generates.
    ///
    /// After this call every timestamp the clock produces is greater
    /// than `remote`, regardless of local clock skew. Invoke it
    /// whenever a remote timestamp is observed (a server
    /// acknowledgement, another device's winning write).
    pub fn update(&mut self, remote: &Hlc) -> Hlc {
        self.update_at(remote, wall_clock_millis())
    }

    /// Deterministic core of [`HybridClock::update`].
    pub fn update_at(&mut self, remote: &Hlc, now: u64) -> Hlc {
        let local_physical = self.last_physical;
        self.last_physical = self.last_physical.max(remote.physical).max(now);

        if self.last_physical == local_physical && self.last_physical == remote.physical {
            self.counter = self.counter.max(remote.counter);
            self.bump_counter();
        } else if self.last_physical == remote.physical {
            self.counter = remote.counter;
            self.bump_counter();
        } else if self.last_physical == local_physical {
            self.bump_counter();
        } else {
            self.counter = 0;
        }

        Hlc::new(self.last_physical, self.counter, self.node.clone())
    }

    /// Increments the counter, spilling into the physical component
    /// at `u16::MAX` so monotonicity never breaks.
    fn bump_counter(&mut self) {
        match self.counter.checked_add(1) {
            Some(c) => self.counter = c,
            None => {
                self.last_physical += 1;
                self.counter = 0;
            }
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
fn wall_clock_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn clock(id: &str) -> HybridClock {
        HybridClock::new(NodeId::new(id).unwrap())
    }

    #[test]
    fn advancing_time_resets_counter() {
        let mut c = clock("a");
        let t1 = c.generate_at(100);
        let t2 = c.generate_at(200);
        assert_eq!((t1.physical, t1.counter), (100, 0));
        assert_eq!((t2.physical, t2.counter), (200, 0));
    }

    #[test]
    fn stalled_clock_increments_counter() {
        let mut c = clock("a");
        let t1 = c.generate_at(100);
        let t2 = c.generate_at(100);
        let t3 = c.generate_at(100);
        assert_eq!(t1.counter, 0);
        assert_eq!(t2.counter, 1);
        assert_eq!(t3.counter, 2);
        assert!(t1 < t2 && t2 < t3);
    }

    #[test]
    fn backward_clock_keeps_monotonicity() {
        let mut c = clock("a");
        let t1 = c.generate_at(200);
        let t2 = c.generate_at(100); // regression
        assert_eq!(t2.physical, 200);
        assert_eq!(t2.counter, 1);
        assert!(t2 > t1);
    }

    #[test]
    fn update_advances_past_remote_future() {
        let mut c = clock("a");
        c.generate_at(100);
        let remote = Hlc::new(5000, 3, NodeId::new("b").unwrap());
        let t = c.update_at(&remote, 100);
        assert_eq!(t.physical, 5000);
        assert_eq!(t.counter, 4);
        assert!(t > remote);
    }

    #[test]
    fn update_with_equal_physical_everywhere() {
        let mut c = clock("a");
        c.generate_at(100);
        c.generate_at(100); // counter = 1
        let remote = Hlc::new(100, 7, NodeId::new("b").unwrap());
        let t = c.update_at(&remote, 100);
        // max(local 1, remote 7) + 1
        assert_eq!((t.physical, t.counter), (100, 8));
    }

    #[test]
    fn update_where_local_physical_leads() {
        let mut c = clock("a");
        c.generate_at(500);
        let remote = Hlc::new(100, 9, NodeId::new("b").unwrap());
        let t = c.update_at(&remote, 400);
        assert_eq!((t.physical, t.counter), (500, 1));
    }

    #[test]
    fn update_where_now_leads_everything() {
        let mut c = clock("a");
        c.generate_at(100);
        let remote = Hlc::new(200, 9, NodeId::new("b").unwrap());
        let t = c.update_at(&remote, 300);
        assert_eq!((t.physical, t.counter), (300, 0));
    }

    #[test]
    fn counter_exhaustion_spills_into_physical() {
        let mut c = clock("a");
        c.generate_at(100);
        c.counter = u16::MAX;
        let t = c.generate_at(100);
        assert_eq!((t.physical, t.counter), (101, 0));
    }

    #[test]
    fn lagging_node_resynchronizes_via_update() {
        // A node far in the past climbs its counter until an update
        // call pulls its physical component forward.
        let mut lagging = clock("slow");
        let mut ahead = clock("fast");

        let remote = ahead.generate_at(1_000_000);
        let t1 = lagging.generate_at(10);
        assert_eq!(t1.physical, 10);

        let t2 = lagging.update_at(&remote, 10);
        assert_eq!(t2.physical, 1_000_000);
        let t3 = lagging.generate_at(11);
        assert!(t3 > t2);
        assert!(t3 > remote);
    }

    proptest! {
        #[test]
        fn generate_is_strictly_monotonic(times in prop::collection::vec(0u64..1_000_000, 1..50)) {
            let mut c = clock("node");
            let mut last: Option<Hlc> = None;
            for now in times {
                let ts = c.generate_at(now);
                if let Some(prev) = &last {
                    prop_assert!(ts > *prev);
                }
                last = Some(ts);
            }
        }

        #[test]
        fn update_always_exceeds_remote(
            p in 0u64..(1 << 48), cnt in 0u16..u16::MAX - 1,
            now in 0u64..(1 << 48), repeats in 1usize..10,
        ) {
            let remote = Hlc::new(p, cnt, NodeId::new("remote").unwrap());
            let mut c = clock("local");
            for _ in 0..repeats {
                let ts = c.update_at(&remote, now);
                prop_assert!(ts > remote);
            }
        }

        #[test]
        fn interleaved_generate_and_update_stay_monotonic(
            events in prop::collection::vec((any::<bool>(), 0u64..100_000, any::<u16>()), 1..40),
        ) {
            let mut c = clock("local");
            let mut last: Option<Hlc> = None;
            for (is_update, now, cnt) in events {
                let ts = if is_update {
                    let remote = Hlc::new(now, cnt.min(u16::MAX - 1), NodeId::new("peer").unwrap());
                    c.update_at(&remote, now)
                } else {
                    c.generate_at(now)
                };
                if let Some(prev) = &last {
                    prop_assert!(ts > *prev);
                }
                last = Some(ts);
            }
        }
    }
}
