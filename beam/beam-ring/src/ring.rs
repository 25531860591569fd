//! SPSC ring implementation.
//!
//! Counter protocol: `write` is the index of the next slot to fill, `read`
//! the oldest retained index. The producer writes the slot payload first and
//! then publishes it with a release store of `write`; readers pair that with
//! acquire loads. A reader copies a slot out, re-loads `write`, and rejects
//! the copy when the producer may have lapped it (`write - index >= capacity`),
//! so a torn copy is never returned.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use beam_types::TrackedFrame;

/// One ring slot: a published frame plus its local publish time.
#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    frame: TrackedFrame,
    t_publish_s: f64,
}

struct RingShared {
    slots: Box<[UnsafeCell<Slot>]>,
    mask: u64,
    capacity: u64,
    /// Next slot index to be written (monotone).
    write: AtomicU64,
    /// Oldest retained slot index.
    read: AtomicU64,
}

// SAFETY: slot payloads are only mutated by the single producer; readers
// validate every copy against `write` and discard potentially torn reads.
unsafe impl Sync for RingShared {}
unsafe impl Send for RingShared {}

impl RingShared {
    /// Copies slot `index` out, returning `None` if the producer may have
    /// overwritten it during the copy.
    fn copy_slot(&self, index: u64) -> Option<Slot> {
        let cell = &self.slots[(index & self.mask) as usize];
        // SAFETY: a concurrent producer write to this slot would tear the
        // copy; the re-load of `write` below detects that case and the copy
        // is discarded. Volatile read keeps the copy out of the data-race
        // optimization window.
        let slot = unsafe { std::ptr::read_volatile(cell.get()) };
        let write_after = self.write.load(Ordering::Acquire);
        // The producer starts overwriting slot `index` when it begins frame
        // `index + capacity`, which happens before `write` becomes
        // `index + capacity + 1`. Reject as soon as that write could be in
        // flight.
        if write_after - index >= self.capacity {
            return None;
        }
        Some(slot)
    }

    fn occupied(&self) -> (u64, u64) {
        let write = self.write.load(Ordering::Acquire);
        let read = self.read.load(Ordering::Acquire);
        (read.min(write), write)
    }
}

/// Builder for the SPSC frame ring.
///
/// See the crate docs for the concurrency contract.
pub struct FrameRing;

impl FrameRing {
    /// Creates a ring with the given capacity (rounded up to a power of
    /// two, minimum 2) and returns the producer/reader pair.
    #[must_use]
    pub fn channel(capacity: usize) -> (RingProducer, RingReader) {
        let capacity = capacity.max(2).next_power_of_two() as u64;
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(Slot::default()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        let shared = Arc::new(RingShared {
            slots,
            mask: capacity - 1,
            capacity,
            write: AtomicU64::new(0),
            read: AtomicU64::new(0),
        });
        (
            RingProducer {
                shared: Arc::clone(&shared),
            },
            RingReader { shared },
        )
    }
}

/// The single producer handle. Not cloneable.
pub struct RingProducer {
    shared: Arc<RingShared>,
}

impl RingProducer {
    /// Publishes a frame, overwriting the oldest slot when full.
    ///
    /// Returns `true` when the frame was stored (always, by construction;
    /// rate limiting is the caller's decision via [`Self::should_throttle`]).
    pub fn publish(&mut self, frame: &TrackedFrame, t_publish_s: f64) -> bool {
        let write = self.shared.write.load(Ordering::Relaxed);
        let cell = &self.shared.slots[(write & self.shared.mask) as usize];
        // SAFETY: sole producer; readers discard copies that race this write.
        unsafe {
            std::ptr::write_volatile(
                cell.get(),
                Slot {
                    frame: *frame,
                    t_publish_s,
                },
            );
        }
        self.shared.write.store(write + 1, Ordering::Release);

        // Drop-oldest: keep at most `capacity` occupied slots.
        let read = self.shared.read.load(Ordering::Relaxed);
        if write + 1 - read > self.shared.capacity {
            self.shared
                .read
                .store(write + 1 - self.shared.capacity, Ordering::Release);
        }
        true
    }

    /// Producer-side throttle heuristic.
    ///
    /// Returns `true` when the ring is near full and the newest slot was
    /// published less than `min_interval_s` ago, meaning the producer may
    /// skip this frame without starving consumers. Optional; never required
    /// for correctness.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn should_throttle(&self, min_interval_s: f64, now_s: f64) -> bool {
        let (read, write) = self.shared.occupied();
        if write == read {
            return false;
        }
        let occupancy = (write - read) as f64 / self.shared.capacity as f64;
        if occupancy < 0.75 {
            return false;
        }
        match self.shared.copy_slot(write - 1) {
            Some(slot) => now_s - slot.t_publish_s < min_interval_s,
            None => false,
        }
    }

    /// Resets the ring to empty.
    ///
    /// `write` stays monotone: restarting the index epoch would let a
    /// reader validate a torn pre-clear copy against post-clear counters.
    /// Emptiness is simply `read == write`.
    pub fn clear(&mut self) {
        let write = self.shared.write.load(Ordering::Relaxed);
        self.shared.read.store(write, Ordering::Release);
    }

    /// Creates an additional reader for this ring.
    #[must_use]
    pub fn reader(&self) -> RingReader {
        RingReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Fraction of the ring currently occupied, `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f32 {
        self.reader_view().utilization()
    }

    fn reader_view(&self) -> RingReader {
        RingReader {
            shared: Arc::clone(&self.shared),
        }
    }
}

/// A non-blocking consumer handle. Cloneable; every read copies out.
#[derive(Clone)]
pub struct RingReader {
    shared: Arc<RingShared>,
}

impl RingReader {
    /// Returns the most recently published frame, if any.
    #[must_use]
    pub fn latest(&self) -> Option<TrackedFrame> {
        loop {
            let (read, write) = self.shared.occupied();
            if write <= read {
                return None;
            }
            if let Some(slot) = self.shared.copy_slot(write - 1) {
                return Some(slot.frame);
            }
            // Lapped mid-copy; retry against the new counters.
            let (read_now, write_now) = self.shared.occupied();
            if write_now == write && read_now == read {
                return None;
            }
        }
    }

    /// Returns the frame whose `t_vendor_ms` is closest to `t_target_ms`,
    /// subject to `tolerance_ms`. Ties break toward the newer frame.
    #[must_use]
    pub fn frame_at(&self, t_target_ms: f64, tolerance_ms: f64) -> Option<TrackedFrame> {
        let (read, write) = self.shared.occupied();
        let mut best: Option<(f64, TrackedFrame)> = None;
        for index in read..write {
            let Some(slot) = self.shared.copy_slot(index) else {
                // Lapped while scanning; older slots are gone, keep going.
                continue;
            };
            let distance = (slot.frame.t_vendor_ms - t_target_ms).abs();
            if distance > tolerance_ms {
                continue;
            }
            // `<=` so the newer of two equidistant frames wins.
            match best {
                Some((best_distance, _)) if distance > best_distance => {}
                _ => best = Some((distance, slot.frame)),
            }
        }
        best.map(|(_, frame)| frame)
    }

    /// Returns the structural midpoint of the two newest frames, falling
    /// back to [`Self::latest`] when fewer than two frames are buffered.
    #[must_use]
    pub fn latest_interpolated(&self) -> Option<TrackedFrame> {
        let (read, write) = self.shared.occupied();
        if write >= 2 && write - read >= 2 {
            let newer = self.shared.copy_slot(write - 1);
            let older = self.shared.copy_slot(write - 2);
            if let (Some(newer), Some(older)) = (newer, older) {
                return Some(TrackedFrame::midpoint(&older.frame, &newer.frame));
            }
        }
        self.latest()
    }

    /// Fraction of the ring currently occupied, `[0, 1]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn utilization(&self) -> f32 {
        let (read, write) = self.shared.occupied();
        let occupied = (write - read).min(self.shared.capacity);
        occupied as f32 / self.shared.capacity as f32
    }

    /// Number of occupied slots.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(&self) -> usize {
        let (read, write) = self.shared.occupied();
        (write - read).min(self.shared.capacity) as usize
    }

    /// Returns true if no frames are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ring capacity after power-of-two rounding.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn capacity(&self) -> usize {
        self.shared.capacity as usize
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn frame(id: i64, t_vendor_ms: f64) -> TrackedFrame {
        TrackedFrame {
            frame_id: id,
            t_vendor_ms,
            ..TrackedFrame::default()
        }
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let (_, reader) = FrameRing::channel(5);
        assert_eq!(reader.capacity(), 8);
        let (_, reader) = FrameRing::channel(64);
        assert_eq!(reader.capacity(), 64);
        let (_, reader) = FrameRing::channel(0);
        assert_eq!(reader.capacity(), 2);
    }

    #[test]
    fn empty_ring_reads_none() {
        let (_, reader) = FrameRing::channel(8);
        assert!(reader.latest().is_none());
        assert!(reader.latest_interpolated().is_none());
        assert!(reader.frame_at(0.0, 1000.0).is_none());
        assert!(reader.is_empty());
        assert_eq!(reader.utilization(), 0.0);
    }

    #[test]
    fn latest_returns_last_published() {
        let (mut producer, reader) = FrameRing::channel(8);
        for id in 1..=5 {
            producer.publish(&frame(id, f64::from(id as u32) * 8.0), 0.0);
            assert_eq!(reader.latest().unwrap().frame_id, id);
        }
        assert_eq!(reader.len(), 5);
    }

    #[test]
    fn lapping_drops_oldest() {
        let (mut producer, reader) = FrameRing::channel(8);
        for id in 1..=9 {
            producer.publish(&frame(id, f64::from(id as u32)), 0.0);
        }
        // Frame 1 was lapped; oldest retrievable is published - capacity + 1.
        assert!(reader.frame_at(1.0, 0.1).is_none());
        assert_eq!(reader.frame_at(2.0, 0.1).unwrap().frame_id, 2);
        assert_eq!(reader.len(), 8);
        assert_eq!(reader.utilization(), 1.0);
    }

    #[test]
    fn frame_at_minimizes_distance() {
        let (mut producer, reader) = FrameRing::channel(8);
        producer.publish(&frame(1, 1000.0), 0.0);
        producer.publish(&frame(2, 1008.0), 0.0);
        producer.publish(&frame(3, 1016.0), 0.0);

        assert_eq!(reader.frame_at(1009.0, 4.0).unwrap().frame_id, 2);
        assert_eq!(reader.frame_at(1013.0, 4.0).unwrap().frame_id, 3);
        assert!(reader.frame_at(900.0, 4.0).is_none());
    }

    #[test]
    fn frame_at_ties_break_newer() {
        let (mut producer, reader) = FrameRing::channel(8);
        producer.publish(&frame(1, 1000.0), 0.0);
        producer.publish(&frame(2, 1008.0), 0.0);
        // 1004 is equidistant; the newer frame wins.
        assert_eq!(reader.frame_at(1004.0, 8.0).unwrap().frame_id, 2);
    }

    #[test]
    fn interpolated_is_midpoint_of_last_two() {
        let (mut producer, reader) = FrameRing::channel(8);
        producer.publish(&frame(1, 1000.0), 0.0);
        producer.publish(&frame(2, 1008.0), 0.0);

        let mid = reader.latest_interpolated().unwrap();
        assert_eq!(mid.t_vendor_ms, 1004.0);
        assert_eq!(mid.frame_id, 2);
    }

    #[test]
    fn interpolated_falls_back_to_latest() {
        let (mut producer, reader) = FrameRing::channel(8);
        producer.publish(&frame(1, 1000.0), 0.0);
        let got = reader.latest_interpolated().unwrap();
        assert_eq!(got.frame_id, 1);
        assert_eq!(got.t_vendor_ms, 1000.0);
    }

    #[test]
    fn clear_empties_ring() {
        let (mut producer, reader) = FrameRing::channel(8);
        producer.publish(&frame(1, 0.0), 0.0);
        producer.publish(&frame(2, 8.0), 0.0);
        producer.clear();
        assert!(reader.latest().is_none());
        assert!(reader.is_empty());

        // Ring is usable again after clear.
        producer.publish(&frame(3, 16.0), 1.0);
        assert_eq!(reader.latest().unwrap().frame_id, 3);
    }

    #[test]
    fn clear_keeps_slot_indices_monotone() {
        let (mut producer, reader) = FrameRing::channel(4);
        for id in 1..=3 {
            producer.publish(&frame(id, f64::from(id as u32) * 8.0), 0.0);
        }
        producer.clear();
        assert!(reader.is_empty());
        // Pre-clear frames are unreachable by timestamp.
        assert!(reader.frame_at(8.0, 0.5).is_none());

        producer.publish(&frame(9, 72.0), 0.0);
        assert_eq!(reader.len(), 1);
        assert_eq!(reader.latest().unwrap().frame_id, 9);

        // Lapping keeps working across the clear boundary.
        for id in 10..=13 {
            producer.publish(&frame(id, f64::from(id as u32) * 8.0), 0.0);
        }
        assert_eq!(reader.len(), 4);
        assert!(reader.frame_at(72.0, 0.5).is_none());
        assert_eq!(reader.latest().unwrap().frame_id, 13);
    }

    #[test]
    fn throttle_requires_near_full_ring() {
        let (mut producer, _reader) = FrameRing::channel(4);
        assert!(!producer.should_throttle(0.008, 0.0));

        producer.publish(&frame(1, 0.0), 0.0);
        producer.publish(&frame(2, 8.0), 0.001);
        producer.publish(&frame(3, 16.0), 0.002);
        // 3/4 occupied, newest published 0.001 s ago.
        assert!(producer.should_throttle(0.008, 0.003));
        assert!(!producer.should_throttle(0.008, 0.5));
    }

    #[test]
    fn readers_see_producer_updates_across_threads() {
        let (mut producer, reader) = FrameRing::channel(64);
        let consumer = reader.clone();

        let handle = std::thread::spawn(move || {
            let mut last_seen = 0i64;
            loop {
                if let Some(f) = consumer.latest() {
                    assert!(f.frame_id >= last_seen, "frame ids went backwards");
                    last_seen = f.frame_id;
                    if f.frame_id == 1000 {
                        return last_seen;
                    }
                }
                std::hint::spin_loop();
            }
        });

        for id in 1..=1000 {
            producer.publish(&frame(id, f64::from(id as u32) * 8.0), 0.0);
        }
        assert_eq!(handle.join().unwrap(), 1000);
    }
}
