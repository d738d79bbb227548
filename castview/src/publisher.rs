/*!
    Latest-frame publication.
*/

use std::sync::Arc;

use parking_lot::Mutex;

use media_types::DisplayFrame;

/**
    Single-slot "latest frame wins" register.

    [`publish`] overwrites any unconsumed prior frame: frames are dropped
    rather than queued, which bounds end-to-end latency and memory under a
    slow consumer at the cost of giving the decode loop no back-pressure
    signal. [`publish`] never blocks on the consumer, and [`latest`] is safe
    to call from any thread concurrently with it. The lock is held only for
    the pointer swap, never across native calls.

    [`publish`]: Self::publish
    [`latest`]: Self::latest
*/
#[derive(Default)]
pub struct FrameSlot {
    slot: Mutex<Option<Arc<DisplayFrame>>>,
}

impl FrameSlot {
    /**
        Create an empty slot.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Store a frame, replacing any unconsumed prior frame.
    */
    pub fn publish(&self, frame: DisplayFrame) {
        *self.slot.lock() = Some(Arc::new(frame));
    }

    /**
        The most recently published frame, if any.
    */
    pub fn latest(&self) -> Option<Arc<DisplayFrame>> {
        self.slot.lock().clone()
    }

    /**
        Empty the slot.
    */
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(sequence: u64) -> DisplayFrame {
        DisplayFrame::new(vec![0u8; 16], 2, 2, 8, sequence)
    }

    #[test]
    fn empty_slot_has_no_frame() {
        let slot = FrameSlot::new();
        assert!(slot.latest().is_none());
    }

    #[test]
    fn publish_overwrites() {
        let slot = FrameSlot::new();
        slot.publish(frame(0));
        slot.publish(frame(1));
        slot.publish(frame(2));

        assert_eq!(slot.latest().expect("frame").sequence, 2);
    }

    #[test]
    fn latest_is_repeatable_until_overwritten() {
        let slot = FrameSlot::new();
        slot.publish(frame(7));

        assert_eq!(slot.latest().expect("frame").sequence, 7);
        assert_eq!(slot.latest().expect("frame").sequence, 7);
    }

    #[test]
    fn clear_empties_the_slot() {
        let slot = FrameSlot::new();
        slot.publish(frame(0));
        slot.clear();
        assert!(slot.latest().is_none());
    }

    #[test]
    fn concurrent_publish_and_read() {
        let slot = Arc::new(FrameSlot::new());

        let writer = {
            let slot = Arc::clone(&slot);
            std::thread::spawn(move || {
                for sequence in 0..1000 {
                    slot.publish(frame(sequence));
                }
            })
        };

        // A reader only ever observes a strict subset of the published
        // frames, in order.
        let mut last_seen = None;
        while !writer.is_finished() {
            if let Some(f) = slot.latest() {
                if let Some(last) = last_seen {
                    assert!(f.sequence >= last, "went backwards: {} < {last}", f.sequence);
                }
                last_seen = Some(f.sequence);
            }
        }
        writer.join().expect("writer");

        assert_eq!(slot.latest().expect("frame").sequence, 999);
    }
}
