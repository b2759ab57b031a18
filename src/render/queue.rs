//! Lock-free hand-off of live MIDI from other threads to the renderer.
//!
//! A UI or network thread holds the [`EventSender`]; the renderer owns the
//! receiving end and drains it at the start of every block. Neither side
//! blocks: a full queue hands the event back to the sender.

use crate::midi::event::MidiEvent;

/// Anything the renderer can pull live events from without blocking.
pub trait EventReceiver: Send {
    fn pop_event(&mut self) -> Option<MidiEvent>;
}

#[cfg(feature = "rtrb")]
pub use ring::{event_queue, EventQueue, EventSender};

#[cfg(feature = "rtrb")]
mod ring {
    use rtrb::{Consumer, Producer, RingBuffer};

    use super::EventReceiver;
    use crate::midi::event::MidiEvent;

    /// Create a single-producer/single-consumer queue holding up to
    /// `capacity` events.
    pub fn event_queue(capacity: usize) -> (EventSender, EventQueue) {
        let (producer, consumer) = RingBuffer::new(capacity.max(1));
        (EventSender { producer }, EventQueue { consumer })
    }

    pub struct EventSender {
        producer: Producer<MidiEvent>,
    }

    impl EventSender {
        /// Queue `event`, or hand it back if the renderer has fallen behind.
        pub fn send(&mut self, event: MidiEvent) -> Result<(), MidiEvent> {
            self.producer.push(event).map_err(|err| match err {
                rtrb::PushError::Full(event) => event,
            })
        }

        pub fn slots(&self) -> usize {
            self.producer.slots()
        }

        /// False once the receiving renderer has been dropped.
        pub fn is_connected(&self) -> bool {
            !self.producer.is_abandoned()
        }
    }

    pub struct EventQueue {
        consumer: Consumer<MidiEvent>,
    }

    impl EventReceiver for EventQueue {
        fn pop_event(&mut self) -> Option<MidiEvent> {
            self.consumer.pop().ok()
        }
    }

    impl EventReceiver for Consumer<MidiEvent> {
        fn pop_event(&mut self) -> Option<MidiEvent> {
            self.pop().ok()
        }
    }
}

#[cfg(all(test, feature = "rtrb"))]
mod tests {
    use super::*;

    #[test]
    fn events_arrive_in_order() {
        let (mut tx, mut rx) = event_queue(4);
        tx.send(MidiEvent::note_on(0, 60, 100)).unwrap();
        tx.send(MidiEvent::note_off(0, 60)).unwrap();

        assert!(rx.pop_event().unwrap().is_note_on());
        assert!(rx.pop_event().unwrap().is_note_off());
        assert!(rx.pop_event().is_none());
    }

    #[test]
    fn full_queue_returns_event() {
        let (mut tx, _rx) = event_queue(1);
        tx.send(MidiEvent::note_on(0, 60, 100)).unwrap();

        let rejected = tx.send(MidiEvent::note_on(0, 62, 100)).unwrap_err();
        assert_eq!(rejected.note(), 62);
        assert_eq!(tx.slots(), 0);
    }

    #[test]
    fn sender_notices_dropped_receiver() {
        let (tx, rx) = event_queue(2);
        assert!(tx.is_connected());
        drop(rx);
        assert!(!tx.is_connected());
    }
}
