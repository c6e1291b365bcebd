//! Handoff between the IR edge interrupt and the main loop.
//!
//! The edge handler is the only writer of the decoder; the main loop only
//! consumes finished frames. A finished frame is published whole through a
//! single-slot [`Signal`]: a newer frame replaces an unread one, and a frame
//! is handed out at most once.

use core::{
    cell::RefCell,
    sync::atomic::{
        AtomicU32,
        Ordering,
    },
};

use critical_section::Mutex;
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    signal::Signal,
};

use crate::ir::{
    IrDecoder,
    PulsePolicy,
    RemoteFrame,
};

pub struct Receiver {
    decoder: Mutex<RefCell<IrDecoder>>,
    ready: Signal<CriticalSectionRawMutex, RemoteFrame>,
    overruns: AtomicU32,
}

impl Receiver {
    pub const fn new(policy: PulsePolicy) -> Self {
        Self {
            decoder: Mutex::new(RefCell::new(IrDecoder::new(policy))),
            ready: Signal::new(),
            overruns: AtomicU32::new(0),
        }
    }

    /// Change the pulse policy. Any partial frame is dropped.
    pub fn set_policy(&self, policy: PulsePolicy) {
        critical_section::with(|cs| {
            *self.decoder.borrow_ref_mut(cs) = IrDecoder::new(policy);
        });
    }

    /// Falling edge on the receiver pin, `elapsed_us` after the previous one.
    ///
    /// Runs in interrupt context.
    pub fn on_edge(&self, elapsed_us: u32) {
        let frame = critical_section::with(|cs| {
            self.decoder.borrow_ref_mut(cs).on_falling_edge(elapsed_us)
        });
        if let Some(frame) = frame {
            if self.ready.signaled() {
                self.overruns.fetch_add(1, Ordering::Relaxed);
                warn!("ir: unread frame overwritten");
            }
            self.ready.signal(frame);
        }
    }

    /// Watchdog expiry: no edge for a whole watchdog period.
    ///
    /// Runs in the timer interrupt and drops the partial frame right away
    /// instead of waiting for the next edge.
    pub fn on_watchdog(&self) {
        critical_section::with(|cs| self.decoder.borrow_ref_mut(cs).abandon());
    }

    /// Take the pending frame, if any. Never blocks.
    pub fn try_take(&self) -> Option<RemoteFrame> {
        self.ready.try_take()
    }

    /// Wait for the next frame.
    pub async fn wait(&self) -> RemoteFrame {
        self.ready.wait().await
    }

    /// Frames that were replaced before the main loop read them.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    pub fn is_idle(&self) -> bool {
        critical_section::with(|cs| self.decoder.borrow_ref(cs).is_idle())
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new(PulsePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::frame_timings;

    fn send(receiver: &Receiver, code: u32) {
        for us in frame_timings(code) {
            receiver.on_edge(us);
        }
    }

    #[test]
    fn frame_is_consumed_once() {
        let receiver = Receiver::default();
        assert_eq!(receiver.try_take(), None);
        send(&receiver, 0xDEAD_BEEF);
        assert_eq!(receiver.try_take(), Some(RemoteFrame(0xDEAD_BEEF)));
        assert_eq!(receiver.try_take(), None);
    }

    #[test]
    fn partial_frame_is_never_published() {
        let receiver = Receiver::default();
        for us in frame_timings(0xDEAD_BEEF).take(33) {
            receiver.on_edge(us);
        }
        assert_eq!(receiver.try_take(), None);
        assert!(!receiver.is_idle());
    }

    #[test]
    fn newer_frame_overwrites_unread_one() {
        let receiver = Receiver::default();
        send(&receiver, 1);
        send(&receiver, 2);
        assert_eq!(receiver.overruns(), 1);
        assert_eq!(receiver.try_take(), Some(RemoteFrame(2)));
        assert_eq!(receiver.try_take(), None);
    }

    #[test]
    fn watchdog_abandons_immediately() {
        let receiver = Receiver::default();
        for us in frame_timings(0xFFFF_FFFF).take(12) {
            receiver.on_edge(us);
        }
        receiver.on_watchdog();
        assert!(receiver.is_idle());

        send(&receiver, 0x0F0F_0F0F);
        assert_eq!(receiver.try_take(), Some(RemoteFrame(0x0F0F_0F0F)));
    }

    #[test]
    fn wait_returns_pending_frame() {
        let receiver = Receiver::default();
        send(&receiver, 42);
        let frame = embassy_futures::block_on(receiver.wait());
        assert_eq!(frame, RemoteFrame(42));
    }

    #[test]
    fn policy_change_resets_decoder() {
        let receiver = Receiver::default();
        for us in frame_timings(0).take(5) {
            receiver.on_edge(us);
        }
        receiver.set_policy(PulsePolicy::Strict);
        assert!(receiver.is_idle());
    }
}
