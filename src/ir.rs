//! Pulse-distance IR remote decoder.
//!
//! The receiver output idles high and pulls low at the start of every burst,
//! so each falling edge carries one timing sample: the microseconds since the
//! previous edge. A frame is a leader gap followed by 32 bit gaps, least
//! significant bit first.
//!
//! The decoder is a plain state machine with no hardware access. The edge
//! interrupt feeds it through [`Receiver`](crate::receiver::Receiver), which
//! also owns the watchdog hook and the handoff to the main loop.

/// Exclusive bounds (in µs) around an accepted gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseWindow {
    pub min_us: u32,
    pub max_us: u32,
}

impl PulseWindow {
    pub const fn new(min_us: u32, max_us: u32) -> Self {
        Self { min_us, max_us }
    }

    pub const fn contains(self, elapsed_us: u32) -> bool {
        elapsed_us > self.min_us && elapsed_us < self.max_us
    }
}

/// Gap between the first two edges of a frame.
pub const LEADER: PulseWindow = PulseWindow::new(13_000, 14_000);
/// Gap encoding a 0 bit.
pub const ZERO: PulseWindow = PulseWindow::new(1_100, 1_200);
/// Gap encoding a 1 bit.
pub const ONE: PulseWindow = PulseWindow::new(2_200, 2_300);

/// Bits in one frame.
pub const FRAME_BITS: u8 = 32;

/// What to do with a gap that is neither a 0 nor a 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulsePolicy {
    /// Count the gap as a 0 bit. Matches the stock remote bit for bit.
    #[default]
    Lenient,
    /// Drop the partial frame and wait for a new leader.
    Strict,
}

/// One complete 32-bit command word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteFrame(pub u32);

impl RemoteFrame {
    pub const fn code(self) -> u32 {
        self.0
    }
}

/// Decoder state between the leader and the 32nd bit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrDecoder {
    signal_started: bool,
    leader_seen: bool,
    bit_index: u8,
    word: u32,
    policy: PulsePolicy,
}

impl IrDecoder {
    pub const fn new(policy: PulsePolicy) -> Self {
        Self {
            signal_started: false,
            leader_seen: false,
            bit_index: 0,
            word: 0,
            policy,
        }
    }

    /// True when no frame is in progress.
    pub const fn is_idle(&self) -> bool {
        !self.signal_started
    }

    /// Bits accumulated so far in the current frame.
    pub const fn bit_index(&self) -> u8 {
        self.bit_index
    }

    /// Feed one falling edge. Returns the frame completed by this edge, if any.
    pub fn on_falling_edge(&mut self, elapsed_us: u32) -> Option<RemoteFrame> {
        if !self.signal_started {
            // Opens the leader window; nothing to measure yet.
            self.signal_started = true;
            return None;
        }

        if !self.leader_seen {
            if LEADER.contains(elapsed_us) {
                self.leader_seen = true;
                self.word = 0;
                self.bit_index = 0;
            } else {
                trace!("ir: rejected leader gap {=u32} us", elapsed_us);
                self.signal_started = false;
            }
            return None;
        }

        if ONE.contains(elapsed_us) {
            self.word |= 1 << self.bit_index;
        } else if !ZERO.contains(elapsed_us) && self.policy == PulsePolicy::Strict {
            trace!("ir: ambiguous gap {=u32} us at bit {=u8}", elapsed_us, self.bit_index);
            self.abandon();
            return None;
        }

        self.bit_index += 1;
        if self.bit_index < FRAME_BITS {
            return None;
        }

        let frame = RemoteFrame(self.word);
        self.abandon();
        Some(frame)
    }

    /// Forget any partial frame. Called by the watchdog and after each frame.
    pub fn abandon(&mut self) {
        self.signal_started = false;
        self.leader_seen = false;
        self.bit_index = 0;
    }
}

impl Default for IrDecoder {
    fn default() -> Self {
        Self::new(PulsePolicy::default())
    }
}

/// Edge timings for `code`, starting with the edge that opens the leader.
///
/// Produces the same sequence a real remote would, which makes it handy for
/// exercising the decoder without hardware.
pub fn frame_timings(code: u32) -> impl Iterator<Item = u32> {
    const IDLE_US: u32 = 50_000;
    const LEADER_US: u32 = 13_500;
    const ZERO_US: u32 = 1_125;
    const ONE_US: u32 = 2_250;

    [IDLE_US, LEADER_US]
        .into_iter()
        .chain((0..FRAME_BITS).map(move |bit| if (code >> bit) & 1 == 1 { ONE_US } else { ZERO_US }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(decoder: &mut IrDecoder, timings: impl IntoIterator<Item = u32>) -> Vec<RemoteFrame> {
        timings
            .into_iter()
            .filter_map(|us| decoder.on_falling_edge(us))
            .collect()
    }

    #[test]
    fn decodes_lsb_first() {
        let mut decoder = IrDecoder::default();
        let frames = feed(&mut decoder, frame_timings(0x8000_0001));
        assert_eq!(frames, vec![RemoteFrame(0x8000_0001)]);
        assert!(decoder.is_idle());
    }

    #[test]
    fn each_bit_follows_its_gap_width() {
        let mut decoder = IrDecoder::default();
        let mut timings = vec![0, 13_500];
        for bit in 0..32 {
            timings.push(if bit % 3 == 0 { 2_201 } else { 1_199 });
        }
        let frames = feed(&mut decoder, timings);
        let word = frames[0].code();
        for bit in 0..32 {
            assert_eq!((word >> bit) & 1 == 1, bit % 3 == 0, "bit {bit}");
        }
    }

    #[test]
    fn window_bounds_are_exclusive() {
        assert!(!LEADER.contains(13_000));
        assert!(LEADER.contains(13_001));
        assert!(!LEADER.contains(14_000));
        assert!(!ONE.contains(2_300));
        assert!(!ZERO.contains(1_100));
    }

    #[test]
    fn bad_leader_restarts() {
        let mut decoder = IrDecoder::default();
        assert_eq!(decoder.on_falling_edge(0), None);
        assert_eq!(decoder.on_falling_edge(9_000), None);
        assert!(decoder.is_idle());

        // The rejected edge is not reused; a full frame still decodes afterwards.
        let frames = feed(&mut decoder, frame_timings(0x1234_5678));
        assert_eq!(frames, vec![RemoteFrame(0x1234_5678)]);
    }

    #[test]
    fn frame_ready_once_per_32_bits() {
        let mut decoder = IrDecoder::default();
        let mut timings: Vec<u32> = frame_timings(u32::MAX).collect();
        let last = timings.pop().unwrap();
        assert!(feed(&mut decoder, timings).is_empty());
        assert_eq!(decoder.bit_index(), 31);
        assert_eq!(decoder.on_falling_edge(last), Some(RemoteFrame(u32::MAX)));
        assert_eq!(decoder.bit_index(), 0);
        assert!(decoder.is_idle());
        // The next edge only opens a new leader window.
        assert_eq!(decoder.on_falling_edge(2_250), None);
        assert!(!decoder.is_idle());
    }

    #[test]
    fn lenient_policy_reads_ambiguous_gap_as_zero() {
        let mut decoder = IrDecoder::new(PulsePolicy::Lenient);
        let mut timings: Vec<u32> = frame_timings(u32::MAX).collect();
        timings[2 + 4] = 1_700;
        let frames = feed(&mut decoder, timings);
        assert_eq!(frames, vec![RemoteFrame(u32::MAX & !(1 << 4))]);
    }

    #[test]
    fn strict_policy_drops_ambiguous_frame() {
        let mut decoder = IrDecoder::new(PulsePolicy::Strict);
        let mut timings: Vec<u32> = frame_timings(u32::MAX).collect();
        timings[2 + 4] = 1_700;
        assert!(feed(&mut decoder, timings).is_empty());
        // The 27 bit gaps after the drop pair up as rejected leaders and leave
        // one window open; only the watchdog brings the decoder back in phase.
        assert!(!decoder.is_idle());
        decoder.abandon();

        let frames = feed(&mut decoder, frame_timings(7));
        assert_eq!(frames, vec![RemoteFrame(7)]);
    }

    #[test]
    fn abandon_discards_partial_frame() {
        let mut decoder = IrDecoder::default();
        let timings: Vec<u32> = frame_timings(0xFFFF_0000).take(20).collect();
        assert!(feed(&mut decoder, timings).is_empty());
        decoder.abandon();
        assert!(decoder.is_idle());
        assert_eq!(decoder.bit_index(), 0);

        let frames = feed(&mut decoder, frame_timings(0x0000_FFFF));
        assert_eq!(frames, vec![RemoteFrame(0x0000_FFFF)]);
    }
}
