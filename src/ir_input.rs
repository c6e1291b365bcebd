//! IR receiver pin and its watchdog timer.
//!
//! The demodulating receiver pulls the pin low at the start of every burst.
//! Each falling edge is timed against the previous one and fed to the shared
//! [`Receiver`]. Every edge also restarts a one-shot watchdog; when it
//! expires the partial frame is dropped straight from the timer interrupt.

use core::cell::{
    Cell,
    RefCell,
};

use critical_section::Mutex;
use esp_hal::{
    Blocking,
    gpio::{
        Event,
        Input,
        InputConfig,
        Io,
        Pull,
    },
    handler,
    time::{
        Duration,
        Instant,
    },
    timer::{
        OneShotTimer,
        timg::TimerGroup,
    },
};

use crate::{
    IrResources,
    config::WATCHDOG_MS,
    ir::PulsePolicy,
    receiver::Receiver,
};

static RECEIVER: Receiver = Receiver::new(PulsePolicy::Lenient);

static PIN: Mutex<RefCell<Option<Input<'static>>>> = Mutex::new(RefCell::new(None));
static WATCHDOG: Mutex<RefCell<Option<OneShotTimer<'static, Blocking>>>> =
    Mutex::new(RefCell::new(None));
static LAST_EDGE: Mutex<Cell<Option<Instant>>> = Mutex::new(Cell::new(None));

/// Hook the receiver pin and watchdog interrupts up to the shared decoder.
///
/// Returns the receiver the main loop takes frames from.
pub fn install(res: IrResources<'static>, policy: PulsePolicy) -> &'static Receiver {
    RECEIVER.set_policy(policy);

    let mut io = Io::new(res.io_mux);
    io.set_interrupt_handler(on_edge);
    let mut pin = Input::new(res.pin, InputConfig::default().with_pull(Pull::Up));

    let timg = TimerGroup::new(res.timg);
    let mut watchdog = OneShotTimer::new(timg.timer0);
    watchdog.set_interrupt_handler(on_watchdog);
    watchdog.listen();

    critical_section::with(|cs| {
        pin.listen(Event::FallingEdge);
        PIN.borrow_ref_mut(cs).replace(pin);
        WATCHDOG.borrow_ref_mut(cs).replace(watchdog);
    });
    info!("ir: receiver armed, watchdog {=u64} ms", WATCHDOG_MS);
    &RECEIVER
}

#[handler]
fn on_edge() {
    let now = Instant::now();
    let elapsed = critical_section::with(|cs| {
        let mut pin = PIN.borrow_ref_mut(cs);
        let pin = pin.as_mut()?;
        if !pin.is_interrupt_set() {
            return None;
        }
        pin.clear_interrupt();

        if let Some(watchdog) = WATCHDOG.borrow_ref_mut(cs).as_mut() {
            watchdog.stop();
            if watchdog.schedule(Duration::from_millis(WATCHDOG_MS)).is_err() {
                warn!("ir: watchdog could not be armed");
            }
        }

        let previous = LAST_EDGE.borrow(cs).replace(Some(now));
        Some(previous.map_or(u32::MAX, |previous| {
            u32::try_from((now - previous).as_micros()).unwrap_or(u32::MAX)
        }))
    });

    if let Some(elapsed) = elapsed {
        RECEIVER.on_edge(elapsed);
    }
}

#[handler]
fn on_watchdog() {
    critical_section::with(|cs| {
        if let Some(watchdog) = WATCHDOG.borrow_ref_mut(cs).as_mut() {
            watchdog.clear_interrupt();
        }
    });
    if !RECEIVER.is_idle() {
        trace!("ir: watchdog expired mid-frame");
    }
    RECEIVER.on_watchdog();
}
