//! # ir-tank
//!
//! A tank arcade game steered with an infrared remote and an accelerometer.
//!
//! The portable core builds for any target:
//! - **IR decoding**: pulse-width decoder for 32-bit remote frames, fed one
//!   falling edge at a time from an interrupt ([`ir`], [`receiver`])
//! - **Input**: remote codes mapped to buttons ([`remote`]) and BMA222 tilt
//!   over I2C ([`accel`])
//! - **Game**: player, enemy and projectile simulation ([`game`],
//!   [`entities`], [`direction`])
//! - **Scenes**: title, menus, leaderboard and game over ([`scene`],
//!   [`menu`], [`render`])
//! - **High scores**: a remote JSON shadow document with an offline
//!   fallback ([`scores`])
//!
//! With the `badge` feature the crate also carries board support for the
//! ESP32-S3 badge: the ST7789 display, backlight, IR receiver pin with its
//! watchdog timer, and the accelerometer bus.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! let peripherals = ir_tank::init();
//! let resources = ir_tank::split_resources!(peripherals);
//!
//! let display: ir_tank::Display = resources.display.into();
//! let receiver = ir_tank::ir_input::install(resources.ir, ir_tank::ir::PulsePolicy::Lenient);
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod accel;
pub mod config;
pub mod direction;
pub mod entities;
pub mod game;
pub mod ir;
pub mod menu;
pub mod receiver;
pub mod remote;
pub mod render;
pub mod scene;
pub mod scores;

pub use config::{
    Difficulty,
    GameConfig,
};
pub use scene::{
    Arcade,
    Platform,
    Scene,
};

#[cfg(feature = "badge")]
mod backlight;
#[cfg(feature = "badge")]
mod display;
#[cfg(feature = "badge")]
pub mod ir_input;
#[cfg(feature = "badge")]
mod platform;

#[cfg(feature = "badge")]
pub use backlight::Backlight;
#[cfg(feature = "badge")]
pub use display::{
    Display,
    PLAYFIELD_ORIGIN,
};
#[cfg(feature = "badge")]
pub use platform::BadgePlatform;

/// StaticCell helper, allocates a value into a `static` exactly once.
#[cfg(feature = "badge")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}

// ── Pin / peripheral assignments ────────────────────────────────────────────

#[cfg(feature = "badge")]
esp_hal::assign_resources! {
    pub Resources<'d> {
        display: DisplayResources<'d> {
            dc: GPIO15,
            rst: GPIO7,
            sck: GPIO4,
            cs: GPIO6,
            miso: GPIO16,
            mosi: GPIO5,
            spi: SPI2,
            dma: DMA_CH0,
        },
        backlight: BacklightResources<'d> {
            led: GPIO19,
        },
        ir: IrResources<'d> {
            pin: GPIO9,
            io_mux: IO_MUX,
            timg: TIMG1,
        },
        accel: AccelResources<'d> {
            sda: GPIO39,
            scl: GPIO40,
            i2c: I2C0,
        },
    }
}

// ── Board initialisation ────────────────────────────────────────────────────

/// Initialise the badge and return the raw peripheral set.
///
/// Call once at the top of `main`, then break the peripherals into resource
/// groups with [`split_resources!`].
#[cfg(feature = "badge")]
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    let config = esp_hal::Config::default().with_cpu_clock(esp_hal::clock::CpuClock::_160MHz);
    esp_hal::init(config)
}

#[cfg(feature = "badge")]
impl From<esp_hal::peripherals::Peripherals> for Resources<'_> {
    fn from(peripherals: esp_hal::peripherals::Peripherals) -> Self {
        split_resources!(peripherals)
    }
}
