//! IR tank arcade firmware for the badge.
//!
//! The game runs on a 128×128 playfield centred on the panel. Steer by
//! tilting the badge; an IR remote turns the cannon (Left/Right) and fires.
//!
//! The player name sent with high scores is taken from `IR_TANK_PLAYER` at
//! build time.

#![no_std]
#![no_main]

use alloc::vec::Vec;

use defmt::{
    error,
    info,
};
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use ir_tank::{
    Arcade,
    BadgePlatform,
    Backlight,
    Display,
    GameConfig,
    PLAYFIELD_ORIGIN,
    ir_input,
    mk_static,
    scores::{
        ShadowScores,
        ShadowTransport,
    },
    split_resources,
};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

const PLAYER_NAME: &str = match option_env!("IR_TANK_PLAYER") {
    Some(name) => name,
    None => "nadav",
};

/// Seed for the enemy spawn generator; rounds are further mixed with tick counts.
const SEED: u64 = 0xDEAD_BEEF;

#[derive(Debug, defmt::Format)]
struct NoNetwork;

/// The badge has no network stack yet, so the leaderboard goes offline on
/// first use and the game stays playable.
struct Unplugged;

impl ShadowTransport for Unplugged {
    type Error = NoNetwork;

    async fn get(&mut self) -> Result<Vec<u8>, Self::Error> {
        Err(NoNetwork)
    }

    async fn post(&mut self, _body: &str) -> Result<(), Self::Error> {
        Err(NoNetwork)
    }
}

#[embassy_executor::task]
async fn game_task(
    display: &'static mut Display<'static>,
    backlight: &'static mut Backlight,
    platform: BadgePlatform,
    config: GameConfig,
) {
    if display.clear(Rgb565::BLACK).is_err() {
        error!("display: initial clear failed");
    }
    backlight.set(true);
    info!("tank arcade started for {=str}", config.player_name);

    let playfield = display.translated(PLAYFIELD_ORIGIN);
    let mut arcade = Arcade::new(playfield, platform, ShadowScores::new(Unplugged), config, SEED);
    let Err(_) = arcade.run().await;
    error!("display: bus error, game stopped");
    backlight.set(false);
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = ir_tank::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 32 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let config = GameConfig::DEFAULT.with_player_name(PLAYER_NAME);
    let display = mk_static!(Display<'static>, resources.display.into());
    let backlight = mk_static!(Backlight, resources.backlight.into());
    let receiver = ir_input::install(resources.ir, config.pulse_policy);
    let platform = BadgePlatform::new(receiver, resources.accel);

    spawner.must_spawn(game_task(display, backlight, platform, config));

    loop {
        Timer::after(Duration::from_secs(60)).await;
        let overruns = receiver.overruns();
        if overruns > 0 {
            info!("ir: {=u32} frames overwritten so far", overruns);
        }
    }
}
