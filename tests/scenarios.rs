//! End-to-end runs of the scene machine with remote presses fed in as raw IR
//! edge timings, through the same receiver the firmware uses.

use std::{
    collections::VecDeque,
    convert::Infallible,
};

use embassy_futures::block_on;
use embedded_graphics::{
    Pixel,
    pixelcolor::Rgb565,
    prelude::*,
};
use ir_tank::{
    Arcade,
    Difficulty,
    GameConfig,
    Platform,
    Scene,
    game::{
        Session,
        Tilt,
    },
    ir::{
        PulsePolicy,
        RemoteFrame,
        frame_timings,
    },
    receiver::Receiver,
    remote::{
        CODE_BLANK,
        CODE_FIRE,
        CODE_LEFT,
        CODE_RIGHT,
    },
    scores::{
        HighScore,
        ShadowScores,
        ShadowTransport,
        decode,
        encode,
    },
};

/// Give up instead of spinning forever when a scene never exits.
const TICK_LIMIT: usize = 10_000;

#[derive(Default)]
struct NullDisplay {
    pixels: usize,
}

impl OriginDimensions for NullDisplay {
    fn size(&self) -> Size {
        Size::new(128, 128)
    }
}

impl DrawTarget for NullDisplay {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.pixels += pixels.into_iter().count();
        Ok(())
    }
}

/// Plays one scripted remote code (or silence) per tick into a receiver.
struct Remote {
    receiver: Receiver,
    script: VecDeque<Option<u32>>,
    ticks: usize,
}

impl Remote {
    fn new(script: &[Option<u32>]) -> Self {
        Self {
            receiver: Receiver::new(PulsePolicy::Lenient),
            script: script.iter().copied().collect(),
            ticks: 0,
        }
    }
}

impl Platform for Remote {
    fn take_frame(&mut self) -> Option<RemoteFrame> {
        self.receiver.try_take()
    }

    fn read_tilt(&mut self) -> Tilt {
        Tilt::default()
    }

    async fn wait_tick(&mut self) {
        self.ticks += 1;
        assert!(self.ticks < TICK_LIMIT, "scene never finished");
        if let Some(Some(code)) = self.script.pop_front() {
            for gap in frame_timings(code) {
                self.receiver.on_edge(gap);
            }
            self.receiver.on_watchdog();
        }
    }
}

#[derive(Default)]
struct MemoryShadow {
    document: Option<String>,
    reachable: bool,
}

impl ShadowTransport for MemoryShadow {
    type Error = &'static str;

    async fn get(&mut self) -> Result<Vec<u8>, Self::Error> {
        if !self.reachable {
            return Err("no route to host");
        }
        Ok(self.document.clone().map(String::into_bytes).unwrap_or_else(|| {
            encode(&HighScore::new(0, "nobody")).unwrap().into_bytes()
        }))
    }

    async fn post(&mut self, body: &str) -> Result<(), Self::Error> {
        if !self.reachable {
            return Err("no route to host");
        }
        self.document = Some(body.to_owned());
        Ok(())
    }
}

type TestArcade = Arcade<NullDisplay, Remote, ShadowScores<MemoryShadow>>;

fn arcade(script: &[Option<u32>], reachable: bool) -> TestArcade {
    arcade_with(script, reachable, GameConfig::DEFAULT.with_player_name("tester"))
}

fn arcade_with(script: &[Option<u32>], reachable: bool, config: GameConfig) -> TestArcade {
    let shadow = MemoryShadow {
        document: None,
        reachable,
    };
    Arcade::new(
        NullDisplay::default(),
        Remote::new(script),
        ShadowScores::new(shadow),
        config,
        42,
    )
}

/// A press followed by a quiet tick, so the next press is a fresh one.
fn tap(code: u32) -> [Option<u32>; 2] {
    [Some(code), None]
}

/// Silence long enough for a round with the enemy parked below the player.
fn quiet_round() -> Vec<Option<u32>> {
    vec![None; 40]
}

#[test]
fn title_to_difficulty_and_back() {
    let script: Vec<_> = [
        tap(CODE_FIRE),  // title
        tap(CODE_RIGHT), // main menu: Difficulty
        tap(CODE_FIRE),
        tap(CODE_RIGHT), // Medium
        tap(CODE_RIGHT), // Hard
        tap(CODE_RIGHT), // clamped at Hard
        tap(CODE_FIRE),
    ]
    .concat();
    let mut a = arcade(&script, true);

    assert_eq!(block_on(a.step(Scene::Title)), Ok(Scene::MainMenu));
    assert_eq!(block_on(a.step(Scene::MainMenu)), Ok(Scene::DifficultySelect));
    assert_eq!(block_on(a.step(Scene::DifficultySelect)), Ok(Scene::MainMenu));
    assert_eq!(a.difficulty(), Difficulty::Hard);
    assert!(a.display().pixels > 0);
}

#[test]
fn unmapped_codes_do_not_navigate() {
    let script: Vec<_> = [tap(CODE_BLANK), tap(0x1234_5678), tap(CODE_LEFT), tap(CODE_FIRE)].concat();
    let mut a = arcade(&script, true);
    // Left is clamped at the first entry, so Fire picks Play.
    assert_eq!(block_on(a.step(Scene::MainMenu)), Ok(Scene::Playing));
}

#[test]
fn leaderboard_shows_remote_score() {
    let mut a = arcade(&tap(CODE_LEFT), true);
    assert_eq!(block_on(a.step(Scene::Leaderboard)), Ok(Scene::MainMenu));
    assert!(!a.leaderboard().is_offline());
    assert_eq!(a.leaderboard().best(), Some(&HighScore::new(0, "nobody")));
}

#[test]
fn round_ends_in_game_over_and_high_score_is_uploaded() {
    let mut script = quiet_round();
    script.extend(tap(CODE_FIRE));
    let mut a = arcade(&script, true);

    let mut session = Session::new(&GameConfig::DEFAULT, Difficulty::Hard, 9);
    session.place_enemy(64, 110);
    session.score = 3;
    assert_eq!(block_on(a.play(session)), Ok(Scene::GameOver));
    assert_eq!(a.last_score(), 3);

    assert_eq!(block_on(a.step(Scene::GameOver)), Ok(Scene::MainMenu));
    assert_eq!(a.leaderboard().best(), Some(&HighScore::new(3, "tester")));
}

#[test]
fn offline_network_keeps_the_game_playable() {
    let mut script = tap(CODE_FIRE).to_vec();
    script.extend(quiet_round());
    script.extend(tap(CODE_FIRE));
    let mut a = arcade(&script, false);

    assert_eq!(block_on(a.step(Scene::Leaderboard)), Ok(Scene::MainMenu));
    assert!(a.leaderboard().is_offline());

    let mut session = Session::new(&GameConfig::DEFAULT, Difficulty::Hard, 1);
    session.place_enemy(64, 110);
    assert_eq!(block_on(a.play(session)), Ok(Scene::GameOver));
    assert_eq!(block_on(a.step(Scene::GameOver)), Ok(Scene::MainMenu));
    assert_eq!(a.leaderboard().best(), None);
}

#[test]
fn full_cycle_returns_to_main_menu() {
    // On a 13x21 field every enemy spawns at (8, 16), inside the hit box of
    // the player clamped to (6, 12), so the first enemy shot ends the round.
    let config = GameConfig::DEFAULT.with_size(13, 21).with_player_name("tester");
    let mut script = [tap(CODE_FIRE), tap(CODE_FIRE)].concat();
    script.extend(quiet_round());
    script.extend(tap(CODE_FIRE));
    let mut a = arcade_with(&script, true, config);

    let mut scene = Scene::Title;
    let mut visited = Vec::new();
    for _ in 0..4 {
        scene = block_on(a.step(scene)).unwrap();
        visited.push(scene);
    }
    assert_eq!(
        visited,
        [Scene::MainMenu, Scene::Playing, Scene::GameOver, Scene::MainMenu]
    );
    assert_eq!(a.last_score(), 0);
    // Zero does not beat the stored score, so nothing is uploaded.
    assert_eq!(a.leaderboard().best(), Some(&HighScore::new(0, "nobody")));
}

#[test]
fn uploaded_document_is_the_shadow_shape() {
    let body = encode(&HighScore::new(15, "nadav")).unwrap();
    assert_eq!(decode(body.as_bytes()).unwrap().score, 15);
    assert!(body.starts_with(r#"{"state":{"desired":"#));
}
