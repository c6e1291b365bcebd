//! Top-level control flow: title, menus, leaderboard, play and game over.
//!
//! [`Arcade::run`] loops over [`Scene`] values forever. Each scene draws its
//! screen once on entry and then polls the [`Platform`] once per tick; menus
//! only repaint the selection marker when it moves.

use core::convert::Infallible;

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::DrawTarget,
};
use rand::{
    RngCore,
    SeedableRng,
    rngs::SmallRng,
};

use crate::{
    config::{
        Difficulty,
        GameConfig,
    },
    game::{
        Session,
        TickInput,
        TickOutcome,
        Tilt,
    },
    ir::RemoteFrame,
    menu::{
        Menu,
        MenuEvent,
    },
    remote::{
        Button,
        ButtonLatch,
    },
    render,
    scores::{
        Leaderboard,
        ScoreService,
        Submission,
    },
};

/// How long the game over screen keeps the submission result up.
const STATUS_TICKS: u32 = 25;

const MAIN_MENU: Menu = Menu::new("TANKS", ["Play", "Difficulty", "High score"]);
const DIFFICULTY_MENU: Menu = Menu::new("LEVEL", ["Easy", "Medium", "Hard"]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Scene {
    Title,
    MainMenu,
    DifficultySelect,
    Leaderboard,
    Playing,
    GameOver,
}

/// What the scene machine needs from the board besides a display.
#[allow(async_fn_in_trait)]
pub trait Platform {
    /// Take the most recent decoded remote frame, if one is waiting.
    fn take_frame(&mut self) -> Option<RemoteFrame>;

    fn read_tilt(&mut self) -> Tilt;

    /// Sleep until the next frame tick.
    async fn wait_tick(&mut self);
}

pub struct Arcade<D, P, S> {
    display: D,
    platform: P,
    leaderboard: Leaderboard<S>,
    config: GameConfig,
    difficulty: Difficulty,
    latch: ButtonLatch,
    rng: SmallRng,
    /// Ticks since power-on, mixed into each round's seed.
    ticks: u64,
    last_score: u32,
}

impl<D, P, S> Arcade<D, P, S>
where
    D: DrawTarget<Color = Rgb565>,
    P: Platform,
    S: ScoreService,
{
    pub fn new(display: D, platform: P, scores: S, config: GameConfig, seed: u64) -> Self {
        Self {
            display,
            platform,
            leaderboard: Leaderboard::new(scores),
            config,
            difficulty: Difficulty::default(),
            latch: ButtonLatch::new(),
            rng: SmallRng::seed_from_u64(seed),
            ticks: 0,
            last_score: 0,
        }
    }

    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Score of the most recent round.
    pub const fn last_score(&self) -> u32 {
        self.last_score
    }

    pub const fn leaderboard(&self) -> &Leaderboard<S> {
        &self.leaderboard
    }

    pub const fn display(&self) -> &D {
        &self.display
    }

    pub const fn platform(&self) -> &P {
        &self.platform
    }

    /// Run the arcade until the display fails.
    pub async fn run(&mut self) -> Result<Infallible, D::Error> {
        let mut scene = Scene::Title;
        loop {
            scene = self.step(scene).await?;
        }
    }

    /// Enter `scene`, run it to completion and return the scene that follows.
    pub async fn step(&mut self, scene: Scene) -> Result<Scene, D::Error> {
        info!("scene: {}", scene);
        let width = self.config.width;
        match scene {
            Scene::Title => {
                render::title(&mut self.display, width, self.config.height)?;
                self.wait_any().await;
                Ok(Scene::MainMenu)
            }
            Scene::MainMenu => match self.run_menu(MAIN_MENU).await? {
                1 => Ok(Scene::Playing),
                2 => Ok(Scene::DifficultySelect),
                _ => Ok(Scene::Leaderboard),
            },
            Scene::DifficultySelect => {
                let current = self.difficulty as usize + 1;
                let entry = self.run_menu(DIFFICULTY_MENU.with_selected(current)).await?;
                self.difficulty = Difficulty::ALL[entry - 1];
                info!("difficulty: {}", self.difficulty.label());
                Ok(Scene::MainMenu)
            }
            Scene::Leaderboard => {
                self.leaderboard.refresh().await;
                render::leaderboard(
                    &mut self.display,
                    width,
                    self.leaderboard.best(),
                    self.leaderboard.is_offline(),
                )?;
                self.wait_any().await;
                Ok(Scene::MainMenu)
            }
            Scene::Playing => {
                let seed = self.rng.next_u64() ^ self.ticks;
                let session = Session::new(&self.config, self.difficulty, seed);
                self.play(session).await
            }
            Scene::GameOver => {
                render::game_over(&mut self.display, width, self.last_score)?;
                self.wait_any().await;
                let result = self
                    .leaderboard
                    .submit_if_better(self.last_score, self.config.player_name)
                    .await;
                render::submission(&mut self.display, width, result)?;
                if result != Submission::NotImproved {
                    for _ in 0..STATUS_TICKS {
                        self.platform.wait_tick().await;
                    }
                }
                Ok(Scene::MainMenu)
            }
        }
    }

    /// Play `session` until the player is hit.
    ///
    /// Returns the scene to enter next, always [`Scene::GameOver`].
    pub async fn play(&mut self, mut session: Session) -> Result<Scene, D::Error> {
        let width = self.config.width;
        let mut before = session.snapshot();
        render::playfield(&mut self.display, width, &before)?;

        loop {
            self.platform.wait_tick().await;
            self.ticks = self.ticks.wrapping_add(1);
            let input = TickInput {
                press: self.poll_press(),
                tilt: self.platform.read_tilt(),
            };
            let outcome = session.tick(input);
            let after = session.snapshot();
            render::frame(&mut self.display, width, &before, &after)?;
            before = after;

            if outcome == TickOutcome::PlayerHit {
                self.last_score = session.score;
                return Ok(Scene::GameOver);
            }
        }
    }

    /// Draw `menu` and navigate it until an entry is confirmed.
    async fn run_menu(&mut self, mut menu: Menu) -> Result<usize, D::Error> {
        render::menu(&mut self.display, self.config.width, &menu)?;
        loop {
            let Some(press) = self.next_press().await else {
                continue;
            };
            match menu.handle(press) {
                MenuEvent::Moved { from, to } => {
                    render::menu_marker(&mut self.display, from, false)?;
                    render::menu_marker(&mut self.display, to, true)?;
                }
                MenuEvent::Confirmed(entry) => return Ok(entry),
                MenuEvent::Idle => {}
            }
        }
    }

    async fn wait_any(&mut self) {
        while self.next_press().await.is_none() {}
    }

    async fn next_press(&mut self) -> Option<Button> {
        self.platform.wait_tick().await;
        self.ticks = self.ticks.wrapping_add(1);
        self.poll_press()
    }

    fn poll_press(&mut self) -> Option<Button> {
        let button = Button::from(self.platform.take_frame());
        if button == Button::Unknown {
            debug!("ignoring unmapped remote code");
        }
        self.latch.update(button)
    }
}
