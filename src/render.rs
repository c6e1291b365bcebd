//! Drawing for every scene, on any `embedded-graphics` RGB565 target.
//!
//! The display bus is slow, so nothing here clears the whole screen except on
//! scene entry. Sprites are erased by drawing them again in the background
//! colour, and only what changed between two [`Snapshot`]s is touched.

use core::fmt::Write as _;

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{
            FONT_6X10,
            FONT_10X20,
        },
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        Circle,
        Line,
        PrimitiveStyle,
        Rectangle,
    },
    text::{
        Baseline,
        Text,
    },
};

use crate::{
    direction::Direction,
    entities::{
        Owner,
        Projectile,
    },
    game::Snapshot,
    menu::{
        MENU_ENTRIES,
        Menu,
    },
    scores::{
        HighScore,
        Submission,
    },
};

// ── Palette ─────────────────────────────────────────────────────────────────
pub const BACKGROUND: Rgb565 = Rgb565::BLACK;
const TEXT: Rgb565 = Rgb565::WHITE;
const PLAYER: Rgb565 = Rgb565::GREEN;
const ENEMY: Rgb565 = Rgb565::RED;
const FRIENDLY_SHOT: Rgb565 = Rgb565::WHITE;
const HOSTILE_SHOT: Rgb565 = Rgb565::YELLOW;
const HIGHLIGHT: Rgb565 = Rgb565::CYAN;

// ── Geometry ────────────────────────────────────────────────────────────────
const TANK_RADIUS: i32 = 6;
const SHOT_RADIUS: i32 = 3;
const CANNON_LENGTH: i32 = 12;
/// Height of the score bar along the top edge.
pub const SCORE_BAR_H: i32 = 8;
const MENU_TOP: i32 = 40;
const MENU_ROW_H: i32 = 20;
const MARKER_X: i32 = 8;
const LABEL_X: i32 = 22;

fn small(color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyle::new(&FONT_6X10, color)
}

fn large(color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyle::new(&FONT_10X20, color)
}

fn text<D>(
    display: &mut D,
    s: &str,
    x: i32,
    y: i32,
    style: MonoTextStyle<'_, Rgb565>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_baseline(s, Point::new(x, y), style, Baseline::Top).draw(display)?;
    Ok(())
}

/// Text horizontally centred on a playfield `width` pixels wide.
fn centred<D>(
    display: &mut D,
    s: &str,
    width: i32,
    y: i32,
    style: MonoTextStyle<'_, Rgb565>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let char_w = style.font.character_size.width as i32;
    let x = (width - s.len() as i32 * char_w) / 2;
    text(display, s, x.max(0), y, style)
}

fn fill_rect<D>(display: &mut D, x: i32, y: i32, w: i32, h: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if w <= 0 || h <= 0 {
        return Ok(());
    }
    Rectangle::new(Point::new(x, y), Size::new(w as u32, h as u32))
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(display)
}

fn circle<D>(display: &mut D, x: i32, y: i32, radius: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Circle::with_center(Point::new(x, y), (radius * 2 + 1) as u32)
        .into_styled(PrimitiveStyle::with_stroke(color, 1))
        .draw(display)
}

pub fn cannon<D>(display: &mut D, x: i32, y: i32, facing: Direction, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (ox, oy) = facing.offset();
    Line::new(
        Point::new(x, y),
        Point::new(x + ox * CANNON_LENGTH, y + oy * CANNON_LENGTH),
    )
    .into_styled(PrimitiveStyle::with_stroke(color, 1))
    .draw(display)
}

pub fn tank<D>(display: &mut D, x: i32, y: i32, facing: Direction, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    circle(display, x, y, TANK_RADIUS, color)?;
    cannon(display, x, y, facing, color)
}

fn projectile<D>(display: &mut D, p: &Projectile, erase: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = match (erase, p.owner) {
        (true, _) => BACKGROUND,
        (false, Owner::Friendly) => FRIENDLY_SHOT,
        (false, Owner::Hostile) => HOSTILE_SHOT,
    };
    circle(display, p.x, p.y, SHOT_RADIUS, color)
}

pub fn score_bar<D>(display: &mut D, width: i32, score: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    fill_rect(display, 0, 0, width, SCORE_BAR_H, BACKGROUND)?;
    let mut line: heapless::String<24> = heapless::String::new();
    let _ = write!(line, "Score: {score}");
    text(display, &line, 0, -1, small(TEXT))
}

/// Full redraw at the start of a round.
pub fn playfield<D>(display: &mut D, width: i32, snapshot: &Snapshot) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BACKGROUND)?;
    score_bar(display, width, snapshot.score)?;
    if snapshot.enemy.alive {
        let e = &snapshot.enemy;
        tank(display, e.x, e.y, e.facing, ENEMY)?;
    }
    tank(display, snapshot.player.x, snapshot.player.y, snapshot.player.facing, PLAYER)
}

/// Redraw what changed between two ticks.
pub fn frame<D>(display: &mut D, width: i32, before: &Snapshot, after: &Snapshot) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for p in before.projectiles.iter() {
        projectile(display, p, true)?;
    }

    let old = &before.player;
    tank(display, old.x, old.y, old.facing, BACKGROUND)?;

    let (was, is) = (&before.enemy, &after.enemy);
    let moved = (was.x, was.y) != (is.x, is.y) || was.alive != is.alive;
    if was.alive && moved {
        tank(display, was.x, was.y, was.facing, BACKGROUND)?;
    } else if was.alive && was.facing != is.facing {
        cannon(display, was.x, was.y, was.facing, BACKGROUND)?;
    }

    for p in after.projectiles.iter() {
        projectile(display, p, false)?;
    }

    if is.alive {
        // The body is cheap to overdraw and repairs pixels erased by passing shots.
        circle(display, is.x, is.y, TANK_RADIUS, ENEMY)?;
        let reach = CANNON_LENGTH + SHOT_RADIUS;
        let grazed = before
            .projectiles
            .iter()
            .any(|p| (p.x - is.x).abs() <= reach && (p.y - is.y).abs() <= reach);
        if moved || was.facing != is.facing || grazed {
            cannon(display, is.x, is.y, is.facing, ENEMY)?;
        }
    }

    let new = &after.player;
    tank(display, new.x, new.y, new.facing, PLAYER)?;

    let bar_grazed = before.projectiles.iter().any(|p| p.y - SHOT_RADIUS < SCORE_BAR_H);
    if before.score != after.score || bar_grazed {
        score_bar(display, width, after.score)?;
    }
    Ok(())
}

pub fn title<D>(display: &mut D, width: i32, height: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BACKGROUND)?;
    centred(display, "IR TANKS", width, 12, large(PLAYER))?;

    // Two tanks facing off.
    let y = height / 2;
    tank(display, width / 4, y, Direction::Right, PLAYER)?;
    tank(display, width * 3 / 4, y, Direction::Left, ENEMY)?;
    circle(display, width / 2 - 6, y, SHOT_RADIUS, FRIENDLY_SHOT)?;

    centred(display, "press any button", width, height - 20, small(TEXT))
}

pub fn menu<D>(display: &mut D, width: i32, menu: &Menu) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BACKGROUND)?;
    centred(display, menu.title, width, 10, large(TEXT))?;
    for (i, label) in menu.labels.iter().enumerate() {
        text(display, label, LABEL_X, row_y(i + 1), small(TEXT))?;
    }
    menu_marker(display, menu.selected(), true)
}

fn row_y(entry: usize) -> i32 {
    MENU_TOP + (entry.clamp(1, MENU_ENTRIES) as i32 - 1) * MENU_ROW_H
}

/// Draw or erase the selection marker in front of `entry`.
pub fn menu_marker<D>(display: &mut D, entry: usize, visible: bool) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let y = row_y(entry);
    if visible {
        text(display, ">", MARKER_X, y, small(HIGHLIGHT))
    } else {
        fill_rect(display, MARKER_X, y, LABEL_X - MARKER_X, 10, BACKGROUND)
    }
}

pub fn leaderboard<D>(
    display: &mut D,
    width: i32,
    best: Option<&HighScore>,
    offline: bool,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BACKGROUND)?;
    centred(display, "HIGH SCORE", width, 10, large(TEXT))?;

    let mut line: heapless::String<32> = heapless::String::new();
    match best {
        Some(entry) => {
            centred(display, &entry.name, width, 50, small(HIGHLIGHT))?;
            let _ = write!(line, "{}", entry.score);
            centred(display, &line, width, 64, large(TEXT))?;
        }
        None => centred(display, "no score yet", width, 56, small(TEXT))?,
    }
    if offline {
        centred(display, "OFFLINE", width, 96, small(ENEMY))?;
    }
    Ok(())
}

pub fn game_over<D>(display: &mut D, width: i32, score: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BACKGROUND)?;
    centred(display, "GAME OVER", width, 30, large(ENEMY))?;
    let mut line: heapless::String<24> = heapless::String::new();
    let _ = write!(line, "Score: {score}");
    centred(display, &line, width, 64, small(TEXT))
}

/// Status line under the game over banner once the score has been handled.
pub fn submission<D>(display: &mut D, width: i32, result: Submission) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (message, color) = match result {
        Submission::NewHigh => ("NEW HIGH SCORE!", HIGHLIGHT),
        Submission::NotImproved => ("", TEXT),
        Submission::Offline => ("offline", ENEMY),
    };
    centred(display, message, width, 84, small(color))
}

#[cfg(test)]
mod tests {
    use core::{
        convert::Infallible,
        ops::Range,
    };

    use embedded_graphics::Pixel;

    use super::*;
    use crate::{
        config::{
            Difficulty,
            GameConfig,
        },
        game::{
            Session,
            TickInput,
        },
    };

    const SIDE: usize = 128;

    /// RGB565 framebuffer that remembers which pixels were written.
    struct Framebuffer {
        pixels: Vec<Rgb565>,
        touched: Vec<bool>,
    }

    impl Framebuffer {
        fn new() -> Self {
            Self {
                pixels: vec![BACKGROUND; SIDE * SIDE],
                touched: vec![false; SIDE * SIDE],
            }
        }

        fn at(&self, x: i32, y: i32) -> Rgb565 {
            self.pixels[y as usize * SIDE + x as usize]
        }

        fn was_touched(&self, x: i32, y: i32) -> bool {
            self.touched[y as usize * SIDE + x as usize]
        }

        fn rows_touched(&self, rows: Range<usize>) -> bool {
            self.touched[rows.start * SIDE..rows.end * SIDE].iter().any(|&t| t)
        }

        fn writes(&self) -> usize {
            self.touched.iter().filter(|&&t| t).count()
        }

        fn forget_writes(&mut self) {
            self.touched.fill(false);
        }
    }

    impl OriginDimensions for Framebuffer {
        fn size(&self) -> Size {
            Size::new(SIDE as u32, SIDE as u32)
        }
    }

    impl DrawTarget for Framebuffer {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) else {
                    continue;
                };
                if x < SIDE && y < SIDE {
                    self.pixels[y * SIDE + x] = color;
                    self.touched[y * SIDE + x] = true;
                }
            }
            Ok(())
        }
    }

    /// Player on the left, a fast-firing enemy on the right aiming straight at it.
    fn duel() -> Session {
        let mut session = Session::new(&GameConfig::DEFAULT, Difficulty::Hard, 3);
        session.player.x = 20;
        session.player.y = 64;
        session.place_enemy(100, 64);
        session
    }

    fn enemy_cannon() -> Range<i32> {
        100 - CANNON_LENGTH..100
    }

    #[test]
    fn enemy_cannon_survives_its_own_shots() {
        let mut fb = Framebuffer::new();
        let mut session = duel();
        assert_eq!(session.enemy.facing, Direction::Left);

        let mut before = session.snapshot();
        playfield(&mut fb, 128, &before).unwrap();
        let mut fired = false;
        for _ in 0..12 {
            session.tick(TickInput::default());
            let after = session.snapshot();
            frame(&mut fb, 128, &before, &after).unwrap();
            fired |= !after.projectiles.is_empty();
            before = after;

            for x in enemy_cannon() {
                assert_ne!(fb.at(x, 64), BACKGROUND, "cannon erased at x = {x}");
            }
        }
        assert!(fired);
        assert_eq!(session.enemy.facing, Direction::Left);
    }

    #[test]
    fn steady_enemy_cannon_is_left_alone() {
        let mut fb = Framebuffer::new();
        let snapshot = duel().snapshot();
        playfield(&mut fb, 128, &snapshot).unwrap();
        fb.forget_writes();

        frame(&mut fb, 128, &snapshot, &snapshot).unwrap();
        assert!(!fb.was_touched(90, 64));
        assert_eq!(fb.at(90, 64), ENEMY);
        // Only the sprites are redrawn, never the whole field.
        assert!(fb.writes() < SIDE * SIDE / 20, "{} pixels written", fb.writes());
    }

    #[test]
    fn score_bar_redrawn_only_when_score_changes() {
        let mut fb = Framebuffer::new();
        let mut session = duel();
        let mut before = session.snapshot();
        playfield(&mut fb, 128, &before).unwrap();

        for _ in 0..12 {
            fb.forget_writes();
            session.tick(TickInput::default());
            let after = session.snapshot();
            frame(&mut fb, 128, &before, &after).unwrap();
            assert!(!fb.rows_touched(0..SCORE_BAR_H as usize));
            before = after;
        }

        let mut scored = before.clone();
        scored.score += 1;
        fb.forget_writes();
        frame(&mut fb, 128, &before, &scored).unwrap();
        assert!(fb.rows_touched(0..SCORE_BAR_H as usize));
    }

    #[test]
    fn menu_marker_moves_without_clearing() {
        let mut fb = Framebuffer::new();
        let menu = Menu::new("TEST", ["A", "B", "C"]);
        super::menu(&mut fb, 128, &menu).unwrap();
        fb.forget_writes();

        menu_marker(&mut fb, 1, false).unwrap();
        menu_marker(&mut fb, 2, true).unwrap();
        assert!(!fb.rows_touched(0..MENU_TOP as usize));
        assert!(!fb.was_touched(LABEL_X + 1, row_y(1) + 4));
        assert!(fb.writes() < 400);
    }
}
