//! Interactive viewer for the raycast renderer.
//!
//! ```bash
//! cargo run --release -- --width 960 --height 600 --scale 2
//! ```
//!
//! Arrows/WASD move and turn, Alt strafes, I/K look up/down, Z zooms,
//! Space fires, T cycles the theme, R cycles the render scale, M toggles
//! the minimap, Escape quits.

use anyhow::Result;
use clap::Parser;
use glam::{Vec2, vec2};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::collections::HashSet;
use std::time::{Duration, Instant};

use gridcaster::{
    BotState, BotView, EnemyKind, Grid, Level, PlayerView, ProjectileView, Raycaster,
    RenderConfig, Surface, WeaponTag, surface::rgb,
};

#[derive(Parser)]
#[command(about = "Walk around a sample level rendered by gridcaster")]
struct Args {
    #[arg(long, default_value_t = 960)]
    width: usize,
    #[arg(long, default_value_t = 600)]
    height: usize,
    /// Off-screen downsample factor (1 = full resolution).
    #[arg(long, default_value_t = 2)]
    scale: usize,
    /// Horizontal field of view in degrees.
    #[arg(long, default_value_t = 66.0)]
    fov: f32,
    #[arg(long, default_value_t = 0)]
    theme: usize,
}

const MOVE_SPEED: f32 = 0.07;
const TURN_SPEED: f32 = 0.045;
const PITCH_SPEED: f32 = 4.0;
const VISIT_RADIUS: i32 = 3;

fn sample_grid() -> Grid {
    Grid::from_rows(&[
        "1111111111111111",
        "1..............1",
        "1..22..3...44..1",
        "1..2...3....4..1",
        "1......3.......1",
        "1..55......11..1",
        "1..5........1..1",
        "1......2.......1",
        "1..3...2...5...1",
        "1..3.......5...1",
        "1..............1",
        "1...44...33....1",
        "1....4....3....1",
        "1..............1",
        "1..............1",
        "1111111111111111",
    ])
}

fn spawn_bots() -> Vec<BotView> {
    let mut bots = vec![
        BotView::new(vec2(4.5, 4.5), EnemyKind::Slime),
        BotView::new(vec2(10.5, 3.5), EnemyKind::Warden),
        BotView::new(vec2(12.5, 10.5), EnemyKind::Spinner),
        BotView::new(vec2(3.5, 11.5), EnemyKind::Husk),
        BotView::new(vec2(7.5, 2.5), EnemyKind::MedKit),
        BotView::new(vec2(13.5, 13.5), EnemyKind::AmmoCell),
    ];
    bots[3].state |= BotState::FROZEN;
    bots
}

/// Axis-separated slide so walls stop movement without sticking.
fn slide(grid: &Grid, pos: &mut Vec2, delta: Vec2) {
    let margin = 0.2 * delta.signum();
    if !grid.is_wall(pos.x + delta.x + margin.x, pos.y) {
        pos.x += delta.x;
    }
    if !grid.is_wall(pos.x, pos.y + delta.y + margin.y) {
        pos.y += delta.y;
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut cfg = RenderConfig::new(args.width, args.height);
    cfg.render_scale = args.scale;
    cfg.fov = args.fov.to_radians();
    let mut renderer = Raycaster::new(cfg)?;

    let grid = sample_grid();
    let mut theme = args.theme;
    let mut player = PlayerView::new(vec2(8.0, 13.0), -std::f32::consts::FRAC_PI_2);
    let mut bots = spawn_bots();
    // the renderer only sees ProjectileView; the flight direction is
    // gameplay state and stays on this side of the boundary
    let mut shots: Vec<(ProjectileView, Vec2)> = Vec::new();
    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let portal = Some(vec2(14.2, 1.8));
    let mut minimap_on = true;

    let mut screen = Surface::new(args.width, args.height);
    let mut win = Window::new(
        "gridcaster walk",
        args.width,
        args.height,
        WindowOptions::default(),
    )?;
    win.set_target_fps(60);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();

    let mut tic = 0u32;
    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();
        tic += 1;

        /* movement ------------------------------------------------------ */
        let mut forward = 0.0;
        let mut strafe = 0.0;
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            forward += MOVE_SPEED;
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            forward -= MOVE_SPEED;
        }
        let alt = win.is_key_down(Key::LeftAlt) || win.is_key_down(Key::RightAlt);
        if win.is_key_down(Key::Left) {
            if alt {
                strafe -= MOVE_SPEED;
            } else {
                player.turn(TURN_SPEED);
            }
        }
        if win.is_key_down(Key::Right) {
            if alt {
                strafe += MOVE_SPEED;
            } else {
                player.turn(-TURN_SPEED);
            }
        }
        if win.is_key_down(Key::A) {
            strafe -= MOVE_SPEED;
        }
        if win.is_key_down(Key::D) {
            strafe += MOVE_SPEED;
        }
        if win.is_key_down(Key::I) {
            player.pitch = (player.pitch + PITCH_SPEED).min(args.height as f32 / 4.0);
        }
        if win.is_key_down(Key::K) {
            player.pitch = (player.pitch - PITCH_SPEED).max(-(args.height as f32) / 4.0);
        }
        player.zoomed = win.is_key_down(Key::Z);
        player.moving = forward != 0.0 || strafe != 0.0;

        let delta = player.forward() * forward + player.right() * strafe;
        slide(&grid, &mut player.pos, delta);

        /* toggles -------------------------------------------------------- */
        if win.is_key_pressed(Key::T, KeyRepeat::No) {
            theme = (theme + 1) % renderer.config().themes.len();
        }
        if win.is_key_pressed(Key::R, KeyRepeat::No) {
            let next = match renderer.config().render_scale {
                1 => 2,
                2 => 4,
                _ => 1,
            };
            renderer.set_render_scale(next);
            println!("render scale: {next}");
        }
        if win.is_key_pressed(Key::M, KeyRepeat::No) {
            minimap_on = !minimap_on;
        }
        if win.is_key_pressed(Key::Space, KeyRepeat::No) {
            let mut shot =
                ProjectileView::new(player.pos, WeaponTag::Blaster, rgb(0xFF, 0xB0, 0x30));
            shot.z = 0.1;
            shots.push((shot, player.forward()));
        }

        /* toy simulation ------------------------------------------------- */
        for (i, bot) in bots.iter_mut().enumerate() {
            bot.walk_phase = tic / 2 + i as u32 * 3;
            // the warden takes a potshot now and then
            if bot.kind == EnemyKind::Warden {
                bot.shoot_phase = if (tic / 40) % 4 == 0 { 1 } else { 0 };
            }
        }
        for (shot, dir) in &mut shots {
            let next = shot.pos + *dir * 0.25;
            if grid.is_wall(next.x, next.y) {
                shot.alive = false;
            } else {
                shot.pos = next;
            }
        }
        shots.retain(|(s, _)| s.alive);

        /* fog of war ------------------------------------------------------ */
        let (pcx, pcy) = (player.pos.x.floor() as i32, player.pos.y.floor() as i32);
        for dy in -VISIT_RADIUS..=VISIT_RADIUS {
            for dx in -VISIT_RADIUS..=VISIT_RADIUS {
                if dx * dx + dy * dy <= VISIT_RADIUS * VISIT_RADIUS {
                    visited.insert((pcx + dx, pcy + dy));
                }
            }
        }

        /* draw ------------------------------------------------------------ */
        let bob = if player.moving {
            (tic as f32 * 0.25).sin() * 4.0
        } else {
            0.0
        };
        let level = Level {
            grid: &grid,
            theme,
        };
        let shot_views: Vec<ProjectileView> = shots.iter().map(|(s, _)| *s).collect();
        renderer.render_frame(&mut screen, &player, &bots, &shot_views, &level, bob);
        if minimap_on {
            renderer.render_minimap(&mut screen, &level, &player, &bots, Some(&visited), portal);
        }
        win.update_with_buffer(screen.pixels(), args.width, args.height)?;

        // ─────────── accumulate & report every ~3 s ────────────────────
        acc_time += t0.elapsed();
        acc_frames += 1;
        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            println!("avg frame: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
