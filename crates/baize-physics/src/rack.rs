//! Starting ball arrangements.
//!
//! A seed adds a small deterministic jitter to every object ball so breaks
//! vary between games while host and client still agree on the layout.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use baize_core::math::{Vec3, fround, sqrt};

use crate::ball::Ball;
use crate::layout::TableLayout;

/// Gap between neighbouring racked balls, as a fraction of the radius.
const RACK_GAP: f64 = 0.02;
/// Maximum jitter per axis, as a fraction of the radius. Small enough that
/// jittered neighbours never overlap.
const JITTER: f64 = 0.005;

struct Jitter(Option<StdRng>);

impl Jitter {
    fn new(seed: Option<u64>) -> Self {
        Self(seed.map(StdRng::seed_from_u64))
    }

    fn apply(&mut self, pos: Vec3, r: f64) -> Vec3 {
        match self.0.as_mut() {
            Some(rng) => {
                let dx = rng.random_range(-JITTER..JITTER) * r;
                let dy = rng.random_range(-JITTER..JITTER) * r;
                pos + Vec3::new(dx, dy, 0.0)
            },
            None => pos,
        }
    }
}

/// Row offsets of a close-packed triangle: row `i` holds `i + 1` balls.
fn triangle_positions(apex: Vec3, rows: usize, r: f64) -> Vec<Vec3> {
    let spacing = 2.0 * r + RACK_GAP * r;
    let row_step = spacing * sqrt(3.0) / 2.0;
    let mut out = Vec::new();
    for row in 0..rows {
        for col in 0..=row {
            let x = apex.x + row as f64 * row_step;
            let y = apex.y + (col as f64 - row as f64 / 2.0) * spacing;
            out.push(Vec3::new(fround(x), fround(y), 0.0));
        }
    }
    out
}

fn cue_ball(layout: &TableLayout) -> Ball {
    Ball::new(0, Vec3::new(-layout.table_x / 2.0, 0.0, 0.0)).with_label("cue")
}

fn object_balls(positions: Vec<Vec3>, r: f64, seed: Option<u64>) -> Vec<Ball> {
    let mut jitter = Jitter::new(seed);
    positions
        .into_iter()
        .enumerate()
        .map(|(i, pos)| Ball::new(i + 1, jitter.apply(pos, r)))
        .collect()
}

/// Fifteen-ball triangle with its apex on the foot spot.
pub fn triangle(layout: &TableLayout, r: f64, seed: Option<u64>) -> Vec<Ball> {
    let apex = Vec3::new(layout.table_x / 2.0, 0.0, 0.0);
    let mut balls = vec![cue_ball(layout)];
    balls.extend(object_balls(triangle_positions(apex, 5, r), r, seed));
    balls
}

/// Nine-ball diamond: rows of 1, 2, 3, 2, 1 with the 9 in the middle.
pub fn diamond(layout: &TableLayout, r: f64, seed: Option<u64>) -> Vec<Ball> {
    let apex = Vec3::new(layout.table_x / 2.0, 0.0, 0.0);
    let full = triangle_positions(apex, 5, r);
    // Front three rows of the triangle, then two narrowing rows behind.
    let spacing = 2.0 * r + RACK_GAP * r;
    let row_step = spacing * sqrt(3.0) / 2.0;
    let mut positions: Vec<Vec3> = full.into_iter().take(6).collect();
    let x3 = fround(apex.x + 3.0 * row_step);
    positions.push(Vec3::new(x3, fround(-spacing / 2.0), 0.0));
    positions.push(Vec3::new(x3, fround(spacing / 2.0), 0.0));
    positions.push(Vec3::new(fround(apex.x + 4.0 * row_step), 0.0, 0.0));
    // Centre of the middle row takes the 9.
    positions.swap(4, 8);

    let mut balls = vec![cue_ball(layout)];
    balls.extend(object_balls(positions, r, seed));
    balls
}

/// Three-cushion start: cue on the head spot offset, yellow on the head
/// spot, red on the foot spot.
pub fn three(layout: &TableLayout, r: f64) -> Vec<Ball> {
    let head = -layout.table_x / 2.0;
    vec![
        Ball::new(0, Vec3::new(head, -5.0 * r, 0.0)).with_label("white"),
        Ball::new(1, Vec3::new(head, 0.0, 0.0)).with_label("yellow"),
        Ball::new(2, Vec3::new(layout.table_x / 2.0, 0.0, 0.0)).with_label("red"),
    ]
}

/// Snooker: fifteen reds behind the pink and the six colours on their spots.
pub fn snooker(layout: &TableLayout, r: f64, seed: Option<u64>) -> Vec<Ball> {
    let length = 2.0 * (layout.table_x + r);
    let baulk = -layout.table_x + fround(0.2065 * length);
    let d_radius = fround(0.0818 * length);
    let pink = length / 4.0;
    let black = layout.table_x - fround(0.0908 * length);

    let cue = Vec3::new(baulk - d_radius / 2.0, d_radius / 4.0, 0.0);
    let mut balls = vec![Ball::new(0, cue).with_label("cue")];
    let apex = Vec3::new(pink + 2.0 * r + RACK_GAP * r, 0.0, 0.0);
    let mut jitter = Jitter::new(seed);
    for (i, pos) in triangle_positions(apex, 5, r).into_iter().enumerate() {
        balls.push(Ball::new(i + 1, jitter.apply(pos, r)).with_label("red"));
    }
    let colours = [
        ("yellow", Vec3::new(baulk, -d_radius, 0.0)),
        ("green", Vec3::new(baulk, d_radius, 0.0)),
        ("brown", Vec3::new(baulk, 0.0, 0.0)),
        ("blue", Vec3::ZERO),
        ("pink", Vec3::new(pink, 0.0, 0.0)),
        ("black", Vec3::new(black, 0.0, 0.0)),
    ];
    for (label, pos) in colours {
        let id = balls.len();
        balls.push(Ball::new(id, pos).with_label(label));
    }
    balls
}
