//! The table: owns the balls, resolves events in a fixed order, and advances
//! the simulation clock.

use baize_core::math::{Vec3, fround};
use baize_core::{
    BallId, BallOverride, BallState, CUE_BALL, Outcome, OutcomeLog, ShortSnapshot, TableSnapshot,
};

use crate::ball::Ball;
use crate::collision;
use crate::config::{DEFAULT_FIXED_STEP, DEFAULT_MAX_RESOLUTION_DEPTH, SimConfig};
use crate::constants::Physics;
use crate::cushion::{self, CushionModel};
use crate::error::PhysicsError;
use crate::knuckle;
use crate::layout::TableLayout;
use crate::pocket;

#[derive(Debug, Clone)]
pub struct Table {
    balls: Vec<Ball>,
    /// Every unordered ball pair `(i, j)` with `i < j`, in resolution order.
    pairs: Vec<(usize, usize)>,
    layout: TableLayout,
    physics: Physics,
    cushion_model: CushionModel,
    outcome: OutcomeLog,
    /// Simulated seconds since construction.
    clock: f64,
    fixed_step: f64,
    max_resolution_depth: u32,
}

/// All index pairs `(i, j)` with `i < j < n`.
fn ball_pairs(n: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }
    pairs
}

impl Table {
    /// Build a table. Ball ids are reassigned to match their index.
    pub fn new(mut balls: Vec<Ball>, layout: TableLayout, physics: Physics) -> Self {
        for (i, ball) in balls.iter_mut().enumerate() {
            ball.id = i;
        }
        tracing::info!(
            balls = balls.len(),
            pockets = layout.pockets.len(),
            "Table created"
        );
        Self {
            pairs: ball_pairs(balls.len()),
            balls,
            layout,
            physics,
            cushion_model: CushionModel::default(),
            outcome: OutcomeLog::new(),
            clock: 0.0,
            fixed_step: DEFAULT_FIXED_STEP,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }

    pub fn from_config(balls: Vec<Ball>, config: &SimConfig) -> Self {
        let physics = Physics::new(config.physics.clone());
        let layout = config.layout.build(physics.radius());
        let mut table = Self::new(balls, layout, physics);
        table.cushion_model = config.cushion_model;
        table.fixed_step = config.fixed_step;
        table.max_resolution_depth = config.max_resolution_depth;
        table
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.get(id)
    }

    /// Direct access for callers that assign velocities themselves.
    pub fn ball_mut(&mut self, id: BallId) -> Option<&mut Ball> {
        self.balls.get_mut(id)
    }

    pub fn cue_ball(&self) -> Option<&Ball> {
        self.balls.get(CUE_BALL)
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn layout(&self) -> &TableLayout {
        &self.layout
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    /// Replace the physical constants. A new ball radius rescales the
    /// layout so pockets, knuckles and cushions stay in proportion.
    pub fn set_physics(&mut self, physics: Physics) {
        let old_radius = self.physics.radius();
        if physics.radius() != old_radius && old_radius > 0.0 {
            self.layout = self.layout.scaled(physics.radius() / old_radius);
            tracing::debug!(
                from = old_radius,
                to = physics.radius(),
                "Layout rescaled for new ball radius"
            );
        }
        self.physics = physics;
    }

    pub fn cushion_model(&self) -> CushionModel {
        self.cushion_model
    }

    pub fn set_cushion_model(&mut self, model: CushionModel) {
        tracing::debug!(?model, "Cushion model changed");
        self.cushion_model = model;
    }

    pub fn set_max_resolution_depth(&mut self, depth: u32) {
        self.max_resolution_depth = depth;
    }

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    pub fn outcome(&self) -> &OutcomeLog {
        &self.outcome
    }

    /// The caller clears the log between shots.
    pub fn outcome_mut(&mut self) -> &mut OutcomeLog {
        &mut self.outcome
    }

    /// Simulated time in seconds.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Advance the simulation by `t` seconds.
    ///
    /// Every predicted event within `t` is resolved first, one per pass, in a
    /// fixed order (ball pairs, then each ball against cushions, knuckles and
    /// pockets). Then every ball integrates and is rounded to `f32`
    /// precision.
    pub fn advance(&mut self, t: f64) -> Result<(), PhysicsError> {
        if t == 0.0 {
            return Ok(());
        }
        let mut depth = 0;
        while !self.prepare_advance_all(t)? {
            depth += 1;
            tracing::trace!(depth, "Resolution pass found an event");
            if depth > self.max_resolution_depth {
                tracing::warn!(depth, clock = self.clock, "Collision resolution did not converge");
                return Err(PhysicsError::ResolutionDidNotConverge { depth });
            }
        }
        for ball in &mut self.balls {
            ball.update(t, &self.physics, &self.layout);
            ball.fround();
        }
        self.clock += t;
        Ok(())
    }

    /// Run `floor(elapsed / fixed_step)` fixed steps, dropping the remainder.
    /// Returns the number of steps taken.
    pub fn step(&mut self, elapsed: f64) -> Result<u32, PhysicsError> {
        let steps = (elapsed / self.fixed_step).floor();
        if steps.is_nan() || steps < 1.0 {
            return Ok(0);
        }
        let steps = steps as u32;
        for _ in 0..steps {
            self.advance(self.fixed_step)?;
        }
        Ok(steps)
    }

    /// One resolution pass. Returns `true` when no event was found.
    fn prepare_advance_all(&mut self, t: f64) -> Result<bool, PhysicsError> {
        for &(i, j) in &self.pairs {
            if collision::will_collide(&self.balls[i], &self.balls[j], t, &self.physics) {
                let (head, tail) = self.balls.split_at_mut(j);
                let (a, b) = (&mut head[i], &mut tail[0]);
                let speed = collision::collide(a, b, &self.physics);
                tracing::debug!(a = a.id, b = b.id, speed, "Ball collision");
                self.outcome
                    .push(Outcome::collision(a.id, b.id, speed, self.clock));
                return Ok(false);
            }
        }
        for i in 0..self.balls.len() {
            if !self.prepare_advance_to_cushions(i, t)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Cushion, knuckle and pocket checks for one ball. Returns `true` when
    /// nothing happened.
    fn prepare_advance_to_cushions(&mut self, i: usize, t: f64) -> Result<bool, PhysicsError> {
        let ball = &mut self.balls[i];
        if !ball.on_table() || self.layout.is_inside(&ball.future_position(t)) {
            return Ok(true);
        }
        let id = ball.id;
        if let Some(speed) =
            cushion::bounce_any(ball, t, &self.layout, self.cushion_model, &self.physics)?
        {
            tracing::debug!(ball = id, speed, "Cushion bounce");
            self.outcome.push(Outcome::cushion(id, speed, self.clock));
            return Ok(false);
        }
        if let Some(speed) = knuckle::bounce_any(ball, t, &self.layout, &self.physics) {
            tracing::debug!(ball = id, speed, "Knuckle bounce");
            self.outcome.push(Outcome::cushion(id, speed, self.clock));
            return Ok(false);
        }
        if let Some(speed) = pocket::pocket_any(ball, t, &self.layout, &self.physics) {
            tracing::debug!(ball = id, speed, pocket = ?ball.pocket, "Ball potted");
            self.outcome.push(Outcome::pot(id, speed, self.clock));
            return Ok(false);
        }
        Ok(true)
    }

    /// No ball is rolling, sliding or falling.
    pub fn all_stationary(&self) -> bool {
        self.balls.iter().all(|b| !b.in_motion())
    }

    /// Number of balls that have left the table (falling or in a pocket).
    pub fn in_pockets(&self) -> usize {
        self.balls.iter().filter(|b| !b.on_table()).count()
    }

    /// Stop everything: balls on the table come to rest, falling balls drop
    /// straight to their resting depth.
    pub fn halt(&mut self) {
        let r = self.physics.radius();
        for ball in &mut self.balls {
            match ball.state {
                BallState::Falling => {
                    ball.pos.z = pocket::resting_depth(ball.id, r);
                    ball.settle_in_pocket();
                },
                BallState::InPocket => {},
                _ => ball.set_stationary(),
            }
        }
        tracing::debug!(clock = self.clock, "Table halted");
    }

    /// Strike the cue ball.
    pub fn hit(&mut self, vel: Vec3, rvel: Vec3) -> Result<(), PhysicsError> {
        let clock = self.clock;
        let cue = self
            .balls
            .get_mut(CUE_BALL)
            .ok_or(PhysicsError::UnknownBall { id: CUE_BALL })?;
        cue.set_motion(vel, rvel);
        let speed = vel.length();
        tracing::info!(speed, "Cue ball struck");
        self.outcome.push(Outcome::hit(CUE_BALL, speed, clock));
        Ok(())
    }

    /// True if a ball centred at `pos` would overlap any ball on the table,
    /// ignoring `excluding`.
    pub fn overlaps_any(&self, pos: &Vec3, excluding: Option<BallId>) -> bool {
        let d = self.physics.contact_distance();
        self.balls
            .iter()
            .filter(|b| b.on_table() && Some(b.id) != excluding)
            .any(|b| b.pos.distance_squared_to(pos) < d * d)
    }

    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            balls: self.balls.iter().map(Ball::snapshot).collect(),
        }
    }

    /// Replace every ball's state from a snapshot.
    ///
    /// The snapshot must name every ball exactly once. It is checked in full
    /// before any ball changes, so a rejected snapshot leaves the table as it
    /// was.
    pub fn restore(&mut self, snapshot: &TableSnapshot) -> Result<(), PhysicsError> {
        let n = self.balls.len();
        if snapshot.balls.len() != n {
            return Err(PhysicsError::InvalidSnapshot {
                expected: n,
                found: snapshot.balls.len(),
            });
        }
        let mut seen = vec![false; n];
        for entry in &snapshot.balls {
            let slot = seen
                .get_mut(entry.id)
                .ok_or(PhysicsError::UnknownBall { id: entry.id })?;
            *slot = true;
        }
        let distinct = seen.iter().filter(|&&named| named).count();
        if distinct != n {
            return Err(PhysicsError::InvalidSnapshot {
                expected: n,
                found: distinct,
            });
        }
        for entry in &snapshot.balls {
            self.balls[entry.id].restore(entry);
        }
        tracing::debug!(balls = n, "Table restored");
        Ok(())
    }

    /// Flat `[x0, y0, x1, y1, ...]` positions in id order.
    pub fn short_snapshot(&self) -> ShortSnapshot {
        ShortSnapshot(
            self.balls
                .iter()
                .flat_map(|b| [fround(b.pos.x), fround(b.pos.y)])
                .collect(),
        )
    }

    /// Place every ball at rest on the cloth at the given flat positions.
    pub fn restore_short(&mut self, positions: &[f64]) -> Result<(), PhysicsError> {
        if positions.len() != self.balls.len() * 2 {
            return Err(PhysicsError::InvalidSnapshot {
                expected: self.balls.len(),
                found: positions.len() / 2,
            });
        }
        for (ball, xy) in self.balls.iter_mut().zip(positions.chunks_exact(2)) {
            let mut entry = ball.snapshot();
            entry.pos = Vec3::new(xy[0], xy[1], 0.0);
            entry.vel = None;
            entry.rvel = None;
            entry.state = None;
            ball.restore(&entry);
        }
        Ok(())
    }

    /// Steer one ball toward an authoritative state over `duration` seconds.
    pub fn apply_override(
        &mut self,
        id: BallId,
        target: &BallOverride,
        duration: f64,
    ) -> Result<(), PhysicsError> {
        let ball = self
            .balls
            .get_mut(id)
            .ok_or(PhysicsError::UnknownBall { id })?;
        ball.apply_override(target, duration);
        tracing::debug!(ball = id, duration, state = ?ball.state, "Override applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use baize_core::{BallSnapshot, OutcomeType};
    use baize_core::test_helpers::assert_vec_close;

    use crate::constants::BALL_RADIUS;
    use crate::pocket::resting_depth;
    use crate::rack;

    const R: f64 = BALL_RADIUS;
    const DT: f64 = 1.0 / 512.0;

    fn two_ball_table(layout: TableLayout) -> Table {
        let balls = vec![
            Ball::new(0, Vec3::ZERO),
            Ball::new(1, Vec3::new(3.0 * R, 0.0, 0.0)),
        ];
        Table::new(balls, layout, Physics::default())
    }

    fn run_until_stationary(table: &mut Table, max_ticks: usize) {
        for _ in 0..max_ticks {
            table.advance(DT).unwrap();
            if table.all_stationary() {
                return;
            }
        }
        panic!("table still moving after {max_ticks} ticks");
    }

    #[test]
    fn pairs_cover_every_combination_once() {
        assert_eq!(ball_pairs(4), vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
        assert!(ball_pairs(1).is_empty());
        assert!(ball_pairs(0).is_empty());
    }

    #[test]
    fn ids_follow_index() {
        let balls = vec![Ball::new(7, Vec3::ZERO), Ball::new(3, Vec3::new(0.2, 0.0, 0.0))];
        let table = Table::new(balls, TableLayout::pool(R), Physics::default());
        assert_eq!(table.balls()[0].id, 0);
        assert_eq!(table.balls()[1].id, 1);
    }

    #[test]
    fn two_ball_collision() {
        let mut table = two_ball_table(TableLayout::pool(R));
        table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        for _ in 0..64 {
            table.advance(DT).unwrap();
            if table.outcome().first_collision().is_some() {
                break;
            }
        }
        let first = table.outcome().first_collision().expect("collision");
        assert_eq!((first.ball_a, first.ball_b), (0, 1));
        assert!(first.incident_speed > 0.9 && first.incident_speed < 1.0);
        assert!(first.timestamp > 0.0);

        let cue = &table.balls()[0];
        let object = &table.balls()[1];
        assert!(object.vel.x > 0.9);
        assert!(cue.vel.x.abs() < 0.05);
        assert!(object.vel.y.abs() < 1e-6);
        assert!(cue.pos.distance_to(&object.pos) >= 2.0 * R - 1e-6);
    }

    #[test]
    fn ball_rolls_into_corner_pocket() {
        let mut balls = vec![
            Ball::new(0, Vec3::new(-0.5, 0.0, 0.0)),
            Ball::new(1, Vec3::new(40.0 * R, 18.0 * R, 0.0)),
        ];
        let dir = Vec3::new(1.0, 1.0, 0.0).normalize();
        balls[1].set_motion(dir * 1.5, Vec3::ZERO);
        let mut table = Table::new(balls, TableLayout::pool(R), Physics::default());

        run_until_stationary(&mut table, 4096);

        let potted = &table.balls()[1];
        assert_eq!(potted.state, BallState::InPocket);
        assert_eq!(potted.pos.z, resting_depth(1, R));
        assert_eq!(potted.pocket, None);
        assert_eq!(table.in_pockets(), 1);
        assert!(table.outcome().is_ball_potted(1));
        assert!(!table.outcome().is_cue_ball_potted());
        assert_eq!(table.outcome().cushion_count(), 0);
    }

    #[test]
    fn perpendicular_cushion_bounce_reverses() {
        for model in [CushionModel::Han, CushionModel::HanBlend, CushionModel::Mathaven] {
            let layout = TableLayout::carom(R);
            let start = Vec3::new(layout.table_x - 0.01, 0.0, 0.0);
            let mut table = Table::new(vec![Ball::new(0, start)], layout, Physics::default());
            table.set_cushion_model(model);
            table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
            for _ in 0..32 {
                table.advance(DT).unwrap();
                if table.outcome().cushion_count() > 0 {
                    break;
                }
            }
            assert_eq!(table.outcome().cushion_count(), 1, "{model:?}");
            let ball = &table.balls()[0];
            assert!(ball.vel.x < 0.0, "{model:?}");
            assert!(ball.vel.length() < 1.0, "{model:?}");
            assert!(ball.pos.x <= table.layout().table_x + 1e-9);
        }
    }

    #[test]
    fn grip_bounce_respects_restitution() {
        let layout = TableLayout::carom(R);
        let start = Vec3::new(layout.table_x - 0.001, 0.0, 0.0);
        let mut table = Table::new(vec![Ball::new(0, start)], layout, Physics::default());
        table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        table.advance(DT).unwrap();
        let e = table.physics().cushion_restitution();
        let cushion = &table.outcome().events()[1];
        assert_eq!(cushion.kind, OutcomeType::Cushion);
        assert!(table.balls()[0].vel.length() <= e * cushion.incident_speed);
    }

    #[test]
    fn advance_zero_changes_nothing() {
        let mut table = two_ball_table(TableLayout::pool(R));
        table.hit(Vec3::new(2.0, 0.3, 0.0), Vec3::new(0.0, 0.0, 4.0)).unwrap();
        table.advance(DT).unwrap();
        let before = table.snapshot();
        let events = table.outcome().len();
        let clock = table.clock();
        table.advance(0.0).unwrap();
        assert_eq!(table.snapshot(), before);
        assert_eq!(table.outcome().len(), events);
        assert_eq!(table.clock(), clock);
    }

    #[test]
    fn stationary_table_stays_put() {
        let layout = TableLayout::pool(R);
        let balls = rack::triangle(&layout, R, Some(3));
        let mut table = Table::new(balls, layout, Physics::default());
        let before = table.snapshot();
        for _ in 0..10 {
            table.advance(DT).unwrap();
        }
        assert!(table.all_stationary());
        assert_eq!(table.snapshot(), before);
        assert!(table.outcome().is_empty());
    }

    #[test]
    fn step_runs_whole_ticks_only() {
        let mut table = two_ball_table(TableLayout::pool(R));
        assert_eq!(table.step(0.01).unwrap(), 5);
        assert!((table.clock() - 5.0 * DT).abs() < 1e-12);
        assert_eq!(table.step(DT / 2.0).unwrap(), 0);
        assert_eq!(table.step(0.0).unwrap(), 0);
    }

    #[test]
    fn radius_change_rescales_layout() {
        let mut table = two_ball_table(TableLayout::pool(R));
        let mut physics = table.physics().clone();
        physics.set_radius(2.0 * R);
        table.set_physics(physics);
        assert_eq!(table.physics().radius(), 2.0 * R);
        let rebuilt = TableLayout::pool(2.0 * R);
        assert!((table.layout().table_x - rebuilt.table_x).abs() < 1e-6);
        let corner = &table.layout().pockets[0];
        assert!(corner.centre.distance_to(&rebuilt.pockets[0].centre) < 1e-6);
        assert!((corner.radius - rebuilt.pockets[0].radius).abs() < 1e-6);

        // Other constants leave the layout alone.
        let layout = table.layout().clone();
        let mut physics = table.physics().clone();
        physics.set_mu_slide(0.2);
        table.set_physics(physics);
        assert_eq!(table.layout(), &layout);
    }

    #[test]
    fn overlapping_pair_does_not_converge() {
        let mut balls = vec![Ball::new(0, Vec3::ZERO), Ball::new(1, Vec3::new(R, 0.0, 0.0))];
        balls[0].set_motion(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
        let mut table = Table::new(balls, TableLayout::carom(R), Physics::default());
        assert_eq!(
            table.advance(DT),
            Err(PhysicsError::ResolutionDidNotConverge {
                depth: DEFAULT_MAX_RESOLUTION_DEPTH + 1
            })
        );
    }

    #[test]
    fn mathaven_failure_aborts_advance() {
        let layout = TableLayout::carom(R);
        let start = Vec3::new(layout.table_x - 0.001, 0.0, 0.0);
        let mut cfg = Physics::default().config().clone();
        cfg.mathaven_mu_s = -5.0;
        cfg.mathaven_mu_w = 0.0;
        let mut table = Table::new(vec![Ball::new(0, start)], layout, Physics::new(cfg));
        table.set_cushion_model(CushionModel::Mathaven);
        table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        assert!(matches!(
            table.advance(DT),
            Err(PhysicsError::CushionSolutionNotFound { .. })
        ));
    }

    #[test]
    fn halt_stops_and_settles() {
        let mut table = two_ball_table(TableLayout::pool(R));
        table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        table.balls[1].state = BallState::Falling;
        table.balls[1].pocket = Some(0);
        table.halt();
        assert!(table.all_stationary());
        assert_eq!(table.balls()[1].state, BallState::InPocket);
        assert_eq!(table.balls()[1].pos.z, resting_depth(1, R));
    }

    #[test]
    fn overlap_check_ignores_excluded_and_potted() {
        let mut table = two_ball_table(TableLayout::pool(R));
        let spot = Vec3::new(0.5 * R, 0.0, 0.0);
        assert!(table.overlaps_any(&spot, None));
        assert!(!table.overlaps_any(&spot, Some(0)));
        table.balls[0].settle_in_pocket();
        assert!(!table.overlaps_any(&spot, None));
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let mut table = two_ball_table(TableLayout::pool(R));
        table.hit(Vec3::new(1.0, 0.2, 0.0), Vec3::new(3.0, -1.0, 2.0)).unwrap();
        for _ in 0..20 {
            table.advance(DT).unwrap();
        }
        let snap = table.snapshot();
        let json = snap.to_json().unwrap();

        let mut other = two_ball_table(TableLayout::pool(R));
        other
            .restore(&TableSnapshot::from_json(&json).unwrap())
            .unwrap();
        assert_eq!(other.snapshot(), snap);

        let short = TableSnapshot { balls: snap.balls[..1].to_vec() };
        assert_eq!(
            other.restore(&short),
            Err(PhysicsError::InvalidSnapshot {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn restore_rejects_duplicate_ids_untouched() {
        let mut table = two_ball_table(TableLayout::pool(R));
        table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        table.balls[1].set_motion(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
        let before = table.snapshot();
        let doubled = TableSnapshot {
            balls: vec![
                BallSnapshot::at(0, Vec3::new(0.1, 0.0, 0.0)),
                BallSnapshot::at(0, Vec3::new(0.2, 0.0, 0.0)),
            ],
        };
        assert_eq!(
            table.restore(&doubled),
            Err(PhysicsError::InvalidSnapshot {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(table.snapshot(), before);
        assert_eq!(table.balls()[1].state, BallState::Sliding);
    }

    #[test]
    fn restore_with_unknown_id_changes_nothing() {
        let mut table = two_ball_table(TableLayout::pool(R));
        let before = table.snapshot();
        let stray = TableSnapshot {
            balls: vec![
                BallSnapshot::at(0, Vec3::new(0.1, 0.0, 0.0)),
                BallSnapshot::at(7, Vec3::new(0.2, 0.0, 0.0)),
            ],
        };
        assert_eq!(
            table.restore(&stray),
            Err(PhysicsError::UnknownBall { id: 7 })
        );
        assert_eq!(table.snapshot(), before);
        assert_eq!(table.balls()[0].pos, Vec3::ZERO);
    }

    #[test]
    fn restore_accepts_entries_in_any_order() {
        let mut table = two_ball_table(TableLayout::pool(R));
        let shuffled = TableSnapshot {
            balls: vec![
                BallSnapshot::at(1, Vec3::new(0.2, 0.1, 0.0)),
                BallSnapshot::at(0, Vec3::new(-0.2, 0.1, 0.0)),
            ],
        };
        table.restore(&shuffled).unwrap();
        assert_vec_close(table.balls()[0].pos, Vec3::new(-0.2, 0.1, 0.0), 1e-7);
        assert_vec_close(table.balls()[1].pos, Vec3::new(0.2, 0.1, 0.0), 1e-7);
        assert!(table.all_stationary());
    }

    #[test]
    fn short_restore_leaves_balls_at_rest() {
        let mut table = two_ball_table(TableLayout::pool(R));
        table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        table.advance(DT).unwrap();
        table.restore_short(&[0.1, 0.2, -0.3, 0.4]).unwrap();
        assert!(table.all_stationary());
        assert_vec_close(table.balls()[1].pos, Vec3::new(-0.3, 0.4, 0.0), 1e-7);
        assert_eq!(table.short_snapshot().ball_count(), 2);
        assert!(table.restore_short(&[0.0; 3]).is_err());
    }

    #[test]
    fn override_unknown_ball_fails() {
        let mut table = two_ball_table(TableLayout::pool(R));
        let target = BallOverride::at(Vec3::ZERO);
        assert_eq!(
            table.apply_override(9, &target, 0.0),
            Err(PhysicsError::UnknownBall { id: 9 })
        );
        table.apply_override(1, &target, 0.0).unwrap();
        assert_eq!(table.balls()[1].pos, Vec3::ZERO);
    }

    #[test]
    fn outcome_timestamps_use_simulated_clock() {
        let mut table = two_ball_table(TableLayout::pool(R));
        table.step(0.25).unwrap();
        table.hit(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO).unwrap();
        assert_eq!(table.outcome().events()[0].timestamp, table.clock());
        table.outcome_mut().clear();
        assert!(table.outcome().is_empty());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        /// Four balls well apart, each with its own velocity.
        fn scattered(velocities: &[(f64, f64)]) -> Table {
            let spots = [(-0.4, -0.2), (0.4, 0.2), (-0.4, 0.2), (0.4, -0.2)];
            let balls = spots
                .iter()
                .zip(velocities)
                .enumerate()
                .map(|(i, (&(x, y), &(vx, vy)))| {
                    let mut ball = Ball::new(i, Vec3::new(x, y, 0.0));
                    ball.set_motion(Vec3::new(vx, vy, 0.0), Vec3::ZERO);
                    ball
                })
                .collect();
            Table::new(balls, TableLayout::pool(R), Physics::default())
        }

        fn velocities() -> impl Strategy<Value = Vec<(f64, f64)>> {
            prop::collection::vec((-2.5f64..2.5, -2.5f64..2.5), 4)
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(24))]

            #[test]
            fn balls_never_overlap(vels in velocities()) {
                let mut table = scattered(&vels);
                for _ in 0..400 {
                    table.advance(DT).unwrap();
                    let on_table: Vec<&Ball> =
                        table.balls().iter().filter(|b| b.on_table()).collect();
                    for (i, a) in on_table.iter().enumerate() {
                        for b in &on_table[i + 1..] {
                            let d = a.pos.distance_to(&b.pos);
                            prop_assert!(
                                d >= 2.0 * R - 1e-6,
                                "balls {} and {} overlap: {}", a.id, b.id, d
                            );
                        }
                    }
                }
            }

            #[test]
            fn advance_zero_is_identity(vels in velocities(), ticks in 0usize..50) {
                let mut table = scattered(&vels);
                for _ in 0..ticks {
                    table.advance(DT).unwrap();
                }
                let before = table.snapshot();
                table.advance(0.0).unwrap();
                prop_assert_eq!(table.snapshot(), before);
            }

            #[test]
            fn side_spin_never_speeds_a_ball_up(
                vx in -2.0f64..2.0,
                vy in -2.0f64..2.0,
                wz in -40.0f64..40.0,
            ) {
                // One ball in the middle of a carom table: nothing to hit.
                let mut ball = Ball::new(0, Vec3::ZERO);
                ball.set_motion(Vec3::new(vx, vy, 0.0), Vec3::new(0.0, 0.0, wz));
                let mut table = Table::new(vec![ball], TableLayout::carom(R), Physics::default());
                let mut speed = table.balls()[0].vel.length();
                for _ in 0..100 {
                    table.advance(DT).unwrap();
                    let now = table.balls()[0].vel.length();
                    prop_assert!(now <= speed * (1.0 + 1e-6) + 1e-9, "{} > {}", now, speed);
                    speed = now;
                }
            }

            #[test]
            fn stopped_table_stays_stopped(vels in velocities()) {
                let mut table = scattered(&vels);
                for _ in 0..20_000 {
                    if table.all_stationary() {
                        break;
                    }
                    table.advance(DT).unwrap();
                }
                prop_assert!(table.all_stationary());
                let before = table.snapshot();
                let events = table.outcome().len();
                for _ in 0..10 {
                    table.advance(DT).unwrap();
                }
                prop_assert_eq!(table.snapshot(), before);
                prop_assert_eq!(table.outcome().len(), events);
            }
        }
    }
}
