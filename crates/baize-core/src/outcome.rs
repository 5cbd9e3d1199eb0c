use serde::{Deserialize, Serialize};

/// Stable ball identifier. Assigned in rack order; 0 is the cue ball.
pub type BallId = usize;

/// The cue ball's identifier.
pub const CUE_BALL: BallId = 0;

/// Kind of physical event recorded during a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeType {
    Pot,
    Cushion,
    Collision,
    Hit,
}

/// A single contact event.
///
/// `ball_b` equals `ball_a` for everything except `Collision`, where it is
/// the struck ball. `timestamp` is the simulated clock in seconds when the
/// event was resolved, so both simulation instances agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub kind: OutcomeType,
    pub ball_a: BallId,
    pub ball_b: BallId,
    pub incident_speed: f64,
    pub timestamp: f64,
}

impl Outcome {
    pub fn pot(ball: BallId, incident_speed: f64, timestamp: f64) -> Self {
        Self::single(OutcomeType::Pot, ball, incident_speed, timestamp)
    }

    pub fn cushion(ball: BallId, incident_speed: f64, timestamp: f64) -> Self {
        Self::single(OutcomeType::Cushion, ball, incident_speed, timestamp)
    }

    pub fn hit(ball: BallId, incident_speed: f64, timestamp: f64) -> Self {
        Self::single(OutcomeType::Hit, ball, incident_speed, timestamp)
    }

    pub fn collision(a: BallId, b: BallId, incident_speed: f64, timestamp: f64) -> Self {
        Self {
            kind: OutcomeType::Collision,
            ball_a: a,
            ball_b: b,
            incident_speed,
            timestamp,
        }
    }

    fn single(kind: OutcomeType, ball: BallId, incident_speed: f64, timestamp: f64) -> Self {
        Self {
            kind,
            ball_a: ball,
            ball_b: ball,
            incident_speed,
            timestamp,
        }
    }

    /// Whether this event involves `ball` on either side.
    pub fn involves(&self, ball: BallId) -> bool {
        self.ball_a == ball || self.ball_b == ball
    }
}

/// Append-only record of what happened physically during a shot.
///
/// The simulation only ever pushes. Rule logic reads the log and clears it
/// between shots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeLog {
    events: Vec<Outcome>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.events.push(outcome);
    }

    /// Remove every event. Called by the shot owner, never by the simulation.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn events(&self) -> &[Outcome] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outcome> {
        self.events.iter()
    }

    fn of_kind(&self, kind: OutcomeType) -> impl Iterator<Item = &Outcome> {
        self.events.iter().filter(move |o| o.kind == kind)
    }

    /// Pot events in the order the balls dropped.
    pub fn pots(&self) -> Vec<&Outcome> {
        self.of_kind(OutcomeType::Pot).collect()
    }

    pub fn pot_count(&self) -> usize {
        self.of_kind(OutcomeType::Pot).count()
    }

    pub fn is_ball_potted(&self, ball: BallId) -> bool {
        self.of_kind(OutcomeType::Pot).any(|o| o.ball_a == ball)
    }

    pub fn is_cue_ball_potted(&self) -> bool {
        self.is_ball_potted(CUE_BALL)
    }

    pub fn collisions(&self) -> Vec<&Outcome> {
        self.of_kind(OutcomeType::Collision).collect()
    }

    /// First ball-ball contact of the shot, if any.
    pub fn first_collision(&self) -> Option<&Outcome> {
        self.of_kind(OutcomeType::Collision).next()
    }

    pub fn cushion_count(&self) -> usize {
        self.of_kind(OutcomeType::Cushion).count()
    }

    /// Cushion contacts logged before the first ball-ball collision.
    pub fn cushions_before_first_collision(&self) -> usize {
        self.events
            .iter()
            .take_while(|o| o.kind != OutcomeType::Collision)
            .filter(|o| o.kind == OutcomeType::Cushion)
            .count()
    }
}

impl<'a> IntoIterator for &'a OutcomeLog {
    type Item = &'a Outcome;
    type IntoIter = std::slice::Iter<'a, Outcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
