/// Fatal simulation failures.
///
/// Both physical variants mean the configuration is broken, not that the
/// caller should retry: continuing would leave non-physical state that the
/// other simulation instance cannot reproduce.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The collision/cushion/pocket retry loop found a new event on every
    /// pass (e.g. three mutually overlapping balls).
    ResolutionDidNotConverge { depth: u32 },
    /// The iterative cushion solver exceeded its step budget.
    CushionSolutionNotFound { steps: u32 },
    /// A snapshot does not describe the same number of balls as the table.
    InvalidSnapshot { expected: usize, found: usize },
    /// No ball with this id exists on the table.
    UnknownBall { id: usize },
}

impl std::fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolutionDidNotConverge { depth } => {
                write!(f, "collision resolution did not converge after {depth} passes")
            },
            Self::CushionSolutionNotFound { steps } => {
                write!(f, "cushion solution not found after {steps} steps")
            },
            Self::InvalidSnapshot { expected, found } => {
                write!(f, "snapshot has {found} balls, table has {expected}")
            },
            Self::UnknownBall { id } => write!(f, "no ball with id {id}"),
        }
    }
}

impl std::error::Error for PhysicsError {}
