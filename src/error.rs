/// Relaxation errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelaxError
{
    /// Hierarchy name not in the supported list.
    UnknownHierarchy,
    /// A constraint of degree `degree` needs a relaxation level above `level`.
    DegreeTooHigh {
        /// Degree of the offending constraint.
        degree: usize,
        /// Requested relaxation level.
        level: usize,
    },
    /// The hierarchy needs a different number of variable groups.
    PartyCount {
        /// Number of groups the hierarchy needs.
        expected: usize,
        /// Number of groups given.
        given: usize,
    },
    /// A constraint whose variables do not fit in any clique.
    NoClique,
    /// Operation invoked at a wrong stage of the relaxation.
    StageOrder,
    /// I/O failure while writing a diagnostic dump.
    Io(std::io::ErrorKind),
}

impl core::fmt::Display for RelaxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            RelaxError::UnknownHierarchy => write!(f, "UnknownHierarchy: not allowed hierarchy type"),
            RelaxError::DegreeTooHigh {degree, level} => write!(f,
                "DegreeTooHigh: a constraint has degree {}, choose a level of relaxation higher than {}", degree, level
            ),
            RelaxError::PartyCount {expected, given} => write!(f,
                "PartyCount: {} variable groups expected, {} given", expected, given
            ),
            RelaxError::NoClique => write!(f, "NoClique: constraint variables are not covered by any clique"),
            RelaxError::StageOrder => write!(f, "StageOrder: operation invoked at a wrong stage"),
            RelaxError::Io(kind) => write!(f, "Io: {:?}", kind),
        }
    }
}

impl std::error::Error for RelaxError {}

impl From<std::io::Error> for RelaxError
{
    fn from(e: std::io::Error) -> Self
    {
        RelaxError::Io(e.kind())
    }
}
