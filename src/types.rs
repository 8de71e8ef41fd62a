use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind tag of a gene.
///
/// The numeric codes are part of the population file format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeneKind {
    Symbol,
    Integer,
    Unary,
    Binary,
    /// Any function, unary or binary. Only meaningful as a draw request.
    Function,
}

impl GeneKind {
    pub fn code(self) -> u8 {
        match self {
            GeneKind::Symbol => 2,
            GeneKind::Integer => 3,
            GeneKind::Function => 4,
            GeneKind::Unary => 5,
            GeneKind::Binary => 6,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            2 => Some(GeneKind::Symbol),
            3 => Some(GeneKind::Integer),
            5 => Some(GeneKind::Unary),
            6 => Some(GeneKind::Binary),
            _ => None,
        }
    }
}

/// Why an evolution run halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    MaxIterations,
    FitnessThreshold,
    Timeout,
    Cancelled,
    /// Nothing valid left to breed from.
    PopulationExhausted,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StopReason::MaxIterations => "maximum iterations reached",
            StopReason::FitnessThreshold => "fitness threshold reached",
            StopReason::Timeout => "time budget exhausted",
            StopReason::Cancelled => "stop requested",
            StopReason::PopulationExhausted => "population exhausted",
        };
        f.write_str(label)
    }
}

/// Lifecycle phase of the engine, reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    Populating,
    Selecting,
    Mating,
    CrossingOver,
    Mutating,
    Replacing,
    Stopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for kind in [GeneKind::Symbol, GeneKind::Integer, GeneKind::Unary, GeneKind::Binary] {
            assert_eq!(GeneKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(GeneKind::from_code(4), None);
        assert_eq!(GeneKind::from_code(0), None);
    }
}
