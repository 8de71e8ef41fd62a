use crate::functions::primitives::{BinaryFn, UnaryFn};
use crate::types::GeneKind;
use std::fmt;
use std::sync::Arc;

/// Atomic element of a chromosome.
///
/// Functions carry their evaluation callable as data, so a gene is a small
/// value that can be cloned freely between chromosomes.
#[derive(Clone)]
pub enum Gene {
    /// Input variable reading `slot` of the input row
    Symbol { name: Arc<str>, slot: usize },
    Integer(i64),
    Unary { name: &'static str, func: UnaryFn },
    Binary { name: &'static str, func: BinaryFn },
}

impl Gene {
    pub fn kind(&self) -> GeneKind {
        match self {
            Gene::Symbol { .. } => GeneKind::Symbol,
            Gene::Integer(_) => GeneKind::Integer,
            Gene::Unary { .. } => GeneKind::Unary,
            Gene::Binary { .. } => GeneKind::Binary,
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Gene::Symbol { .. } | Gene::Integer(_) => 0,
            Gene::Unary { .. } => 1,
            Gene::Binary { .. } => 2,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.arity() == 0
    }

    pub fn is_function(&self) -> bool {
        !self.is_terminal()
    }

    /// Display/lookup key: symbol name, integer literal or function alias.
    pub fn name(&self) -> String {
        match self {
            Gene::Symbol { name, .. } => name.to_string(),
            Gene::Integer(value) => value.to_string(),
            Gene::Unary { name, .. } | Gene::Binary { name, .. } => (*name).to_string(),
        }
    }

    /// Population file token, `value:kindCode`.
    pub fn to_token(&self) -> String {
        format!("{}:{}", self.name(), self.kind().code())
    }

    /// Human readable rendering given the already rendered arguments.
    pub fn render(&self, args: &[String]) -> String {
        match self {
            Gene::Symbol { name, .. } => name.to_string(),
            Gene::Integer(value) if *value < 0 => format!("({value})"),
            Gene::Integer(value) => value.to_string(),
            Gene::Unary { name, .. } => format!("{}({})", name, args[0]),
            Gene::Binary { name, .. } => format!("({}{}{})", args[0], name, args[1]),
        }
    }
}

impl PartialEq for Gene {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Gene::Symbol { name: a, slot: sa }, Gene::Symbol { name: b, slot: sb }) => {
                a == b && sa == sb
            }
            (Gene::Integer(a), Gene::Integer(b)) => a == b,
            (Gene::Unary { name: a, .. }, Gene::Unary { name: b, .. })
            | (Gene::Binary { name: a, .. }, Gene::Binary { name: b, .. }) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Gene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}
