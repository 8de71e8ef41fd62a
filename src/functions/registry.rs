use super::primitives::{self, Operation};
use crate::config::{ConfigSection, FunctionSetConfig};
use crate::engines::generation::gene::Gene;
use crate::error::{Result, SymregError};
use crate::types::GeneKind;
use rand::Rng;
use std::sync::Arc;

/// Pools of genes available to a run.
///
/// Built once from configuration and never modified afterwards. Share it as
/// `Arc<GeneRegistry>`; concurrent reads need no synchronization.
#[derive(Debug, Clone)]
pub struct GeneRegistry {
    symbols: Vec<Gene>,
    max_constant: i64,
    functions: Vec<Gene>,
    unary: Vec<Gene>,
    binary: Vec<Gene>,
}

impl GeneRegistry {
    pub fn new(config: &FunctionSetConfig) -> Result<Self> {
        config.validate()?;

        let mut symbols: Vec<Gene> = Vec::with_capacity(config.terminals.len());
        for (slot, name) in config.terminals.iter().enumerate() {
            if symbols.iter().any(|s| s.name() == *name) {
                log::warn!("Duplicate terminal '{}' ignored", name);
                continue;
            }
            symbols.push(Gene::Symbol { name: Arc::from(name.as_str()), slot });
        }

        let unary = Self::build_pool(&config.unary)?;
        let binary = Self::build_pool(&config.binary)?;
        let mut functions: Vec<Gene> = unary.iter().chain(binary.iter()).cloned().collect();
        functions.sort_by_key(|g| g.name());

        Ok(Self {
            symbols,
            max_constant: config.max_constant,
            functions,
            unary,
            binary,
        })
    }

    /// Pools are sorted by name so draws only depend on the RNG state.
    fn build_pool(names: &[String]) -> Result<Vec<Gene>> {
        let mut names: Vec<&str> = names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();
        names
            .into_iter()
            .map(|name| {
                Self::bind(name).ok_or_else(|| {
                    SymregError::Configuration(format!("Unknown function '{}'", name))
                })
            })
            .collect()
    }

    fn bind(name: &str) -> Option<Gene> {
        primitives::lookup(name).map(|f| match f.operation {
            Operation::Unary(func) => Gene::Unary { name: f.alias, func },
            Operation::Binary(func) => Gene::Binary { name: f.alias, func },
        })
    }

    pub fn symbols(&self) -> &[Gene] {
        &self.symbols
    }

    /// Symbol terminal or integer constant, 50/50 when constants are enabled.
    pub fn random_terminal<R: Rng>(&self, rng: &mut R) -> Gene {
        if self.max_constant > 0 && rng.gen_bool(0.5) {
            self.random_integer(rng)
        } else {
            self.random_symbol(rng)
        }
    }

    pub fn random_symbol<R: Rng>(&self, rng: &mut R) -> Gene {
        self.symbols[rng.gen_range(0..self.symbols.len())].clone()
    }

    pub fn random_integer<R: Rng>(&self, rng: &mut R) -> Gene {
        Gene::Integer(rng.gen_range(-self.max_constant..=self.max_constant))
    }

    pub fn random_function<R: Rng>(&self, rng: &mut R) -> Gene {
        // validation guarantees at least one function
        self.functions[rng.gen_range(0..self.functions.len())].clone()
    }

    pub fn random_unary_function<R: Rng>(&self, rng: &mut R) -> Option<Gene> {
        Self::draw(&self.unary, rng)
    }

    pub fn random_binary_function<R: Rng>(&self, rng: &mut R) -> Option<Gene> {
        Self::draw(&self.binary, rng)
    }

    fn draw<R: Rng>(pool: &[Gene], rng: &mut R) -> Option<Gene> {
        if pool.is_empty() {
            None
        } else {
            Some(pool[rng.gen_range(0..pool.len())].clone())
        }
    }

    pub fn symbol(&self, name: &str) -> Option<Gene> {
        self.symbols.iter().find(|s| s.name() == name).cloned()
    }

    pub fn function(&self, name: &str) -> Option<Gene> {
        self.functions
            .iter()
            .find(|f| matches!(f, Gene::Unary { name: n, .. } | Gene::Binary { name: n, .. } if *n == name))
            .cloned()
    }

    /// Create a gene of `kind`, drawn uniformly from its pool unless `value` is given.
    pub fn create_gene<R: Rng>(&self, kind: GeneKind, value: Option<&str>, rng: &mut R) -> Result<Gene> {
        let Some(value) = value else {
            return match kind {
                GeneKind::Symbol => Ok(self.random_symbol(rng)),
                GeneKind::Integer => Ok(self.random_integer(rng)),
                GeneKind::Function => Ok(self.random_function(rng)),
                GeneKind::Unary => self.random_unary_function(rng).ok_or_else(|| {
                    SymregError::Generation("No unary function configured".to_string())
                }),
                GeneKind::Binary => self.random_binary_function(rng).ok_or_else(|| {
                    SymregError::Generation("No binary function configured".to_string())
                }),
            };
        };
        self.gene_from_literal(kind, value)
    }

    /// Rebuild a gene from its serialized value and kind.
    pub fn gene_from_literal(&self, kind: GeneKind, value: &str) -> Result<Gene> {
        match kind {
            GeneKind::Symbol => self.symbol(value).ok_or_else(|| {
                SymregError::MalformedGene(format!("unknown terminal symbol '{}'", value))
            }),
            GeneKind::Integer => value.trim().parse::<i64>().map(Gene::Integer).map_err(|_| {
                SymregError::MalformedGene(format!("invalid integer constant '{}'", value))
            }),
            GeneKind::Function | GeneKind::Unary | GeneKind::Binary => {
                let gene = self.function(value).ok_or_else(|| {
                    SymregError::MalformedGene(format!("unknown function '{}'", value))
                })?;
                if kind != GeneKind::Function && gene.kind() != kind {
                    return Err(SymregError::MalformedGene(format!(
                        "function '{}' is not {:?}",
                        value, kind
                    )));
                }
                Ok(gene)
            }
        }
    }
}
