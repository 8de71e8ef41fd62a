//! Expression trees stored as a flat prefix sequence of genes.
//!
//! The sequence is the canonical representation: a node is followed by its
//! argument subtrees, left before right. Depth, subtree extents and the
//! rendered formula are all derived by scanning it. Scans run on an explicit
//! stack so arbitrarily deep offspring cannot overflow the thread stack.

use super::gene::Gene;
use crate::data::SampleSet;
use crate::error::{Result, SymregError};
use crate::functions::registry::GeneRegistry;
use crate::types::GeneKind;
use rand::Rng;
use std::fmt;
use thiserror::Error;

/// Why a chromosome could not be scored.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("`{0}` produced a non-finite value")]
    Domain(&'static str),
    #[error("input row has no value for slot {0}")]
    MissingInput(usize),
    #[error("accumulated error is not finite")]
    NonFinite,
    #[error("no samples to evaluate against")]
    NoSamples,
    #[error("gene sequence is not a well-formed tree")]
    Malformed,
}

/// Index just past the subtree rooted at `pos`, or `None` if the sequence
/// ends before the subtree is complete.
pub fn branch_end(genes: &[Gene], pos: usize) -> Option<usize> {
    let mut open = 1usize;
    let mut i = pos;
    while open > 0 {
        let gene = genes.get(i)?;
        open = open - 1 + gene.arity();
        i += 1;
    }
    Some(i)
}

/// True iff the whole sequence is exactly one tree.
pub fn is_well_formed(genes: &[Gene]) -> bool {
    !genes.is_empty() && branch_end(genes, 0) == Some(genes.len())
}

#[derive(Debug, Clone)]
pub struct Chromosome {
    genes: Vec<Gene>,
    /// NaN until evaluated, and after a failed evaluation
    fitness: f64,
    depth: usize,
    generation: usize,
    formula: String,
}

impl Chromosome {
    fn with_genes(genes: Vec<Gene>) -> Self {
        let mut chromosome = Self {
            genes,
            fitness: f64::NAN,
            depth: 0,
            generation: 0,
            formula: String::new(),
        };
        chromosome.refresh();
        chromosome
    }

    /// Every root-to-leaf path has exactly `max_depth` edges.
    pub fn full<R: Rng>(registry: &GeneRegistry, max_depth: usize, rng: &mut R) -> Self {
        let mut genes = Vec::new();
        Self::push_full(&mut genes, registry, 0, max_depth, rng);
        Self::with_genes(genes)
    }

    /// Like `full`, but each level below the limit may stop early with a terminal.
    pub fn grow<R: Rng>(registry: &GeneRegistry, max_depth: usize, rng: &mut R) -> Self {
        let mut genes = Vec::new();
        Self::push_grow(&mut genes, registry, 0, max_depth, rng);
        Self::with_genes(genes)
    }

    /// `full` or `grow` with equal probability.
    pub fn random<R: Rng>(registry: &GeneRegistry, max_depth: usize, rng: &mut R) -> Self {
        if rng.gen_bool(0.5) {
            Self::grow(registry, max_depth, rng)
        } else {
            Self::full(registry, max_depth, rng)
        }
    }

    /// Wrap an existing gene sequence, rejecting anything that is not a single tree.
    pub fn from_genes(genes: Vec<Gene>) -> Result<Self> {
        if !is_well_formed(&genes) {
            return Err(SymregError::MalformedGene(format!(
                "{} genes do not form a single tree",
                genes.len()
            )));
        }
        Ok(Self::with_genes(genes))
    }

    /// Wrap a sequence an operator built from well-formed parts.
    pub(crate) fn from_valid_genes(genes: Vec<Gene>) -> Self {
        debug_assert!(is_well_formed(&genes));
        Self::with_genes(genes)
    }

    fn push_full<R: Rng>(
        genes: &mut Vec<Gene>,
        registry: &GeneRegistry,
        level: usize,
        max_depth: usize,
        rng: &mut R,
    ) {
        if level >= max_depth {
            genes.push(registry.random_terminal(rng));
            return;
        }
        let function = registry.random_function(rng);
        let arity = function.arity();
        genes.push(function);
        for _ in 0..arity {
            Self::push_full(genes, registry, level + 1, max_depth, rng);
        }
    }

    fn push_grow<R: Rng>(
        genes: &mut Vec<Gene>,
        registry: &GeneRegistry,
        level: usize,
        max_depth: usize,
        rng: &mut R,
    ) {
        if level >= max_depth || rng.gen_bool(0.5) {
            genes.push(registry.random_terminal(rng));
            return;
        }
        let function = registry.random_function(rng);
        let arity = function.arity();
        genes.push(function);
        for _ in 0..arity {
            Self::push_grow(genes, registry, level + 1, max_depth, rng);
        }
    }

    /// Replace the gene sequence, re-deriving depth and formula.
    pub(crate) fn set_genes(&mut self, genes: Vec<Gene>) {
        debug_assert!(is_well_formed(&genes));
        self.genes = genes;
        self.fitness = f64::NAN;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.depth = self.compute_depth();
        self.formula = self.render_formula();
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn set_generation(&mut self, generation: usize) {
        self.generation = generation;
    }

    /// Index just past the subtree starting at `pos`.
    pub fn end_of_branch(&self, pos: usize) -> usize {
        branch_end(&self.genes, pos).unwrap_or(self.genes.len())
    }

    fn compute_depth(&self) -> usize {
        let mut stack: Vec<usize> = Vec::with_capacity(self.genes.len());
        for gene in self.genes.iter().rev() {
            let depth = match gene.arity() {
                0 => 0,
                1 => stack.pop().unwrap_or(0) + 1,
                _ => {
                    let left = stack.pop().unwrap_or(0);
                    let right = stack.pop().unwrap_or(0);
                    left.max(right) + 1
                }
            };
            stack.push(depth);
        }
        stack.pop().unwrap_or(0)
    }

    fn render_formula(&self) -> String {
        let mut stack: Vec<String> = Vec::with_capacity(self.genes.len());
        for gene in self.genes.iter().rev() {
            let args: Vec<String> = (0..gene.arity())
                .map(|_| stack.pop().unwrap_or_default())
                .collect();
            stack.push(gene.render(&args));
        }
        stack.pop().unwrap_or_default()
    }

    /// Evaluate the tree for one input row.
    pub fn evaluate(&self, row: &[f64]) -> std::result::Result<f64, EvalError> {
        let mut stack: Vec<f64> = Vec::with_capacity(self.genes.len());
        for gene in self.genes.iter().rev() {
            let value = match gene {
                Gene::Symbol { slot, .. } => {
                    *row.get(*slot).ok_or(EvalError::MissingInput(*slot))?
                }
                Gene::Integer(v) => *v as f64,
                Gene::Unary { name, func } => {
                    let arg = stack.pop().ok_or(EvalError::Malformed)?;
                    finite(func(arg), *name)?
                }
                Gene::Binary { name, func } => {
                    let left = stack.pop().ok_or(EvalError::Malformed)?;
                    let right = stack.pop().ok_or(EvalError::Malformed)?;
                    finite(func(left, right), *name)?
                }
            };
            stack.push(value);
        }
        match (stack.pop(), stack.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(EvalError::Malformed),
        }
    }

    /// Score against `samples`: `sqrt(sum of squared errors) / n`.
    ///
    /// Any failing row makes the whole chromosome invalid (fitness NaN).
    pub fn calculate_fitness(&mut self, samples: &SampleSet) -> std::result::Result<f64, EvalError> {
        match self.score(samples) {
            Ok(fitness) => {
                self.fitness = fitness;
                Ok(fitness)
            }
            Err(e) => {
                self.fitness = f64::NAN;
                Err(e)
            }
        }
    }

    fn score(&self, samples: &SampleSet) -> std::result::Result<f64, EvalError> {
        if samples.is_empty() {
            return Err(EvalError::NoSamples);
        }
        let mut sum = 0.0;
        for (row, expected) in samples.iter() {
            let diff = self.evaluate(row)? - expected;
            sum += diff * diff;
        }
        let fitness = sum.sqrt() / samples.len() as f64;
        if fitness.is_finite() {
            Ok(fitness)
        } else {
            Err(EvalError::NonFinite)
        }
    }

    pub fn is_fitness_valid(&self) -> bool {
        self.fitness.is_finite()
    }

    /// Population file line: `value:kindCode` tokens joined by `;`.
    pub fn write_genes(&self) -> String {
        self.genes
            .iter()
            .map(Gene::to_token)
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Parse a population file line.
    pub fn read_genes(line: &str, registry: &GeneRegistry) -> Result<Self> {
        let genes = line
            .trim()
            .split(';')
            .map(|token| Self::parse_token(token, registry))
            .collect::<Result<Vec<_>>>()?;
        Self::from_genes(genes)
    }

    fn parse_token(token: &str, registry: &GeneRegistry) -> Result<Gene> {
        let (value, code) = token.trim().rsplit_once(':').ok_or_else(|| {
            SymregError::MalformedGene(format!("token '{}' is not value:kind", token))
        })?;
        let kind = code
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(GeneKind::from_code)
            .ok_or_else(|| SymregError::MalformedGene(format!("unknown kind code '{}'", code)))?;
        registry.gene_from_literal(kind, value.trim())
    }
}

fn finite(value: f64, name: &'static str) -> std::result::Result<f64, EvalError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalError::Domain(name))
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula)
    }
}
