//! Catalog of the math functions a gene can bind to.
//!
//! Genes carry the function pointer directly, so evaluation is a plain call
//! with no lookup. Domain errors surface as NaN or infinite results and are
//! turned into invalid fitness by the chromosome evaluator.

pub type UnaryFn = fn(f64) -> f64;
pub type BinaryFn = fn(f64, f64) -> f64;

#[derive(Debug, Clone, Copy)]
pub enum Operation {
    Unary(UnaryFn),
    Binary(BinaryFn),
}

#[derive(Debug, Clone, Copy)]
pub struct MathFunction {
    /// Name used in configuration, formulas and population files
    pub alias: &'static str,
    pub operation: Operation,
}

impl MathFunction {
    pub fn arity(&self) -> usize {
        match self.operation {
            Operation::Unary(_) => 1,
            Operation::Binary(_) => 2,
        }
    }
}

fn add(a: f64, b: f64) -> f64 {
    a + b
}

fn sub(a: f64, b: f64) -> f64 {
    a - b
}

fn mul(a: f64, b: f64) -> f64 {
    a * b
}

fn div(a: f64, b: f64) -> f64 {
    a / b
}

fn pow(a: f64, b: f64) -> f64 {
    a.powf(b)
}

fn sin(x: f64) -> f64 {
    x.sin()
}

fn cos(x: f64) -> f64 {
    x.cos()
}

fn ln(x: f64) -> f64 {
    x.ln()
}

fn sqrt(x: f64) -> f64 {
    x.sqrt()
}

fn tan(x: f64) -> f64 {
    x.tan()
}

fn ctg(x: f64) -> f64 {
    1.0 / x.tan()
}

fn exp(x: f64) -> f64 {
    x.exp()
}

fn tanh(x: f64) -> f64 {
    x.tanh()
}

fn abs(x: f64) -> f64 {
    x.abs()
}

pub const CATALOG: &[MathFunction] = &[
    MathFunction { alias: "+", operation: Operation::Binary(add) },
    MathFunction { alias: "-", operation: Operation::Binary(sub) },
    MathFunction { alias: "*", operation: Operation::Binary(mul) },
    MathFunction { alias: "**", operation: Operation::Binary(pow) },
    MathFunction { alias: "/", operation: Operation::Binary(div) },
    MathFunction { alias: "sin", operation: Operation::Unary(sin) },
    MathFunction { alias: "cos", operation: Operation::Unary(cos) },
    MathFunction { alias: "ln", operation: Operation::Unary(ln) },
    MathFunction { alias: "sqrt", operation: Operation::Unary(sqrt) },
    MathFunction { alias: "tan", operation: Operation::Unary(tan) },
    MathFunction { alias: "ctg", operation: Operation::Unary(ctg) },
    MathFunction { alias: "e", operation: Operation::Unary(exp) },
    MathFunction { alias: "tanh", operation: Operation::Unary(tanh) },
    MathFunction { alias: "abs", operation: Operation::Unary(abs) },
];

pub fn lookup(alias: &str) -> Option<&'static MathFunction> {
    CATALOG.iter().find(|f| f.alias == alias)
}

/// Aliases of every catalog function with the given arity, in catalog order.
pub fn aliases_with_arity(arity: usize) -> Vec<String> {
    CATALOG
        .iter()
        .filter(|f| f.arity() == arity)
        .map(|f| f.alias.to_string())
        .collect()
}
