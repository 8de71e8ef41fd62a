use super::chromosome::Chromosome;

/// Best individual of each completed generation, in order.
#[derive(Debug, Clone, Default)]
pub struct GenerationHistory {
    best: Vec<Chromosome>,
}

impl GenerationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, best: Chromosome) {
        self.best.push(best);
    }

    /// Best of generation `index`, counting from 0.
    pub fn get(&self, index: usize) -> Option<&Chromosome> {
        self.best.get(index)
    }

    pub fn latest(&self) -> Option<&Chromosome> {
        self.best.last()
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Fitness per generation, for plotting or reports.
    pub fn fitness_curve(&self) -> Vec<f64> {
        self.best.iter().map(Chromosome::fitness).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FunctionSetConfig;
    use crate::functions::registry::GeneRegistry;

    #[test]
    fn test_records_in_order() {
        let registry = GeneRegistry::new(&FunctionSetConfig::default()).unwrap();
        let mut history = GenerationHistory::new();
        assert!(history.latest().is_none());

        history.record(Chromosome::read_genes("x:2", &registry).unwrap());
        history.record(Chromosome::read_genes("sin:5;x:2", &registry).unwrap());

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(0).map(Chromosome::formula), Some("x"));
        assert_eq!(history.latest().map(Chromosome::formula), Some("sin(x)"));
        assert!(history.get(2).is_none());
    }
}
