use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use symreg::config::{CrossoverMode, FunctionSetConfig, MutationMode};
use symreg::engines::generation::chromosome::{is_well_formed, Chromosome};
use symreg::engines::generation::operators::{crossover, mutate};
use symreg::functions::registry::GeneRegistry;

fn registry() -> GeneRegistry {
    GeneRegistry::new(&FunctionSetConfig {
        terminals: vec!["x".into(), "y".into()],
        ..Default::default()
    })
    .unwrap()
}

fn crossover_mode() -> impl Strategy<Value = CrossoverMode> {
    prop_oneof![
        Just(CrossoverMode::Middle),
        Just(CrossoverMode::PartialAbsorption),
        Just(CrossoverMode::TotalAbsorption),
    ]
}

fn mutation_mode() -> impl Strategy<Value = MutationMode> {
    prop_oneof![
        Just(MutationMode::Replace),
        Just(MutationMode::Swap),
        Just(MutationMode::Displace),
    ]
}

proptest! {
    #[test]
    fn generated_trees_are_well_formed(seed in any::<u64>(), depth in 0usize..6) {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(seed);
        let full = Chromosome::full(&registry, depth, &mut rng);
        let grow = Chromosome::grow(&registry, depth, &mut rng);

        prop_assert!(is_well_formed(full.genes()));
        prop_assert_eq!(full.depth(), depth);
        prop_assert!(is_well_formed(grow.genes()));
        prop_assert!(grow.depth() <= depth);
        prop_assert_eq!(grow.end_of_branch(0), grow.len());
    }

    #[test]
    fn crossover_children_are_well_formed(
        seed in any::<u64>(),
        depth in 0usize..5,
        mode in crossover_mode(),
    ) {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(seed);
        let mother = Chromosome::random(&registry, depth, &mut rng);
        let father = Chromosome::random(&registry, depth, &mut rng);

        let (a, b) = crossover(mode, &mother, &father, &mut rng);
        prop_assert!(is_well_formed(a.genes()));
        prop_assert!(is_well_formed(b.genes()));
        prop_assert_eq!(a.end_of_branch(0), a.len());
        prop_assert_eq!(b.end_of_branch(0), b.len());
    }

    #[test]
    fn mutations_keep_trees_well_formed(
        seed in any::<u64>(),
        depth in 0usize..6,
        mode in mutation_mode(),
    ) {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut chromosome = Chromosome::random(&registry, depth, &mut rng);
        let before = chromosome.len();

        mutate(mode, &mut chromosome, &registry, &mut rng);
        prop_assert!(is_well_formed(chromosome.genes()));
        if mode != MutationMode::Displace {
            prop_assert_eq!(chromosome.len(), before);
        }
    }

    #[test]
    fn written_genes_read_back_identically(
        seed in any::<u64>(),
        depth in 0usize..6,
        x in -5.0f64..5.0,
        y in -5.0f64..5.0,
    ) {
        let registry = registry();
        let mut rng = StdRng::seed_from_u64(seed);
        let original = Chromosome::random(&registry, depth, &mut rng);
        let restored = Chromosome::read_genes(&original.write_genes(), &registry).unwrap();

        prop_assert_eq!(restored.formula(), original.formula());
        match (original.evaluate(&[x, y]), restored.evaluate(&[x, y])) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a.to_bits(), b.to_bits()),
            (a, b) => prop_assert_eq!(a, b),
        }
    }
}
