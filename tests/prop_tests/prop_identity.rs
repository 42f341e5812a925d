use nexus_records::identity::generate_id_with;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

proptest! {
    #[test]
    fn prop_generated_ids_have_requested_shape(seed in any::<u64>(), len in 1usize..64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let id = generate_id_with(&mut rng, len);
        prop_assert_eq!(id.len(), len);
        prop_assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn prop_same_seed_same_id(seed in any::<u64>()) {
        let a = generate_id_with(&mut StdRng::seed_from_u64(seed), 20);
        let b = generate_id_with(&mut StdRng::seed_from_u64(seed), 20);
        prop_assert_eq!(a, b);
    }
}
