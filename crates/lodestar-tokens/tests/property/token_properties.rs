use lodestar_tokens::{TokenBudget, TokenCounter};
use proptest::prelude::*;

proptest! {
    #[test]
    fn cached_equals_uncached(s in ".{0,200}") {
        let counter = TokenCounter::new(64).unwrap();
        prop_assert_eq!(counter.count(&s), counter.count_cached(&s));
    }

    #[test]
    fn subadditivity(a in ".{0,100}", b in ".{0,100}") {
        let counter = TokenCounter::new(64).unwrap();
        let combined = format!("{}{}", a, b);
        let count_a = counter.count(&a);
        let count_b = counter.count(&b);
        let count_combined = counter.count(&combined);
        prop_assert!(
            count_combined <= count_a + count_b + 1,
            "subadditivity: {} <= {} + {} + 1",
            count_combined, count_a, count_b
        );
    }

    #[test]
    fn truncate_to_fit_never_exceeds_budget(s in "[a-zA-Z0-9 .,;]{0,400}", max in 0usize..60) {
        let counter = TokenCounter::new(64).unwrap();
        let budget = TokenBudget::new(&counter, max);
        let (trimmed, count) = budget.truncate_to_fit(&s);
        prop_assert!(count <= max);
        prop_assert!(s.starts_with(&trimmed));
    }
}
