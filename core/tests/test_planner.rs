#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use cryptool_core::constants::MAX_BLOCK_SIZE;
    use cryptool_core::planner::{
        plan_block_size, plan_with_probe, FixedMemory, MemoryProbe, MemoryQueryError, SystemMemory,
    };

    #[test]
    fn small_input_is_one_block() {
        assert_eq!(plan_block_size(100, 1000).unwrap(), 100);
    }

    #[test]
    fn large_input_uses_quarter_of_memory() {
        assert_eq!(plan_block_size(3_000_000_000, 4_000_000_000).unwrap(), 1_000_000_000);
    }

    #[test]
    fn quarter_is_capped_at_two_gib() {
        assert_eq!(plan_block_size(20_000_000_000, 40_000_000_000).unwrap(), 2_147_483_648);
        assert_eq!(MAX_BLOCK_SIZE, 2_147_483_648);
    }

    #[test]
    fn boundary_at_half_memory() {
        // Exactly half is no longer "smaller than half".
        assert_eq!(plan_block_size(500, 1000).unwrap(), 250);
        assert_eq!(plan_block_size(499, 1000).unwrap(), 499);
    }

    #[test]
    fn never_zero() {
        assert_eq!(plan_block_size(0, 1000).unwrap(), 1);
        assert_eq!(plan_block_size(10, 2).unwrap(), 1);
    }

    #[test]
    fn zero_memory_is_an_error() {
        assert_eq!(plan_block_size(10, 0), Err(MemoryQueryError::ZeroAvailable));
        assert_eq!(plan_with_probe(10, &FixedMemory(0)), Err(MemoryQueryError::ZeroAvailable));
    }

    #[test]
    fn probe_feeds_planner() {
        assert_eq!(plan_with_probe(100, &FixedMemory(1000)).unwrap(), 100);
    }

    #[test]
    fn system_probe_never_reports_zero() {
        if let Ok(n) = SystemMemory.available_memory() {
            assert!(n > 0);
        }
    }

    proptest! {
        #[test]
        fn prop_bounded_and_deterministic(input in any::<u64>(), avail in 1u64..u64::MAX) {
            let a = plan_block_size(input, avail).unwrap();
            let b = plan_block_size(input, avail).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a >= 1);
            prop_assert!(a <= input.max(1) || a <= MAX_BLOCK_SIZE);
            if input >= avail / 2 {
                prop_assert!(a <= MAX_BLOCK_SIZE);
            }
        }

        #[test]
        fn prop_small_inputs_fit_in_one_block(avail in 4u64..1_000_000_000_000, frac in 0.0f64..0.49) {
            let input = (avail as f64 * frac) as u64;
            prop_assume!(input < avail / 2);
            prop_assert_eq!(plan_block_size(input, avail).unwrap(), input.max(1));
        }
    }
}
