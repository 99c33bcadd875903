//! Property-based tests for configuration module
//!
//! These tests use proptest to generate random configurations and verify
//! invariants, serialization round-trips, and edge case handling.

use super::*;
use proptest::prelude::*;

// Strategy for generating valid stack configurations
prop_compose! {
    fn valid_stack_config()(
        ignore_unmanaged in any::<bool>(),
    ) -> StackConfig {
        StackConfig { ignore_unmanaged }
    }
}

// Strategy for generating valid animation configurations
prop_compose! {
    fn valid_animation_config()(
        enabled in any::<bool>(),
        duration_ms in 1u32..10_000u32,
        curve in prop_oneof![
            Just("linear".to_string()),
            Just("ease".to_string()),
            Just("ease-in".to_string()),
            Just("ease-out".to_string()),
            Just("ease-in-out".to_string()),
        ],
    ) -> AnimationConfig {
        AnimationConfig {
            enabled,
            duration_ms,
            curve,
        }
    }
}

prop_compose! {
    fn valid_general_config()(
        debug in any::<bool>(),
    ) -> GeneralConfig {
        GeneralConfig { debug }
    }
}

prop_compose! {
    fn valid_config()(
        stack in valid_stack_config(),
        animation in valid_animation_config(),
        general in valid_general_config(),
    ) -> StrataConfig {
        StrataConfig { stack, animation, general }
    }
}

proptest! {
    #[test]
    fn generated_configs_always_validate(config in valid_config()) {
        prop_assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_roundtrip_preserves_config(config in valid_config()) {
        let serialized = toml::to_string(&config).expect("serialization must succeed");
        let deserialized: StrataConfig =
            toml::from_str(&serialized).expect("deserialization must succeed");
        prop_assert_eq!(config, deserialized);
    }

    #[test]
    fn out_of_range_durations_are_rejected(duration_ms in 10_001u32..) {
        let mut config = StrataConfig::default();
        config.animation.duration_ms = duration_ms;
        prop_assert!(config.validate().is_err());
    }

    #[test]
    fn arbitrary_curve_names_are_rejected(curve in "[a-z]{1,12}") {
        let valid = ["linear", "ease", "ease-in", "ease-out", "ease-in-out"];
        prop_assume!(!valid.contains(&curve.as_str()));

        let mut config = StrataConfig::default();
        config.animation.curve = curve;
        prop_assert!(config.validate().is_err());
    }
}
