use thiserror::Error;

/// Errors surfaced by [`Variant`](crate::Variant) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VariantError {
    /// Asked for an alternative that is not the live one.
    #[error("alternative {requested} is not present (active: {active:?})")]
    AlternativeNotPresent {
        requested: usize,
        active: Option<usize>,
    },

    /// None of the four initialization strategies applied to the alternative.
    #[error("no viable way to initialize alternative {position} (`{type_name}`)")]
    NoViableInitialization {
        position: usize,
        type_name: &'static str,
    },
}
