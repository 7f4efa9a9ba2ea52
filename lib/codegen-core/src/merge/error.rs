#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("Fragment definition for '{fragment_name}' not found.")]
    FragmentDefinitionNotFound { fragment_name: String },

    #[error("Fragment spreads form a cycle: {}", .chain.join(" -> "))]
    FragmentCycle { chain: Vec<String> },

    #[error("Selection nesting exceeds the limit of {max_depth} levels.")]
    DepthLimitExceeded { max_depth: usize },
}
