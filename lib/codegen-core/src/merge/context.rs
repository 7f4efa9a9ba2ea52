use crate::{
    ast::document::FragmentRegistry, merge::error::MergeError, state::schema_state::SchemaState,
};

pub const DEFAULT_MAX_DEPTH: usize = 128;

pub struct MergeContext<'a, 's> {
    pub schema: &'s SchemaState,
    pub fragments: &'a dyn FragmentRegistry<'s>,
    /// When unset, fragment spreads stay opaque and contribute no fields.
    pub merge_fragment_spreads: bool,
    pub max_depth: usize,
    depth: usize,
    fragment_stack: Vec<String>,
}

impl<'a, 's> MergeContext<'a, 's> {
    pub fn new(schema: &'s SchemaState, fragments: &'a dyn FragmentRegistry<'s>) -> Self {
        MergeContext {
            schema,
            fragments,
            merge_fragment_spreads: true,
            max_depth: DEFAULT_MAX_DEPTH,
            depth: 0,
            fragment_stack: vec![],
        }
    }

    pub fn with_merge_fragment_spreads(mut self, merge_fragment_spreads: bool) -> Self {
        self.merge_fragment_spreads = merge_fragment_spreads;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub(super) fn enter_selection_set(&mut self) -> Result<(), MergeError> {
        if self.depth >= self.max_depth {
            return Err(MergeError::DepthLimitExceeded {
                max_depth: self.max_depth,
            });
        }

        self.depth += 1;
        Ok(())
    }

    pub(super) fn leave_selection_set(&mut self) {
        self.depth -= 1;
    }

    pub(super) fn enter_fragment(&mut self, fragment_name: &str) -> Result<(), MergeError> {
        if self.fragment_stack.iter().any(|name| name == fragment_name) {
            let mut chain = self.fragment_stack.clone();
            chain.push(fragment_name.to_string());
            return Err(MergeError::FragmentCycle { chain });
        }

        self.fragment_stack.push(fragment_name.to_string());
        Ok(())
    }

    pub(super) fn leave_fragment(&mut self) {
        self.fragment_stack.pop();
    }
}
