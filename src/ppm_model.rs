//! PPM context model for ppmx
//!
//! A tree of adaptive contexts indexed by suffixes of the recent symbol
//! history. Each context owns a frequency table over the full alphabet
//! plus the escape pseudo-symbol and a lazily grown map of child
//! contexts keyed by the next history symbol. Orders run from the
//! configured maximum down to the synthetic order -1 table, which is
//! uniform, static, and the terminal fallback for every lookup.

use crate::frequency_table::{AdaptiveFrequencyTable, UniformFrequencyTable};
use std::collections::HashMap;

/// 256 literal byte values plus the escape/EOF pseudo-symbol
pub const ALPHABET_SIZE: usize = 257;

/// In contexts of order >= 0 this symbol means "escape to the next lower
/// order"; at order -1 it means end of stream
pub const ESCAPE_SYMBOL: u32 = (ALPHABET_SIZE - 1) as u32;

/// EOF shares the escape code point; its meaning is fixed by the order
/// at which it is resolved
pub const EOF_SYMBOL: u32 = ESCAPE_SYMBOL;

/// One node of the context tree
#[derive(Debug)]
pub struct Context {
    /// Adaptive counts over the full alphabet including escape
    pub frequencies: AdaptiveFrequencyTable,
    /// Child contexts keyed by the symbol that extends this history
    /// suffix; only literal symbols ever appear as keys
    children: HashMap<u32, Context>,
}

impl Context {
    /// New context: all counts zero except escape at 1, so a fresh
    /// context can always hand the coder a non-empty table
    fn new() -> Self {
        let mut frequencies = AdaptiveFrequencyTable::new(ALPHABET_SIZE);
        frequencies.increment(ESCAPE_SYMBOL);
        Self {
            frequencies,
            children: HashMap::new(),
        }
    }
}

/// The adaptive context tree plus the static order -1 fallback.
///
/// Memory grows on the order of `257^model_order` for adversarial input;
/// the configured maximum order is the caller's resource trade-off.
#[derive(Debug)]
pub struct PpmModel {
    model_order: i32,
    /// Root of the tree (the empty-history context); absent when
    /// context modeling is disabled entirely (order -1)
    root: Option<Context>,
    /// Uniform table over every literal plus EOF; never updated
    pub order_minus1: UniformFrequencyTable,
}

impl PpmModel {
    /// Create a model for the given maximum order (>= -1)
    pub fn new(model_order: i32) -> Self {
        Self {
            model_order,
            root: (model_order >= 0).then(Context::new),
            order_minus1: UniformFrequencyTable::new(ALPHABET_SIZE),
        }
    }

    /// Configured maximum order
    pub fn model_order(&self) -> i32 {
        self.model_order
    }

    /// Locate the context reached by following the `order` most recent
    /// history symbols from the root. `history` is most-recent-first.
    /// Returns None when any step of the path was never created.
    pub fn context_for(&self, history: &[u32], order: usize) -> Option<&Context> {
        let mut ctx = self.root.as_ref()?;
        for &symbol in &history[..order] {
            ctx = ctx.children.get(&symbol)?;
        }
        Some(ctx)
    }

    /// Record one observation of `symbol` in every context along the
    /// current history's suffixes, from order 0 through
    /// `min(history.len(), model_order)`, creating missing contexts on
    /// the way down. The order -1 table is never touched. Encoder and
    /// decoder call this in the identical per-symbol sequence; it is the
    /// only channel through which the two models stay in lock-step.
    pub fn increment_contexts(&mut self, history: &[u32], symbol: u32) {
        let Some(root) = self.root.as_mut() else {
            return;
        };
        let depth = history.len().min(self.model_order as usize);

        root.frequencies.increment(symbol);
        let mut ctx = root;
        for &history_symbol in &history[..depth] {
            ctx = ctx
                .children
                .entry(history_symbol)
                .or_insert_with(Context::new);
            ctx.frequencies.increment(symbol);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency_table::Frequencies;

    #[test]
    fn test_new_context_has_only_escape() {
        let model = PpmModel::new(2);
        let root = model.context_for(&[], 0).unwrap();
        assert_eq!(root.frequencies.total(), 1);
        assert_eq!(root.frequencies.get(ESCAPE_SYMBOL), 1);
        assert_eq!(root.frequencies.get(65), 0);
    }

    #[test]
    fn test_order_minus1_model_has_no_tree() {
        let model = PpmModel::new(-1);
        assert!(model.context_for(&[], 0).is_none());
        assert_eq!(model.order_minus1.total(), ALPHABET_SIZE as u32);
    }

    #[test]
    fn test_increment_updates_every_order() {
        let mut model = PpmModel::new(2);
        // History "BA" (most recent first), observing 'C'
        let history = [66, 65];
        model.increment_contexts(&history, 67);

        // Order 0, 1, and 2 contexts all saw the symbol
        assert_eq!(model.context_for(&history, 0).unwrap().frequencies.get(67), 1);
        assert_eq!(model.context_for(&history, 1).unwrap().frequencies.get(67), 1);
        assert_eq!(model.context_for(&history, 2).unwrap().frequencies.get(67), 1);
    }

    #[test]
    fn test_increment_capped_at_model_order() {
        let mut model = PpmModel::new(1);
        let history = [66, 65];
        model.increment_contexts(&history, 67);

        assert!(model.context_for(&history, 1).is_some());
        // Depth 2 is beyond the model order and must not be created
        assert!(model.context_for(&history, 2).is_none());
    }

    #[test]
    fn test_contexts_created_lazily() {
        let mut model = PpmModel::new(3);
        assert!(model.context_for(&[65], 1).is_none());

        model.increment_contexts(&[65], 66);
        assert!(model.context_for(&[65], 1).is_some());
        // A sibling path is still absent
        assert!(model.context_for(&[66], 1).is_none());
    }

    #[test]
    fn test_order_zero_model_never_descends() {
        let mut model = PpmModel::new(0);
        model.increment_contexts(&[], 65);
        model.increment_contexts(&[], 65);

        let root = model.context_for(&[], 0).unwrap();
        assert_eq!(root.frequencies.get(65), 2);
        assert_eq!(root.frequencies.total(), 3); // escape + two observations
    }

    #[test]
    fn test_escape_count_stays_at_one() {
        let mut model = PpmModel::new(1);
        for _ in 0..100 {
            model.increment_contexts(&[65], 66);
        }
        let ctx = model.context_for(&[65], 1).unwrap();
        assert_eq!(ctx.frequencies.get(ESCAPE_SYMBOL), 1);
        assert_eq!(ctx.frequencies.get(66), 100);
    }
}
