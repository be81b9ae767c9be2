use serde::{Deserialize, Serialize};

use crate::types::Shift;

/// Per-operation edit costs.
///
/// Every method must return a value in `[0, 1]`. The engine does not clamp or
/// check this: beam pruning and the shift-selection bound both assume it, and
/// costs outside that range can make the search miss better alignments.
/// Costs may look at the tokens of the operation at hand (or at the moved
/// block for shifts), never at surrounding context.
pub trait CostModel<T>: Send + Sync {
    fn match_cost(&self, _hyp: &T, _reference: &T) -> f64 {
        0.0
    }

    fn substitute_cost(&self, _hyp: &T, _reference: &T) -> f64 {
        1.0
    }

    fn insert_cost(&self, _hyp: &T) -> f64 {
        1.0
    }

    fn delete_cost(&self, _reference: &T) -> f64 {
        1.0
    }

    fn shift_cost(&self, _shift: &Shift<T>) -> f64 {
        1.0
    }
}

/// Token-independent scalar costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformCost {
    pub match_cost: f64,
    pub substitute_cost: f64,
    pub insert_cost: f64,
    pub delete_cost: f64,
    pub shift_cost: f64,
}

impl Default for UniformCost {
    fn default() -> Self {
        Self {
            match_cost: 0.0,
            substitute_cost: 1.0,
            insert_cost: 1.0,
            delete_cost: 1.0,
            shift_cost: 1.0,
        }
    }
}

impl<T> CostModel<T> for UniformCost {
    fn match_cost(&self, _hyp: &T, _reference: &T) -> f64 {
        self.match_cost
    }

    fn substitute_cost(&self, _hyp: &T, _reference: &T) -> f64 {
        self.substitute_cost
    }

    fn insert_cost(&self, _hyp: &T) -> f64 {
        self.insert_cost
    }

    fn delete_cost(&self, _reference: &T) -> f64 {
        self.delete_cost
    }

    fn shift_cost(&self, _shift: &Shift<T>) -> f64 {
        self.shift_cost
    }
}

impl<T, C: CostModel<T> + ?Sized> CostModel<T> for Box<C> {
    fn match_cost(&self, hyp: &T, reference: &T) -> f64 {
        (**self).match_cost(hyp, reference)
    }

    fn substitute_cost(&self, hyp: &T, reference: &T) -> f64 {
        (**self).substitute_cost(hyp, reference)
    }

    fn insert_cost(&self, hyp: &T) -> f64 {
        (**self).insert_cost(hyp)
    }

    fn delete_cost(&self, reference: &T) -> f64 {
        (**self).delete_cost(reference)
    }

    fn shift_cost(&self, shift: &Shift<T>) -> f64 {
        (**self).shift_cost(shift)
    }
}
