//! Cost accounting shared by the parser and the interpreter.
//!
//! Every recursive entry point in the front end and every statement or
//! operator application in the evaluator charges a tagged cost against one
//! [`ExecutionBudget`]. Once the ceiling would be crossed the charge fails
//! with [`BudgetExceeded`] and the whole run aborts, which puts a hard bound
//! on the work a runaway or hostile script can cause.
//!
//! Costs are looked up by tag. Tags without a table entry cost 1 unit, so
//! new operations are accounted for even before they get a tuned cost.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::BudgetExceeded;

/// Ceiling used when no explicit limit is configured.
pub const DEFAULT_BUDGET: u32 = 1000;

/// Per-tag costs applied by [`ExecutionBudget::new`].
const DEFAULT_COSTS: &[(&str, u32)] = &[
    ("assignment", 1),
    ("variable_access", 1),
    ("arithmetic", 2),
    ("comparison", 2),
    ("logical", 2),
    ("function_call", 5),
    ("command_call", 10),
    ("if_statement", 3),
    ("foreach_loop", 5),
    ("block", 1),
    ("parse_statement", 0),
    ("parse_expression", 0),
    ("parse_dictionary", 2),
    ("parse_function_call", 1),
];

/// Capability the parser and interpreter consume to account for work.
///
/// The front end takes this as `&mut dyn BudgetChecker` so embedders can
/// substitute their own accounting. A failed charge must leave the checker
/// unchanged: callers treat the error as fatal and never retry.
pub trait BudgetChecker {
    /// Charge the cost of one tagged operation.
    fn charge(&mut self, operation: &str) -> Result<(), BudgetExceeded>;
}

/// Point-in-time usage report for an [`ExecutionBudget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetUsage {
    pub used: u32,
    pub limit: u32,
    pub remaining: u32,
}

/// Default [`BudgetChecker`] with a fixed ceiling and a tunable cost table.
#[derive(Debug, Clone)]
pub struct ExecutionBudget {
    limit: u32,
    used: u32,
    costs: HashMap<String, u32>,
}

impl ExecutionBudget {
    /// Budget with the default cost table and the given ceiling.
    pub fn new(limit: u32) -> Self {
        let costs = DEFAULT_COSTS
            .iter()
            .map(|(tag, cost)| (tag.to_string(), *cost))
            .collect();
        Self {
            limit,
            used: 0,
            costs,
        }
    }

    /// Override the cost of one operation tag.
    pub fn set_cost(&mut self, operation: &str, cost: u32) {
        self.costs.insert(operation.to_string(), cost);
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.limit - self.used
    }

    pub fn usage(&self) -> BudgetUsage {
        BudgetUsage {
            used: self.used,
            limit: self.limit,
            remaining: self.remaining(),
        }
    }

    /// Forget all accumulated usage, keeping the ceiling and cost table.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    fn cost_of(&self, operation: &str) -> u32 {
        self.costs.get(operation).copied().unwrap_or(1)
    }
}

impl Default for ExecutionBudget {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl BudgetChecker for ExecutionBudget {
    fn charge(&mut self, operation: &str) -> Result<(), BudgetExceeded> {
        let cost = self.cost_of(operation);
        let would_use = self.used.saturating_add(cost);
        if would_use > self.limit {
            return Err(BudgetExceeded {
                operation: operation.to_string(),
                used: would_use,
                limit: self.limit,
            });
        }
        self.used = would_use;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charges_accumulate() {
        let mut budget = ExecutionBudget::new(100);
        budget.charge("assignment").unwrap();
        budget.charge("command_call").unwrap();
        assert_eq!(budget.used(), 11);
        assert_eq!(budget.remaining(), 89);
    }

    #[test]
    fn test_unknown_tag_costs_one_unit() {
        let mut budget = ExecutionBudget::new(10);
        budget.charge("definitely_not_in_the_table").unwrap();
        assert_eq!(budget.used(), 1);
    }

    #[test]
    fn test_zero_cost_tags_are_free() {
        let mut budget = ExecutionBudget::new(1);
        for _ in 0..50 {
            budget.charge("parse_expression").unwrap();
        }
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_exceeding_the_limit_fails() {
        let mut budget = ExecutionBudget::new(12);
        budget.charge("command_call").unwrap();
        let err = budget.charge("if_statement").unwrap_err();
        assert_eq!(err.operation, "if_statement");
        assert_eq!(err.used, 13);
        assert_eq!(err.limit, 12);
    }

    #[test]
    fn test_failed_charge_consumes_nothing() {
        let mut budget = ExecutionBudget::new(12);
        budget.charge("command_call").unwrap();
        budget.charge("foreach_loop").unwrap_err();
        assert_eq!(budget.used(), 10);
        // A cheaper operation still fits afterwards.
        budget.charge("assignment").unwrap();
        assert_eq!(budget.used(), 11);
    }

    #[test]
    fn test_exact_fit_is_allowed() {
        let mut budget = ExecutionBudget::new(10);
        budget.charge("command_call").unwrap();
        assert_eq!(budget.remaining(), 0);
    }

    #[test]
    fn test_reset_restores_the_full_ceiling() {
        let mut budget = ExecutionBudget::new(10);
        budget.charge("command_call").unwrap();
        budget.reset();
        assert_eq!(budget.used(), 0);
        budget.charge("command_call").unwrap();
    }

    #[test]
    fn test_set_cost_overrides_the_table() {
        let mut budget = ExecutionBudget::new(10);
        budget.set_cost("command_call", 2);
        budget.charge("command_call").unwrap();
        assert_eq!(budget.used(), 2);
    }

    #[test]
    fn test_usage_snapshot() {
        let mut budget = ExecutionBudget::new(20);
        budget.charge("foreach_loop").unwrap();
        assert_eq!(
            budget.usage(),
            BudgetUsage {
                used: 5,
                limit: 20,
                remaining: 15
            }
        );
    }
}
