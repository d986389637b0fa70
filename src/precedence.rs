//! Operator precedence and the minimal-parenthesization rule.
//!
//! The default table, in ascending order of precedence:
//!
//! | Rank | Operators     | Associativity |
//! |------|---------------|---------------|
//! | 0    | `-` `+`       | left          |
//! | 1    | `/` `*` `of`  | left          |
//! | 2    | `^`           | right         |

use std::collections::HashMap;

use crate::ast::{AstObject, concepts, concepts::properties};

/// Direction in which a chain of equal-precedence operators groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Associativity {
    #[default]
    Left,
    Right,
}

impl Associativity {
    /// The operand slot that groups without parentheses.
    fn operand(self) -> &'static str {
        match self {
            Associativity::Left => properties::LEFT_OPERAND,
            Associativity::Right => properties::RIGHT_OPERAND,
        }
    }
}

/// Operator groups ordered by ascending precedence, plus associativity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorTable {
    groups: Vec<Vec<String>>,
    associativity: HashMap<String, Associativity>,
}

impl Default for OperatorTable {
    fn default() -> Self {
        OperatorTable::new([vec!["-", "+"], vec!["/", "*", "of"], vec!["^"]])
            .with_associativity("^", Associativity::Right)
    }
}

impl OperatorTable {
    /// Builds a table from groups listed in ascending order of precedence.
    /// Every operator starts out left-associative.
    pub fn new<G, S>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OperatorTable {
            groups: groups
                .into_iter()
                .map(|group| group.into_iter().map(Into::into).collect())
                .collect(),
            associativity: HashMap::new(),
        }
    }

    pub fn with_associativity(mut self, operator: &str, associativity: Associativity) -> Self {
        self.associativity.insert(operator.to_string(), associativity);
        self
    }

    /// Rank of the operator's group, or `None` for unknown operators.
    pub fn precedence_of(&self, operator: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|group| group.iter().any(|candidate| candidate == operator))
    }

    pub fn associativity_of(&self, operator: &str) -> Associativity {
        self.associativity.get(operator).copied().unwrap_or_default()
    }

    /// Determines whether `expr` needs parentheses around it so that printing
    /// `parent` in infix form keeps the tree's order of operations.
    ///
    /// Only the immediate parent matters. Parentheses are needed when the
    /// parent is a Binary Operation and either binds tighter than `expr`, or
    /// binds equally tight and `expr` sits in the operand slot opposite the
    /// parent operator's associativity (the right operand of `-`, the left
    /// operand of `^`). Expressions other than Binary Operations never need
    /// them; an operator missing from the table always does.
    pub fn requires_parentheses(&self, expr: &AstObject, parent: Option<&AstObject>) -> bool {
        let Some(parent) = parent.filter(|p| p.is_a(concepts::BINARY_OPERATION)) else {
            return false;
        };
        if !expr.is_a(concepts::BINARY_OPERATION) {
            return false;
        }

        let expr_operator = expr.get_str(properties::OPERATOR).unwrap_or_default();
        let parent_operator = parent.get_str(properties::OPERATOR).unwrap_or_default();
        let (Some(expr_rank), Some(parent_rank)) = (
            self.precedence_of(expr_operator),
            self.precedence_of(parent_operator),
        ) else {
            return true;
        };

        parent_rank > expr_rank
            || (parent_rank == expr_rank
                && !parent.owns_at(self.associativity_of(parent_operator).operand(), &expr.id))
    }
}
