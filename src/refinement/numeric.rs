//! Numeric refinement types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::SearcherError;

/// Comparison operator of a numeric refinement
///
/// Discriminants are the wire codes accepted by `TryFrom<i32>`; the derived
/// ordering follows them, which fixes clause order within one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumericOperator {
    Lt = 0,
    Le = 1,
    Eq = 2,
    Ne = 3,
    Ge = 4,
    Gt = 5,
}

impl NumericOperator {
    /// Symbol used when rendering a filter clause
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }

    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for NumericOperator {
    type Error = SearcherError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Lt),
            1 => Ok(Self::Le),
            2 => Ok(Self::Eq),
            3 => Ok(Self::Ne),
            4 => Ok(Self::Ge),
            5 => Ok(Self::Gt),
            other => Err(SearcherError::InvalidArgument(format!(
                "operator code {other} is not one of LT(0), LE(1), EQ(2), NE(3), GE(4), GT(5)"
            ))),
        }
    }
}

impl fmt::Display for NumericOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single `attribute <op> value` constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericRefinement {
    pub attribute: String,
    pub operator: NumericOperator,
    pub value: f64,
}

impl NumericRefinement {
    #[must_use]
    pub fn new(attribute: impl Into<String>, operator: NumericOperator, value: f64) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            value,
        }
    }

    /// Build a refinement from a raw operator code
    ///
    /// # Errors
    /// Returns `SearcherError::InvalidArgument` if `code` is not a known operator.
    pub fn from_code(
        attribute: impl Into<String>,
        code: i32,
        value: f64,
    ) -> Result<Self, SearcherError> {
        Ok(Self::new(attribute, NumericOperator::try_from(code)?, value))
    }
}

impl fmt::Display for NumericRefinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{:.6}", self.attribute, self.operator, self.value)
    }
}
