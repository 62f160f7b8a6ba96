//! Declarations and style rules.

use std::fmt;

use crate::property::PropertyType;
use crate::selector::Selector;
use crate::values::{CssValue, ValueList};

/// `property: value value ...;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: PropertyType,
    /// Never empty.
    pub values: ValueList,
}

impl Declaration {
    pub fn new(property: PropertyType, values: impl IntoIterator<Item = CssValue>) -> Self {
        Self {
            property,
            values: values.into_iter().collect(),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.property)?;
        for value in &self.values {
            write!(f, " {value}")?;
        }
        f.write_str(";")
    }
}

/// Comma-separated selector alternatives sharing one declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    /// Never empty; rules without declarations are discarded by the parser.
    pub declarations: Vec<Declaration>,
    /// Position in the source stylesheet, strictly increasing.
    pub order: u32,
}

impl fmt::Display for StyleRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, selector) in self.selectors.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{selector}")?;
        }
        f.write_str(" {")?;
        for declaration in &self.declarations {
            write!(f, " {declaration}")?;
        }
        f.write_str(" }")
    }
}
