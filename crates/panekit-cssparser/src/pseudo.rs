//! Pseudo-classes and pseudo-state masks.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A pseudo-class a selector can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PseudoClass {
    Active,
    Checked,
    Default,
    Disabled,
    EditFocus,
    Editable,
    Enabled,
    First,
    Focus,
    HasChildren,
    Hover,
    Indeterminate,
    Last,
    Middle,
    Off,
    On,
    OnlyOne,
    Pressed,
    ReadOnly,
    Selected,
    Unchecked,
}

/// Pseudo-class names sorted by byte order, for binary search.
const PSEUDO_TABLE: &[(&str, PseudoClass)] = &[
    ("active", PseudoClass::Active),
    ("checked", PseudoClass::Checked),
    ("default", PseudoClass::Default),
    ("disabled", PseudoClass::Disabled),
    ("edit-focus", PseudoClass::EditFocus),
    ("editable", PseudoClass::Editable),
    ("enabled", PseudoClass::Enabled),
    ("first", PseudoClass::First),
    ("focus", PseudoClass::Focus),
    ("has-children", PseudoClass::HasChildren),
    ("hover", PseudoClass::Hover),
    ("indeterminate", PseudoClass::Indeterminate),
    ("last", PseudoClass::Last),
    ("middle", PseudoClass::Middle),
    ("off", PseudoClass::Off),
    ("on", PseudoClass::On),
    ("only-one", PseudoClass::OnlyOne),
    ("pressed", PseudoClass::Pressed),
    ("read-only", PseudoClass::ReadOnly),
    ("selected", PseudoClass::Selected),
    ("unchecked", PseudoClass::Unchecked),
];

impl PseudoClass {
    pub fn from_name(name: &str) -> Option<PseudoClass> {
        let lower = name.to_ascii_lowercase();
        PSEUDO_TABLE
            .binary_search_by(|(candidate, _)| candidate.cmp(&lower.as_str()))
            .ok()
            .map(|idx| PSEUDO_TABLE[idx].1)
    }

    pub fn name(self) -> &'static str {
        PSEUDO_TABLE
            .iter()
            .find(|(_, p)| *p == self)
            .map(|(name, _)| *name)
            .unwrap_or("")
    }

    pub fn mask(self) -> PseudoMask {
        PseudoMask(1 << self as u32)
    }
}

/// A set of pseudo-classes: either the ones a selector requires or the ones
/// currently active on a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PseudoMask(pub u32);

impl PseudoMask {
    pub const EMPTY: PseudoMask = PseudoMask(0);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set in `self`.
    pub fn contains(self, other: PseudoMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn has(self, pseudo: PseudoClass) -> bool {
        self.contains(pseudo.mask())
    }

    pub fn insert(&mut self, pseudo: PseudoClass) {
        self.0 |= pseudo.mask().0;
    }

    pub fn remove(&mut self, pseudo: PseudoClass) {
        self.0 &= !pseudo.mask().0;
    }

    /// Number of pseudo-classes in the set.
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = PseudoClass> {
        PSEUDO_TABLE
            .iter()
            .map(|(_, p)| *p)
            .filter(move |p| self.has(*p))
    }
}

impl From<PseudoClass> for PseudoMask {
    fn from(pseudo: PseudoClass) -> Self {
        pseudo.mask()
    }
}

impl BitOr for PseudoMask {
    type Output = PseudoMask;

    fn bitor(self, rhs: PseudoMask) -> PseudoMask {
        PseudoMask(self.0 | rhs.0)
    }
}

impl BitOr<PseudoClass> for PseudoMask {
    type Output = PseudoMask;

    fn bitor(self, rhs: PseudoClass) -> PseudoMask {
        self | rhs.mask()
    }
}

impl BitOr for PseudoClass {
    type Output = PseudoMask;

    fn bitor(self, rhs: PseudoClass) -> PseudoMask {
        self.mask() | rhs.mask()
    }
}

impl BitOrAssign for PseudoMask {
    fn bitor_assign(&mut self, rhs: PseudoMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PseudoMask {
    type Output = PseudoMask;

    fn bitand(self, rhs: PseudoMask) -> PseudoMask {
        PseudoMask(self.0 & rhs.0)
    }
}

impl fmt::Display for PseudoMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pseudo in self.iter() {
            write!(f, ":{}", pseudo.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        for pair in PSEUDO_TABLE.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }

    #[test]
    fn test_mask_operations() {
        let mut mask = PseudoClass::Hover | PseudoClass::Focus;
        assert!(mask.has(PseudoClass::Hover));
        assert!(!mask.has(PseudoClass::Pressed));
        assert_eq!(mask.count(), 2);
        assert!(mask.contains(PseudoClass::Focus.mask()));

        mask.remove(PseudoClass::Focus);
        assert_eq!(mask, PseudoClass::Hover.mask());
        assert!(PseudoMask::EMPTY.is_empty());
        assert!(mask.contains(PseudoMask::EMPTY));
    }

    #[test]
    fn test_display_lists_names_in_table_order() {
        let mask = PseudoClass::Hover | PseudoClass::Checked;
        assert_eq!(mask.to_string(), ":checked:hover");
        assert_eq!(PseudoClass::from_name("Edit-Focus"), Some(PseudoClass::EditFocus));
    }
}
