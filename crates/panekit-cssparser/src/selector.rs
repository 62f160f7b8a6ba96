//! Selectors.
//!
//! A selector is a chain of basic selectors. The last component is the
//! subject (the widget being styled); earlier components describe ancestors.
//! Each component records how the *next component toward the root* must
//! relate to it, so that matching can walk leaf-to-root.

use std::fmt;

use smallvec::SmallVec;
use tracing::trace;

use crate::pseudo::{PseudoClass, PseudoMask};

/// How the next component toward the root relates to this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Relation {
    /// First component of the chain.
    #[default]
    NoRelation,
    /// Descendant combinator: some ancestor must match the next component.
    MatchNextIfAncestor,
    /// Child combinator (`>`): the direct parent must match the next component.
    MatchNextIfParent,
}

/// One simple selector: optional type name, optional id, required pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BasicSelector {
    /// Type name. `.Button` and `Button` are the same selector.
    pub element: Option<String>,
    pub id: Option<String>,
    pub pseudo: PseudoMask,
    pub relation: Relation,
}

impl BasicSelector {
    /// The universal selector `*`.
    pub fn universal() -> Self {
        Self::default()
    }

    /// True when this component constrains neither id nor type.
    pub fn is_universal(&self) -> bool {
        self.element.is_none() && self.id.is_none()
    }

    /// Contribution of this component to the selector's specificity.
    pub fn specificity(&self) -> u32 {
        let id = if self.id.is_some() { 0x100 } else { 0 };
        let element = if self.element.is_some() { 1 } else { 0 };
        id + self.pseudo.count() * 0x10 + element
    }
}

impl fmt::Display for BasicSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.element, &self.id) {
            (Some(element), _) => f.write_str(element)?,
            (None, None) if self.pseudo.is_empty() => f.write_str("*")?,
            _ => {}
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        write!(f, "{}", self.pseudo)
    }
}

/// A complete selector alternative.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    components: SmallVec<[BasicSelector; 2]>,
}

impl Selector {
    /// Build a selector from components ordered root-most first.
    ///
    /// An empty list becomes the universal selector.
    pub fn new(components: impl IntoIterator<Item = BasicSelector>) -> Self {
        let mut components: SmallVec<[BasicSelector; 2]> = components.into_iter().collect();
        if components.is_empty() {
            components.push(BasicSelector::universal());
        }
        components[0].relation = Relation::NoRelation;
        Self { components }
    }

    pub fn universal() -> Self {
        Self::new(std::iter::empty())
    }

    /// Components, root-most first. Never empty.
    pub fn components(&self) -> &[BasicSelector] {
        &self.components
    }

    /// The component matched against the styled widget itself.
    pub fn subject(&self) -> &BasicSelector {
        &self.components[self.components.len() - 1]
    }

    /// `0x100` per id, `0x10` per pseudo-class, `1` per type name, summed
    /// over every component.
    pub fn specificity(&self) -> u32 {
        self.components.iter().map(BasicSelector::specificity).sum()
    }

    /// Pseudo-classes required of the subject.
    pub fn pseudo(&self) -> PseudoMask {
        self.subject().pseudo
    }

    /// True if the subject requires no pseudo-class, or all of the ones it
    /// requires are present in `mask`.
    pub fn match_pseudo(&self, mask: PseudoMask) -> bool {
        let required = self.pseudo();
        required.is_empty() || mask.contains(required)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, component) in self.components.iter().enumerate() {
            if idx > 0 {
                match component.relation {
                    Relation::MatchNextIfParent => f.write_str(" > ")?,
                    _ => f.write_str(" ")?,
                }
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b >= 0x80
}

/// Read an identifier starting at `pos`, resolving backslash escapes.
fn read_ident(text: &str, mut pos: usize) -> (String, usize) {
    let bytes = text.as_bytes();
    let mut out = String::new();
    let mut run_start = pos;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b'\\' && pos + 1 < bytes.len() {
            out.push_str(&text[run_start..pos]);
            let escaped = text[pos + 1..].chars().next().unwrap_or('\\');
            out.push(escaped);
            pos += 1 + escaped.len_utf8();
            run_start = pos;
        } else if is_ident_byte(b) {
            pos += 1;
        } else {
            break;
        }
    }
    out.push_str(&text[run_start..pos]);
    (out, pos)
}

/// Parse one comma-free selector alternative. Comments must already be removed.
///
/// Returns `None` for selectors using syntax outside the supported subset
/// (unknown pseudo-classes, pseudo-elements, attribute or sibling selectors).
/// Empty text yields the universal selector.
pub fn parse_selector(text: &str) -> Option<Selector> {
    let bytes = text.as_bytes();
    let mut components: SmallVec<[BasicSelector; 2]> = SmallVec::new();
    let mut current = BasicSelector::default();
    let mut current_started = false;
    let mut pending = Relation::NoRelation;
    let mut pos = 0;

    let mut finish =
        |current: &mut BasicSelector, started: &mut bool, pending: &mut Relation| {
            if *started {
                current.relation = *pending;
                components.push(std::mem::take(current));
                *started = false;
                *pending = Relation::NoRelation;
            }
        };

    while pos < bytes.len() {
        let b = bytes[pos];
        match b {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => {
                if current_started {
                    finish(&mut current, &mut current_started, &mut pending);
                    pending = Relation::MatchNextIfAncestor;
                }
                pos += 1;
            }
            b'>' => {
                finish(&mut current, &mut current_started, &mut pending);
                pending = Relation::MatchNextIfParent;
                pos += 1;
            }
            b'*' => {
                current_started = true;
                pos += 1;
            }
            b'#' => {
                let (id, next) = read_ident(text, pos + 1);
                if id.is_empty() {
                    return None;
                }
                current.id = Some(id);
                current_started = true;
                pos = next;
            }
            b':' => {
                if bytes.get(pos + 1) == Some(&b':') {
                    trace!(selector = text, "Pseudo-elements are not supported");
                    return None;
                }
                let (name, next) = read_ident(text, pos + 1);
                let pseudo = PseudoClass::from_name(&name);
                let Some(pseudo) = pseudo else {
                    trace!(selector = text, pseudo = %name, "Unknown pseudo-class");
                    return None;
                };
                current.pseudo.insert(pseudo);
                current_started = true;
                pos = next;
            }
            b'.' => {
                let (name, next) = read_ident(text, pos + 1);
                if !set_element(&mut current, name) {
                    return None;
                }
                current_started = true;
                pos = next;
            }
            b if is_ident_byte(b) || b == b'\\' => {
                let (name, next) = read_ident(text, pos);
                if !set_element(&mut current, name) {
                    return None;
                }
                current_started = true;
                pos = next;
            }
            _ => {
                trace!(selector = text, "Unsupported selector syntax");
                return None;
            }
        }
    }
    finish(&mut current, &mut current_started, &mut pending);

    Some(Selector::new(components))
}

/// Record a type name; a compound naming two different types can never match.
fn set_element(current: &mut BasicSelector, name: String) -> bool {
    if name.is_empty() {
        return false;
    }
    match &current.element {
        Some(existing) if *existing != name => false,
        _ => {
            current.element = Some(name);
            true
        }
    }
}
