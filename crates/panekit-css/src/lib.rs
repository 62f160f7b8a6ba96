//! # PaneKit CSS
//!
//! Style resolution for PaneKit widget trees.
//!
//! Given stylesheets parsed by `panekit-cssparser`, this crate matches
//! selectors against nodes, orders the matches by cascade weight and merges
//! their declarations into shared, immutable [`RenderRule`]s.
//!
//! ## Example
//!
//! ```
//! use panekit_css::{StyleEngine, PseudoClass, PseudoMask};
//!
//! let mut engine = StyleEngine::default();
//! engine.set_app_style_sheet("Button { background: #ffffff; } Button:hover { color: #ff0000; }");
//!
//! let button = engine.create_query_node("Button", "ok", None);
//! let normal = engine.get_render_rule(&button, PseudoMask::EMPTY);
//! let hover = engine.get_render_rule(&button, PseudoClass::Hover.into());
//! assert!(normal.is_valid());
//! assert_ne!(normal, hover);
//! assert_eq!(normal, engine.get_render_rule(&button, PseudoMask::EMPTY));
//! ```

pub mod cascade;
pub mod engine;
pub mod matcher;
pub mod node;
pub mod query;
pub mod render_rule;
pub mod stylesheet;

pub use cascade::{CascadeWeight, MatchedStyleRule, RuleSetKey};
pub use engine::{StyleEngine, StyleStats};
pub use matcher::matches;
pub use node::{NodeKey, StyleNode};
pub use query::QueryNode;
pub use render_rule::{
    BackgroundLayer, BackgroundPosition, BackgroundRepeat, BackgroundSize, Border, BorderImage, BorderSide,
    BorderStyle, Brush, ClipBox, Cursor, Edges, FontStyle, RenderRule, RenderRuleData, SizeConstraints, TextAlign,
    TextDecoration, TextRule,
};
pub use stylesheet::{SheetId, StyleSheet};

pub use panekit_cssparser::{Color, PseudoClass, PseudoMask};
