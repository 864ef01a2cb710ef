pub mod markup;
pub mod styles;
pub mod view;

pub use markup::{escape_html, Element, Node};
