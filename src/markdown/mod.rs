pub(crate) mod elements;
pub(crate) mod parse;
pub(crate) mod text_style;
