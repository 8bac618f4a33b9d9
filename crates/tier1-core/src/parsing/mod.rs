pub mod normalize;
pub mod values;

pub use normalize::{collapse_whitespace, normalize_key};
pub use values::{parse_guideline_value, parse_numeric};
