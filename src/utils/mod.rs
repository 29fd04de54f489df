pub mod formatting;

pub use formatting::{first_value, natural_cmp, truncate_value};
