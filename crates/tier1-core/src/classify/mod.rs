pub mod engine;
pub mod outcome;
pub mod ratio;

pub use engine::{assess, calculate_exceedances};
pub use outcome::{ExceedanceRow, ExceedanceType, RatedExceedance};
pub use ratio::generate_exceedance_table;
