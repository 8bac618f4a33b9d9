pub mod exceedances;
pub mod extract;
pub mod ratio;
pub mod rules;
