pub mod coordinate;
pub mod forecast;
pub mod series;
pub mod variable;
