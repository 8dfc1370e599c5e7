pub mod intake;
pub mod series;
