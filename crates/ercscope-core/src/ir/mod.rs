pub mod adapt;
pub mod flow;
pub mod model;
pub mod types;
