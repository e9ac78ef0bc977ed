pub mod model;
pub mod table;
