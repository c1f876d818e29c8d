pub mod catalog;
pub mod icons;
pub mod results;
