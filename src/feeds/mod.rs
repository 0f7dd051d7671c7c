pub mod demo;
pub mod yahoo;
