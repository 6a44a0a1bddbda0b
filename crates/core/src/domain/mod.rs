pub mod contract;
pub mod portal;
pub mod recommendation;
