pub mod assessment;
pub mod patient;
pub mod plan;
