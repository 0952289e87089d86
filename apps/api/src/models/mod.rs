pub mod scorecard;
pub mod upload;
