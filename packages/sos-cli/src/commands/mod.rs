pub mod generate;
pub mod response;
