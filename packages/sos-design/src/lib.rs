pub mod types;
pub mod zpk;
pub mod validation;
pub mod designer;
pub mod normalize;
pub mod generator;
pub mod response;
pub mod render;
pub mod error;

pub use types::*;
pub use designer::{BilinearButterworth, FilterDesigner};
pub use generator::{generate, generate_table, generate_table_with};
pub use render::{render, RenderOptions, TableFormat};
pub use response::{frequency_response, magnitude_db, response_at, ResponsePoint};
pub use error::{DesignError, Result};
