mod api;
mod converter;
mod dto;

pub use api::*;
pub use converter::*;
pub use dto::*;
