pub mod json;
pub mod path;

pub use json::JsonObject;
pub use path::PathParams;
