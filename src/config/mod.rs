pub mod catalog;
pub mod resolved;
pub mod settings;
pub mod validator;

pub use catalog::*;
pub use resolved::*;
pub use settings::*;
pub use validator::*;
