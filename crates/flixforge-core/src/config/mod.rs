pub mod document;
pub mod presets;
pub mod store;

pub use document::*;
pub use presets::*;
pub use store::*;
