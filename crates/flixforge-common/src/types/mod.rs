pub mod encoder;
pub mod options;
pub mod profile;
pub mod status;
pub mod track;
pub mod video;

pub use encoder::*;
pub use options::{NamedOptions, OptionError, OptionValue};
pub use profile::*;
pub use status::*;
pub use track::*;
pub use video::*;
