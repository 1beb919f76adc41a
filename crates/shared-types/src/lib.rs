pub mod error;
pub mod settings;

// Discovery pipeline domain modules
pub mod case;
pub mod coverage;
pub mod discovery;
pub mod document;
pub mod flags;
pub mod party;
pub mod profile;
pub mod submission;

pub use error::*;
pub use settings::*;

pub use case::*;
pub use coverage::*;
pub use discovery::*;
pub use document::*;
pub use flags::*;
pub use party::*;
pub use profile::*;
pub use submission::*;
