pub mod archive;
pub mod codec;
pub mod extractor;
pub mod session;

pub use crate::domain::model::{ContainerPath, ExtractReport, PullMode};
pub use crate::domain::ports::{AutomationClient, Storage};
pub use crate::utils::error::Result;
