//! Playbook model: parsed, validated representation of an audit playbook.

pub mod parser;
pub mod types;

pub use parser::{load_playbook, parse_playbook, validate_playbook};
pub use types::{ApiCall, ApiSpec, Playbook, PlaybookConfig};
