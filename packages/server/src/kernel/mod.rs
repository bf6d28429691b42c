//! Kernel module - collaborator traits and server dependencies.

pub mod deps;
pub mod http_sink;
pub mod test_dependencies;
pub mod traits;

pub use deps::{build_contract_manager, build_server_deps, ServerDeps};
pub use http_sink::HttpSignatureEventSink;
pub use test_dependencies::TestDependencies;
pub use traits::*;
