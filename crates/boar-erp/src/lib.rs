pub mod gateway;
pub mod modules;
pub mod xmlrpc;

pub use gateway::ErpGateway;
pub use modules::OPTIONAL_MODULES;
