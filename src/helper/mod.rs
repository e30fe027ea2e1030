mod cache;
mod dispatcher;
mod protocol;
mod server;
mod service;

pub use cache::Cache;
pub use dispatcher::Dispatcher;
pub use protocol::Improvement;
pub use protocol::Request;
pub use protocol::Response;
pub use protocol::Scored;
pub use protocol::Strategy;
pub use server::run;
pub use service::Service;
