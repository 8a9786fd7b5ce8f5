//! Request dispatch
//!
//! Maps a parsed request to a response using the static route table, a
//! source of file contents, and a credential check for the login form.

pub mod assets;
pub mod credentials;
pub mod dispatcher;
pub mod routes;

pub use assets::{AssetSource, FsAssets};
pub use credentials::{CredentialCheck, StaticCredentials};
pub use dispatcher::Dispatcher;
pub use routes::{Route, RouteTable};
