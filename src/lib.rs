//! Check LDAP credentials with a simple bind.
//!
//! The crate connects to a directory, authenticates with a bind DN and
//! password, and optionally prints attributes of the bound entry. The
//! connection's TLS trust decisions come from a pluggable
//! [`SocketFactory`](transport/trait.SocketFactory.html); the trusting variant,
//! which accepts any server certificate, must be chosen explicitly.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ldapcheck::{run, ConnectionParams, Credential, LdapDirectory, RunOptions};
//!
//! # fn main() -> ldapcheck::result::Result<()> {
//! let params = ConnectionParams {
//!     url: String::from("ldaps://ldap.example.com"),
//!     principal: String::from("uid=babs,ou=People,dc=example,dc=com"),
//!     credential: Credential::new("secret"),
//!     attributes: vec![String::from("mail")],
//! };
//! run(&params, &RunOptions::default(), &LdapDirectory, &mut std::io::stdout())?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod directory;
mod params;
pub mod result;
mod session;
pub mod transport;

pub use directory::{AttributeSet, Directory, DirectorySession, LdapDirectory};
pub use params::{ConnectionParams, Credential, EchoPolicy};
pub use session::{print_attributes, run, RunOptions, SessionGuard};
pub use transport::{SocketFactory, TransportPolicy};
