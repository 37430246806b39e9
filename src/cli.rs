//! Command line parsing.

use std::ffi::OsString;

use clap::Parser;

use crate::params::{ConnectionParams, Credential, EchoPolicy};
use crate::result::Result;
use crate::session::RunOptions;
use crate::transport::TransportPolicy;

/// Authenticate against an LDAP directory with a simple bind and print
/// attributes of the bound entry.
#[derive(Debug, Parser)]
#[command(name = "ldapcheck", version, about, long_about = None)]
pub struct Cli {
    /// Directory URL, e.g. ldaps://ldap.example.com:636
    pub url: String,

    /// Bind DN; its entry is also the one queried for attributes
    pub principal: String,

    /// Bind password
    pub password: Credential,

    /// Attributes to print after a successful bind
    #[arg(value_name = "ATTRIBUTE")]
    pub attributes: Vec<String>,

    /// Don't verify the server certificate chain or host name (troubleshooting only)
    #[arg(long)]
    pub no_tls_verify: bool,

    /// Upgrade a plain ldap:// connection with StartTLS before binding
    #[arg(long)]
    pub starttls: bool,

    /// Echo the password in clear text
    #[arg(long)]
    pub show_password: bool,

    /// Log at debug level
    #[arg(short, long)]
    pub debug: bool,
}

impl Cli {
    /// Split the parsed command line into connection parameters and run options.
    pub fn into_parts(self) -> (ConnectionParams, RunOptions) {
        let options = RunOptions {
            transport: if self.no_tls_verify {
                TransportPolicy::Trusting
            } else {
                TransportPolicy::Validating
            },
            starttls: self.starttls,
            echo: if self.show_password {
                EchoPolicy::Reveal
            } else {
                EchoPolicy::Redact
            },
        };
        let params = ConnectionParams {
            url: self.url,
            principal: self.principal,
            credential: self.password,
            attributes: self.attributes,
        };
        (params, options)
    }
}

/// Parse a full argument list, program name first.
pub fn parse_args<I, T>(args: I) -> Result<Cli>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Ok(Cli::try_parse_from(args)?)
}
