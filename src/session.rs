//! One authentication attempt, start to finish.
//!
//! [`run()`](fn.run.html) echoes the parameters, connects with the selected
//! transport policy, binds, optionally reads the principal's own attributes,
//! and closes the connection on every path out.

use std::io::Write;
use std::ops::{Deref, DerefMut};

use log::{error, warn};
use url::Url;

use crate::directory::{AttributeSet, ConnectConfig, Directory, DirectorySession};
use crate::params::{ConnectionParams, EchoPolicy};
use crate::result::Result;
use crate::transport::TransportPolicy;

/// Opt-in switches for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub transport: TransportPolicy,
    pub starttls: bool,
    pub echo: EchoPolicy,
}

/// Owner of an open session which closes it when dropped.
///
/// A failure to close is logged and otherwise ignored, so it can't mask the
/// error that caused the guard to be dropped early.
pub struct SessionGuard<S: DirectorySession> {
    session: S,
}

impl<S: DirectorySession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        SessionGuard { session }
    }
}

impl<S: DirectorySession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: DirectorySession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: DirectorySession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.session.close() {
            error!("{}", e);
        }
    }
}

/// Authenticate, print the requested attributes, and close the session.
///
/// Output goes to `out`. A bind without error is the only success signal.
pub fn run<D, W>(
    params: &ConnectionParams,
    options: &RunOptions,
    directory: &D,
    out: &mut W,
) -> Result<()>
where
    D: Directory,
    W: Write,
{
    params.echo(out, options.echo)?;
    let factory = options.transport.socket_factory()?;
    if options.transport == TransportPolicy::Trusting
        && !options.starttls
        && is_plain_ldap(&params.url)
    {
        warn!(
            "{} is not a TLS URL and StartTLS is off, the transport policy has no effect",
            params.url
        );
    }
    let config = ConnectConfig {
        url: &params.url,
        starttls: options.starttls,
        socket_factory: factory.as_ref(),
    };
    let mut session = SessionGuard::new(directory.connect(&config)?);
    session.simple_bind(&params.principal, &params.credential)?;
    writeln!(out, "Successfully authenticated.")?;
    if !params.attributes.is_empty() {
        let attrs = session.read_attributes(&params.principal, &params.attributes)?;
        print_attributes(out, &params.attributes, &attrs)?;
    }
    Ok(())
}

fn is_plain_ldap(url: &str) -> bool {
    Url::parse(url).map(|u| u.scheme() == "ldap").unwrap_or(false)
}

/// Print each requested attribute the server returned values for.
pub fn print_attributes<W: Write>(
    out: &mut W,
    names: &[String],
    attrs: &AttributeSet,
) -> std::io::Result<()> {
    for name in names {
        match attrs.get(name) {
            Some(values) if !values.is_empty() => {
                writeln!(out, "{}", name)?;
                for value in values {
                    writeln!(out, "    {}", value)?;
                }
            }
            _ => (),
        }
    }
    Ok(())
}
