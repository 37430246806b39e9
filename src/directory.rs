//! Seam between the session runner and the LDAP client.
//!
//! The runner only sees the [`Directory`](trait.Directory.html) and
//! [`DirectorySession`](trait.DirectorySession.html) traits. The production
//! implementation, [`LdapDirectory`](struct.LdapDirectory.html), drives the
//! synchronous `ldap3` connection.

use std::collections::HashMap;

use ldap3::{LdapConn, LdapConnSettings, LdapError, Scope, SearchEntry};
use log::debug;

use crate::params::Credential;
use crate::result::{CheckError, Result};
use crate::transport::SocketFactory;

/// Result codes which mean the principal doesn't name a readable entry.
const NO_SUCH_OBJECT: u32 = 32;
const INVALID_DN_SYNTAX: u32 = 34;

/// Everything needed to open a connection.
pub struct ConnectConfig<'a> {
    pub url: &'a str,
    /// Issue StartTLS on a plain connection before any other operation.
    pub starttls: bool,
    pub socket_factory: &'a dyn SocketFactory,
}

/// Attributes returned for an entry.
///
/// Lookups are case-insensitive, like LDAP attribute descriptions. Values
/// keep the order in which the server sent them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeSet {
    attrs: HashMap<String, Vec<String>>,
}

impl AttributeSet {
    pub fn new() -> Self {
        AttributeSet::default()
    }

    /// Add values for `name`, after any already present.
    pub fn insert<S: AsRef<str>>(&mut self, name: S, values: Vec<String>) {
        self.attrs
            .entry(name.as_ref().to_ascii_lowercase())
            .or_default()
            .extend(values);
    }

    /// Values of `name`, if the server returned the attribute.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.attrs
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Collect the attributes of a search entry. Binary values are rendered
    /// as lowercase hex.
    pub fn from_entry(entry: SearchEntry) -> Self {
        let mut set = AttributeSet::new();
        for (name, values) in entry.attrs {
            set.insert(name, values);
        }
        for (name, values) in entry.bin_attrs {
            set.insert(name, values.iter().map(hex::encode).collect());
        }
        set
    }
}

impl<S: AsRef<str>> FromIterator<(S, Vec<String>)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (S, Vec<String>)>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for (name, values) in iter {
            set.insert(name, values);
        }
        set
    }
}

/// Factory for directory sessions.
pub trait Directory {
    type Session: DirectorySession;

    /// Open a connection. No authentication takes place yet.
    fn connect(&self, config: &ConnectConfig<'_>) -> Result<Self::Session>;
}

/// One open directory connection.
pub trait DirectorySession {
    /// Authenticate with a simple bind. Any error, including a non-zero
    /// result code, means the credentials weren't accepted.
    fn simple_bind(&mut self, principal: &str, credential: &Credential) -> Result<()>;

    /// Read `names` from the single entry `entry`.
    fn read_attributes(&mut self, entry: &str, names: &[String]) -> Result<AttributeSet>;

    /// Release the connection.
    fn close(&mut self) -> Result<()>;
}

/// Directory backed by `ldap3`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LdapDirectory;

impl Directory for LdapDirectory {
    type Session = LdapSession;

    fn connect(&self, config: &ConnectConfig<'_>) -> Result<LdapSession> {
        debug!(
            "connecting to {} with {} transport policy, starttls={}",
            config.url,
            config.socket_factory.name(),
            config.starttls
        );
        let settings = LdapConnSettings::new()
            .set_starttls(config.starttls)
            .set_connector(config.socket_factory.connector());
        let conn = LdapConn::with_settings(settings, config.url).map_err(CheckError::Connect)?;
        Ok(LdapSession { conn })
    }
}

pub struct LdapSession {
    conn: LdapConn,
}

impl DirectorySession for LdapSession {
    fn simple_bind(&mut self, principal: &str, credential: &Credential) -> Result<()> {
        let res = self
            .conn
            .simple_bind(principal, credential.expose())
            .and_then(|res| res.success())
            .map_err(CheckError::Bind)?;
        debug!("bind result: {}", res);
        Ok(())
    }

    fn read_attributes(&mut self, entry: &str, names: &[String]) -> Result<AttributeSet> {
        let res = self
            .conn
            .search(entry, Scope::Base, "(objectClass=*)", names)
            .and_then(|res| res.success());
        match res {
            Ok((entries, _res)) => Ok(entries
                .into_iter()
                .map(SearchEntry::construct)
                .fold(AttributeSet::new(), |mut set, entry| {
                    for (name, values) in AttributeSet::from_entry(entry).attrs {
                        set.insert(name, values);
                    }
                    set
                })),
            Err(LdapError::LdapResult { result })
                if result.rc == NO_SUCH_OBJECT || result.rc == INVALID_DN_SYNTAX =>
            {
                debug!("no readable entry named \"{}\": {}", entry, result);
                Ok(AttributeSet::new())
            }
            Err(e) => Err(CheckError::Query(e)),
        }
    }

    fn close(&mut self) -> Result<()> {
        self.conn.unbind().map_err(CheckError::Close)
    }
}
