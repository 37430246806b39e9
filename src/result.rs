//! Error type and result alias.
//!
//! Every fallible operation in the crate returns [`Result`](type.Result.html).
//! The variants follow the stages of a run, so that the caller can tell a
//! rejected bind from a server that couldn't be reached without parsing
//! message text.

use std::io::{self, Write};
use std::result;

use ldap3::LdapError;
use thiserror::Error;

/// Type alias for the crate's results.
pub type Result<T> = result::Result<T, CheckError>;

/// Possible sources of failure in a run.
#[derive(Debug, Error)]
pub enum CheckError {
    /// Command line couldn't be parsed, e.g., fewer than three positional arguments.
    #[error("usage error: {0}")]
    Usage(#[from] clap::Error),

    /// The TLS engine for the transport policy couldn't be initialized.
    #[error("transport policy initialization failed: {0}")]
    TransportInit(#[source] native_tls::Error),

    /// TLS handshake on an upgraded socket failed.
    #[error("TLS handshake failed: {0}")]
    Handshake(#[source] native_tls::Error),

    /// Socket or output error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Connection to the directory couldn't be established.
    #[error("directory connection failed: {0}")]
    Connect(#[source] LdapError),

    /// Simple bind was rejected or couldn't be completed.
    #[error("authentication failed: {0}")]
    Bind(#[source] LdapError),

    /// Attribute read on the principal's entry failed.
    #[error("attribute query failed: {0}")]
    Query(#[source] LdapError),

    /// Unbind failed. Only ever logged.
    #[error("closing directory session failed: {0}")]
    Close(#[source] LdapError),
}

impl CheckError {
    /// Returns the LDAP result code carried by the error, if any.
    ///
    /// Only errors produced by a completed LDAP operation with a non-zero
    /// result code have one.
    pub fn result_code(&self) -> Option<u32> {
        match self {
            CheckError::Connect(e)
            | CheckError::Bind(e)
            | CheckError::Query(e)
            | CheckError::Close(e) => match e {
                LdapError::LdapResult { result } => Some(result.rc),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Write a fatal error to `out`, prefixed with the program name.
pub fn report_failure<W: Write>(out: &mut W, e: &CheckError) -> io::Result<()> {
    writeln!(out, "ldapcheck: {}", e)
}

#[cfg(test)]
mod tests {
    use super::*;

    use ldap3::LdapResult;

    fn rejected(rc: u32) -> LdapError {
        LdapError::LdapResult {
            result: LdapResult {
                rc,
                matched: String::new(),
                text: String::from("rejected"),
                refs: vec![],
                ctrls: vec![],
            },
        }
    }

    #[test]
    fn result_code_from_bind() {
        assert_eq!(CheckError::Bind(rejected(49)).result_code(), Some(49));
    }

    #[test]
    fn failure_report_names_stage_and_cause() {
        let mut out = vec![];
        report_failure(&mut out, &CheckError::Bind(rejected(49))).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("ldapcheck: authentication failed: "));
        assert!(out.contains("rejected"));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn no_result_code_for_transport() {
        let e = CheckError::Io(io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(e.result_code(), None);
        assert_eq!(CheckError::Connect(LdapError::EndOfStream).result_code(), None);
    }
}
