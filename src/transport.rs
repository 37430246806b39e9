//! Transport policies for the directory connection.
//!
//! A [`SocketFactory`](trait.SocketFactory.html) supplies the sockets and the TLS
//! connector used when connecting to the directory. There are two of them:
//! [`ValidatingSocketFactory`](struct.ValidatingSocketFactory.html), which
//! verifies the peer's certificate chain and hostname, and
//! [`TrustingSocketFactory`](struct.TrustingSocketFactory.html), which accepts
//! any certificate presented to it. The latter is meant for troubleshooting
//! only, and must be selected explicitly through
//! [`TransportPolicy::Trusting`](enum.TransportPolicy.html#variant.Trusting).
//!
//! The LDAP client only takes the factory's TLS connector and opens its own
//! sockets. The socket operations, `create_socket()` and `upgrade()`, are for
//! callers that manage the transport themselves; binding to a local address
//! before connecting is why `tokio` is a dependency.

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use log::{debug, warn};
use native_tls::{HandshakeError, TlsConnector, TlsStream};
use tokio::net::TcpSocket;
use tokio::runtime;

use crate::result::{CheckError, Result};

/// Trust decisions applied during the TLS handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrustSettings {
    /// Verify the certificate chain, including expiry, against the system roots.
    pub verify_chain: bool,
    /// Verify that the certificate matches the host name being connected to.
    pub verify_hostname: bool,
}

impl TrustSettings {
    /// Full validation.
    pub const VERIFY_ALL: TrustSettings = TrustSettings {
        verify_chain: true,
        verify_hostname: true,
    };

    /// No validation at all.
    pub const VERIFY_NONE: TrustSettings = TrustSettings {
        verify_chain: false,
        verify_hostname: false,
    };

    fn connector(self) -> Result<TlsConnector> {
        TlsConnector::builder()
            .danger_accept_invalid_certs(!self.verify_chain)
            .danger_accept_invalid_hostnames(!self.verify_hostname)
            .build()
            .map_err(CheckError::TransportInit)
    }
}

/// Source of sockets for a directory connection.
///
/// The connector returned by [`connector()`](#tymethod.connector) is what the
/// LDAP client uses for `ldaps://` and StartTLS connections. The socket
/// operations cover the remaining ways a generic connection layer obtains a
/// transport: a fresh plain socket, optionally bound to a local address, and
/// a TLS upgrade of a socket that's already connected.
pub trait SocketFactory {
    /// Short name of the policy, for diagnostics.
    fn name(&self) -> &'static str;

    /// Trust decisions made by this factory.
    fn trust(&self) -> TrustSettings;

    /// TLS connector configured with this factory's trust decisions.
    fn connector(&self) -> TlsConnector;

    /// Connect a plain socket to `host:port`.
    ///
    /// All addresses the host resolves to are tried in turn. If `local` is
    /// given, the socket is bound to that address before connecting.
    fn create_socket(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
    ) -> Result<TcpStream> {
        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            let attempt = match local {
                Some(local) => connect_from(addr, local),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    debug!("{}: connected to {}", self.name(), addr);
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("{}: connecting to {} failed: {}", self.name(), addr, e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("empty address list for: {}:{}", host, port),
                )
            })
            .into())
    }

    /// Run the TLS client handshake over an already connected socket.
    ///
    /// The returned stream owns `socket`, and closes it when dropped. To keep
    /// the plain transport open past the TLS session, upgrade a
    /// `try_clone()` of it.
    fn upgrade(&self, socket: TcpStream, host: &str) -> Result<TlsStream<TcpStream>> {
        match self.connector().connect(host, socket) {
            Ok(stream) => Ok(stream),
            Err(HandshakeError::Failure(e)) => Err(CheckError::Handshake(e)),
            Err(HandshakeError::WouldBlock(_)) => Err(CheckError::Io(io::Error::new(
                io::ErrorKind::WouldBlock,
                "TLS handshake interrupted on a non-blocking socket",
            ))),
        }
    }
}

// std can't bind a socket before connecting it, so the connect goes through
// tokio and the stream is handed back in blocking mode.
fn connect_from(addr: SocketAddr, local: SocketAddr) -> io::Result<TcpStream> {
    let rt = runtime::Builder::new_current_thread().enable_io().build()?;
    let stream = rt.block_on(async move {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.bind(local)?;
        socket.connect(addr).await?.into_std()
    })?;
    stream.set_nonblocking(false)?;
    Ok(stream)
}

/// Socket factory which fully validates the peer.
#[derive(Clone)]
pub struct ValidatingSocketFactory {
    connector: TlsConnector,
}

impl ValidatingSocketFactory {
    pub fn new() -> Result<Self> {
        Ok(ValidatingSocketFactory {
            connector: TrustSettings::VERIFY_ALL.connector()?,
        })
    }
}

impl SocketFactory for ValidatingSocketFactory {
    fn name(&self) -> &'static str {
        "validating"
    }

    fn trust(&self) -> TrustSettings {
        TrustSettings::VERIFY_ALL
    }

    fn connector(&self) -> TlsConnector {
        self.connector.clone()
    }
}

/// Socket factory which accepts any certificate.
///
/// Chain validation, expiry checks and hostname matching are all skipped:
/// self-signed, expired and mismatched certificates pass. Useful for
/// diagnosing a directory whose certificate is broken, never safe otherwise.
#[derive(Clone)]
pub struct TrustingSocketFactory {
    connector: TlsConnector,
}

impl TrustingSocketFactory {
    /// Build the factory.
    ///
    /// Logs a warning, once per factory, that certificate validation is off.
    pub fn new() -> Result<Self> {
        let connector = TrustSettings::VERIFY_NONE.connector()?;
        warn!(
            "using trusting transport policy: \
             peer certificates and host names are NOT verified"
        );
        Ok(TrustingSocketFactory { connector })
    }
}

impl SocketFactory for TrustingSocketFactory {
    fn name(&self) -> &'static str {
        "trusting"
    }

    fn trust(&self) -> TrustSettings {
        TrustSettings::VERIFY_NONE
    }

    fn connector(&self) -> TlsConnector {
        self.connector.clone()
    }
}

/// Selection of the transport policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransportPolicy {
    /// Verify the certificate chain and host name.
    #[default]
    Validating,
    /// Accept any certificate. Opt-in only.
    Trusting,
}

impl TransportPolicy {
    /// Build the socket factory for this policy.
    ///
    /// Fails if the TLS engine can't be initialized; there's no point in
    /// retrying that.
    pub fn socket_factory(self) -> Result<Box<dyn SocketFactory>> {
        Ok(match self {
            TransportPolicy::Validating => Box::new(ValidatingSocketFactory::new()?),
            TransportPolicy::Trusting => Box::new(TrustingSocketFactory::new()?),
        })
    }
}
