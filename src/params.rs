use std::fmt;
use std::io::Write;

use log::warn;

/// Secret half of the bind credentials.
///
/// Neither `Debug` nor `Display` reveal the secret; it can only be retrieved
/// with [`expose()`](#method.expose).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Credential(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<String> for Credential {
    fn from(secret: String) -> Self {
        Credential(secret)
    }
}

const MASK: &str = "********";

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Credential({})", MASK)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(MASK)
    }
}

/// How the credential is shown when the parameters are echoed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EchoPolicy {
    /// Print a mask and a hint on how to reveal the value.
    #[default]
    Redact,
    /// Print the credential in clear text.
    Reveal,
}

/// Parameters of one connection attempt.
#[derive(Clone, Debug)]
pub struct ConnectionParams {
    /// Directory URL, passed to the LDAP client unchanged.
    pub url: String,
    /// Bind DN, also used as the name of the entry whose attributes are read.
    pub principal: String,
    pub credential: Credential,
    /// Attributes to read after a successful bind, in output order.
    pub attributes: Vec<String>,
}

impl ConnectionParams {
    /// Write the parameters, one per line, to `out`.
    pub fn echo<W: Write>(&self, out: &mut W, policy: EchoPolicy) -> std::io::Result<()> {
        writeln!(out, "url = {}", self.url)?;
        writeln!(out, "principal = {}", self.principal)?;
        match policy {
            EchoPolicy::Redact => writeln!(
                out,
                "password = {} (hidden, use --show-password to display)",
                self.credential
            )?,
            EchoPolicy::Reveal => {
                warn!("echoing the password in clear text");
                writeln!(out, "password = {}", self.credential.expose())?
            }
        }
        writeln!(out, "attributeNames = [{}]", self.attributes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(attributes: &[&str]) -> ConnectionParams {
        ConnectionParams {
            url: String::from("ldaps://ldap.example.com"),
            principal: String::from("uid=babs,ou=People,dc=example,dc=com"),
            credential: Credential::new("s3cret"),
            attributes: attributes.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn echoed(p: &ConnectionParams, policy: EchoPolicy) -> String {
        let mut out = vec![];
        p.echo(&mut out, policy).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn echo_order_and_redaction() {
        let out = echoed(&params(&["mail", "cn"]), EchoPolicy::default());
        assert_eq!(
            out,
            "url = ldaps://ldap.example.com\n\
             principal = uid=babs,ou=People,dc=example,dc=com\n\
             password = ******** (hidden, use --show-password to display)\n\
             attributeNames = [mail, cn]\n"
        );
        assert!(!out.contains("s3cret"));
    }

    #[test]
    fn echo_reveal() {
        let out = echoed(&params(&[]), EchoPolicy::Reveal);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[2], "password = s3cret");
        assert_eq!(lines[3], "attributeNames = []");
    }

    #[test]
    fn credential_never_formatted() {
        let c = Credential::new("s3cret");
        assert_eq!(format!("{}", c), MASK);
        assert!(!format!("{:?}", params(&[])).contains("s3cret"));
        assert_eq!(c.expose(), "s3cret");
    }
}
