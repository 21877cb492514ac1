//! A dedicated error for all possible errors in DNS queries: I/O, DNS packet
//! unconsistencies, transaction and configuration failures, etc.
use std::io;
use std::str;

/// All error kinds surfaced by the resolver. Most are recoverable and only
/// shift the transaction engine's state; `Io` is the sole kind that aborts a
/// transaction outright (see `Resolver::result`).
#[derive(Debug)]
pub enum DNSError {
    /// host I/O or allocation failure; propagates immediately
    Io(io::Error),
    FromUtf8(std::string::FromUtf8Error),
    Utf8(str::Utf8Error),
    LoggerError(log::SetLoggerError),
    /// invalid server address or out-of-range index while configuring
    Config,
    /// unknown flag argument to `config`
    Flag,
    /// unknown toggle argument to `config`
    Toggle,
    /// query or parsed record used an unrecognized type
    Type,
    /// a record's class didn't match what the type requires (e.g. A/AAAA outside IN)
    Class,
    /// a bounds check against buffer end or maximum name/label length failed
    SizeLimitExceeded,
    /// unsupported wire construct (e.g. an extended label type)
    Parse,
    /// a response didn't correspond to any outstanding server/ID
    NsInvalid,
    /// TC flag was set; triggers TCP fallback, never surfaced to the caller
    Truncation,
    /// QR bit was not set on a response
    NotResponse,
    /// the echoed question section didn't match the outgoing query
    QuestionWrong,
    /// RCODE 3, NXDOMAIN - returned to the caller together with the result
    Name,
    /// RCODE 1, FORMERR
    Format,
    /// RCODE 2, SERVFAIL
    Server,
    /// RCODE 5, REFUSED
    Refused,
    /// RCODE 4 or 16 (NOTIMP / BADVERS)
    NotImplemented,
    /// deadline reached without a usable response
    Timeout,
    /// a timeout/deadline computation produced an impossible value
    Tv,
    /// the state machine cursor pointed outside the event script
    State,
    /// neither socket was available to multiplex on
    FdSet,
    /// `result()` was called with no outstanding `query()`
    NoQuery,
    DNS(String),
    DNSInternalError(InternalError),
}

#[derive(Debug)]
pub enum InternalError {
    DnsDomainNameTooLong,
    EmptyDomainName,
}

impl DNSError {
    // Helper function to create a new DNS error from a string
    pub fn new(s: &str) -> Self {
        DNSError::DNS(String::from(s))
    }
}

/// A specific custom `Result` for all functions
pub type DNSResult<T> = Result<T, DNSError>;

// All convertion for internal errors for DNSError
impl From<io::Error> for DNSError {
    fn from(err: io::Error) -> Self {
        if err.get_ref().map_or(false, |inner| inner.is::<WireError>()) {
            let boxed = err.into_inner().expect("checked Some above");
            return boxed
                .downcast::<WireError>()
                .expect("checked is::<WireError> above")
                .0;
        }

        DNSError::Io(err)
    }
}

/// Carries a `DNSError` through a call site whose signature is pinned to
/// `io::Result` (every `ToFromNetworkOrder::to_network_bytes` impl). Recovered
/// by `From<io::Error> for DNSError` via downcast, so the original variant
/// (`Format`, `SizeLimitExceeded`, ...) survives the trip instead of
/// collapsing to `DNSError::Io`.
#[derive(Debug)]
struct WireError(DNSError);

impl std::fmt::Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl std::error::Error for WireError {}

/// Wraps a `DNSError` inside an `io::Error` so it can cross a
/// `to_network_bytes`-shaped boundary without losing its variant.
pub(crate) fn wire_error(err: DNSError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, WireError(err))
}

impl From<String> for DNSError {
    fn from(err: String) -> Self {
        DNSError::DNS(err)
    }
}

impl From<std::string::FromUtf8Error> for DNSError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        DNSError::FromUtf8(err)
    }
}

impl From<str::Utf8Error> for DNSError {
    fn from(err: str::Utf8Error) -> Self {
        DNSError::Utf8(err)
    }
}

impl From<log::SetLoggerError> for DNSError {
    fn from(err: log::SetLoggerError) -> Self {
        DNSError::LoggerError(err)
    }
}
