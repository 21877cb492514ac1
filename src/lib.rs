//! A stub DNS resolver: builds and sends queries over UDP (falling back
//! to TCP on truncation), validates and parses replies, and retries
//! across a small, bounded set of configured name servers.
//!
//! Layering mirrors RFC 1035's own separation: `rfc1035` holds the wire
//! types, `network_order` their byte-level codec, `response` the full
//! message encode/decode plus record-level post-processing (MX ordering,
//! additional-section glue), `nameserver` the server list and its
//! per-server EDNS state, and `transaction` the resolver handle that
//! ties a query to a retry schedule and a result.
#[macro_use]
pub mod macros;

pub mod error;
pub mod nameserver;
pub mod network_order;
pub mod response;
pub mod rfc1035;
pub mod transaction;
pub mod util;

pub use error::{DNSError, DNSResult};
pub use nameserver::{EdnsState, NameServerEntry, NameServers};
pub use rfc1035::{QClass, QType};
pub use transaction::{ConfigFlag, DnsResult, Resolver, Toggle};
