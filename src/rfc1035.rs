//! Base structures for DNS messages. See RFC 1035 and, for the OPT
//! pseudo-RR, RFC 6891.
//!
//! The DnsStruct procedural macro automatically implements
//! `ToFromNetworkOrder` field by field. The DnsEnum procedural macro
//! automatically implements `Default`, `FromStr`, `TryFrom<u8>` and
//! `TryFrom<u16>` for simple discriminant-backed enums; the
//! `ToFromNetworkOrder` impl for those enums comes from `derive_enum!`
//! instead (see `network_order::dns`), since the wire width isn't implied
//! by the Rust repr alone.
//!
//! Records own their data (names, strings, option bytes) rather than
//! borrowing from the receive buffer, so a decoded message's lifetime is
//! independent of the handle that produced it.
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::{DNSError, DNSResult, InternalError};
use crate::network_order::ToFromNetworkOrder;

use dns_derive::{DnsEnum, DnsStruct};

pub const MAX_DNS_PACKET_SIZE: usize = 65535;
pub const MAX_UDP_BASIC: u16 = 512;
pub const EDNS_UDP_PAYLOAD: u16 = 4096;
pub const EDNS_OPT_NSID: u16 = 3;

// DNS packet header: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
#[derive(Debug, Default, Clone, DnsStruct)]
pub struct DNSPacketHeader {
    pub id: u16, // A 16 bit identifier assigned by the program that
    //   generates any kind of query.  This identifier is copied
    //   the corresponding reply and can be used by the requester
    //   to match up replies to outstanding queries.
    pub flags: DNSPacketFlags,
    pub qd_count: u16, // an unsigned 16 bit integer specifying the number of
    //    entries in the question section.
    pub an_count: u16, // an unsigned 16 bit integer specifying the number of
    // resource records in the answer section.
    pub ns_count: u16, // an unsigned 16 bit integer specifying the number of name
    // server resource records in the authority records section.
    pub ar_count: u16, // an unsigned 16 bit integer specifying the number of
                       // resource records in the additional records section.
}

// Flags: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
//
// Packed on the wire into two bytes:
//
//      1  1  1  1  1  1
//  0  1  2  3  4  5  6  7  8  9  0  1  2  3  4  5
// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
// |QR|   Opcode  |AA|TC|RD|RA| Z|AD|CD|   RCODE   |
// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
//
// Z was reserved and must be zero by RFC 1035; RFC 4035/RFC 2535 reuse the
// two bits after it as AD (authentic data) and CD (checking disabled), so
// they're tracked as separate fields here rather than folded into Z.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DNSPacketFlags {
    pub packet_type: PacketType, // A one bit field that specifies whether this message is a query (0), or a response (1).
    pub op_code: OpCode,         // A four bit field that specifies kind of query in this
    //  message.  This value is set by the originator of a query
    //  and copied into the response.
    pub authorative_answer: bool, // Authoritative Answer - this bit is valid in responses,
    //and specifies that the responding name server is an
    //authority for the domain name in question section.
    pub truncated: bool, //    TrunCation - specifies that this message was truncated
    //    due to length greater than that permitted on the
    //    transmission channel.
    pub recursion_desired: bool, // Recursion Desired - this bit may be set in a query and
    // is copied into the response.
    pub recursion_available: bool, // Recursion Available - this bit is set or cleared in a
    //  response, and denotes whether recursive query support is
    //  available in the name server.
    pub z: bool,               // Reserved for future use.  Must be zero in all queries and responses.
    pub authentic_data: bool,  // RFC 4035: DNSSEC-authenticated data.
    pub checking_disabled: bool, // RFC 4035: disable DNSSEC validation.
    pub response_code: ResponseCode, // Response code - this 4 bit field is set as part of responses.
}

impl<'a> ToFromNetworkOrder<'a> for DNSPacketFlags {
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
        use byteorder::{BigEndian, WriteBytesExt};

        let flags: u16 = ((self.packet_type as u16) << 15)
            | ((self.op_code as u16) << 11)
            | ((self.authorative_answer as u16) << 10)
            | ((self.truncated as u16) << 9)
            | ((self.recursion_desired as u16) << 8)
            | ((self.recursion_available as u16) << 7)
            | ((self.z as u16) << 6)
            | ((self.authentic_data as u16) << 5)
            | ((self.checking_disabled as u16) << 4)
            | (self.response_code as u16 & 0b1111);

        buffer.write_u16::<BigEndian>(flags)?;
        Ok(2)
    }

    fn from_network_bytes(&mut self, buffer: &mut std::io::Cursor<&'a [u8]>) -> DNSResult<()> {
        use byteorder::{BigEndian, ReadBytesExt};

        let flags = buffer.read_u16::<BigEndian>()?;

        self.packet_type = PacketType::try_from(((flags >> 15) & 0b1) as u8)?;
        self.op_code = OpCode::try_from(((flags >> 11) & 0b1111) as u8)?;
        self.authorative_answer = (flags >> 10) & 0b1 == 1;
        self.truncated = (flags >> 9) & 0b1 == 1;
        self.recursion_desired = (flags >> 8) & 0b1 == 1;
        self.recursion_available = (flags >> 7) & 0b1 == 1;
        self.z = (flags >> 6) & 0b1 == 1;
        self.authentic_data = (flags >> 5) & 0b1 == 1;
        self.checking_disabled = (flags >> 4) & 0b1 == 1;
        self.response_code = ResponseCode::try_from(flags & 0b1111)?;

        Ok(())
    }
}

/// The flags' first bit is 0 or 1 meaning a question or a response. A
/// dedicated enum is clearer and type-safe than a bare bool.
#[derive(Debug, Clone, Copy, PartialEq, DnsEnum)]
#[repr(u8)]
pub enum PacketType {
    Query = 0,
    Response = 1,
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PacketType::Query => write!(f, "QUERY"),
            PacketType::Response => write!(f, "RESPONSE"),
        }
    }
}

// op codes: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5
#[derive(Debug, Clone, Copy, PartialEq, DnsEnum)]
#[repr(u8)]
pub enum OpCode {
    Query = 0,  //[RFC1035]
    IQuery = 1, // (Inverse Query, OBSOLETE)	[RFC3425]
    Status = 2, // [RFC1035]
    Unassigned = 3,
    Notify = 4, // [RFC1996]
    Update = 5, // [RFC2136]
    DOS = 6,    // DNS Stateful Operations (DSO)	[RFC8490]
                // 7-15 Unassigned
}

// response codes: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6
#[derive(Debug, Clone, Copy, PartialEq, DnsEnum)]
#[repr(u16)]
pub enum ResponseCode {
    NoError = 0,  // No Error	[RFC1035]
    FormErr = 1,  // Format Error	[RFC1035]
    ServFail = 2, // Server Failure	[RFC1035]
    NXDomain = 3, // Non-Existent Domain	[RFC1035]
    NotImp = 4,   // Not Implemented	[RFC1035]
    Refused = 5,  // Query Refused	[RFC1035]
    YXDomain = 6, // Name Exists when it should not	[RFC2136][RFC6672]
    YXRRSet = 7,  // RR Set Exists when it should not	[RFC2136]
    NXRRSet = 8,  // RR Set that should exist does not	[RFC2136]
    NotAuth = 9,  // Not Authorized	[RFC8945]
    NotZone = 10, // Name not contained in zone	[RFC2136]
    DSOTYPENI = 11, // DSO-TYPE Not Implemented	[RFC8490]
    BADVERS = 16, // Bad OPT Version	[RFC6891]
    BADKEY = 17,  // Key not recognized	[RFC8945]
    BADTIME = 18, // Signature out of time window	[RFC8945]
    BADMODE = 19, // Bad TKEY Mode	[RFC2930]
    BADNAME = 20, // Duplicate key name	[RFC2930]
    BADALG = 21,  // Algorithm not supported	[RFC2930]
    BADTRUNC = 22, // Bad Truncation	[RFC8945]
    BADCOOKIE = 23, // Bad/missing Server Cookie	[RFC7873]
}

// RR type codes: https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, DnsEnum)]
#[repr(u16)]
pub enum QType {
    A = 1,           // a host address	[RFC1035]
    NS = 2,          // an authoritative name server	[RFC1035]
    MD = 3,          // a mail destination (OBSOLETE - use MX)	[RFC1035]
    MF = 4,          // a mail forwarder (OBSOLETE - use MX)	[RFC1035]
    CNAME = 5,       // the canonical name for an alias	[RFC1035]
    SOA = 6,         // marks the start of a zone of authority	[RFC1035]
    MB = 7,          // a mailbox domain name (EXPERIMENTAL)	[RFC1035]
    MG = 8,          // a mail group member (EXPERIMENTAL)	[RFC1035]
    MR = 9,          // a mail rename domain name (EXPERIMENTAL)	[RFC1035]
    NULL = 10,       // a null RR (EXPERIMENTAL)	[RFC1035]
    WKS = 11,        // a well known service description	[RFC1035]
    PTR = 12,        // a domain name pointer	[RFC1035]
    HINFO = 13,      // host information	[RFC1035]
    MINFO = 14,      // mailbox or mail list information	[RFC1035]
    MX = 15,         // mail exchange	[RFC1035]
    TXT = 16,        // text strings	[RFC1035]
    RP = 17,         // for Responsible Person	[RFC1183]
    AFSDB = 18,      // for AFS Data Base location	[RFC1183][RFC5864]
    X25 = 19,        // for X.25 PSDN address	[RFC1183]
    ISDN = 20,       // for ISDN address	[RFC1183]
    RT = 21,         // for Route Through	[RFC1183]
    NSAP = 22,       // for NSAP address, NSAP style A record	[RFC1706]
    NSAPPTR = 23,    // for domain name pointer, NSAP style	[RFC1706]
    SIG = 24,        // for security signature	[RFC2536][RFC2931][RFC3110][RFC4034]
    KEY = 25,        // for security key	[RFC2536][RFC2539][RFC3110][RFC4034]
    PX = 26,         // X.400 mail mapping information	[RFC2163]
    GPOS = 27,       // Geographical Position	[RFC1712]
    AAAA = 28,       // IP6 Address	[RFC3596]
    LOC = 29,        // Location Information	[RFC1876]
    NXT = 30,        // Next Domain (OBSOLETE)	[RFC2535][RFC3755]
    EID = 31,
    NIMLOC = 32,
    SRV = 33,    // Server Selection	[1][RFC2782]
    ATMA = 34,
    NAPTR = 35, // Naming Authority Pointer	[RFC3403]
    KX = 36,    // Key Exchanger	[RFC2230]
    CERT = 37,  // CERT	[RFC4398]
    A6 = 38,    // A6 (OBSOLETE - use AAAA)	[RFC2874][RFC3226][RFC6563]
    DNAME = 39, // DNAME	[RFC6672]
    SINK = 40,
    OPT = 41,  // OPT	[RFC3225][RFC6891]
    APL = 42,  // APL	[RFC3123]
    DS = 43,   // Delegation Signer	[RFC4034]
    SSHFP = 44, // SSH Key Fingerprint	[RFC4255]
    IPSECKEY = 45, // IPSECKEY	[RFC4025]
    RRSIG = 46, // RRSIG	[RFC4034]
    NSEC = 47, // NSEC	[RFC4034][RFC9077]
    DNSKEY = 48, // DNSKEY	[RFC4034]
    DHCID = 49, // DHCID	[RFC4701]
    NSEC3 = 50, // NSEC3	[RFC5155][RFC9077]
    NSEC3PARAM = 51, // NSEC3PARAM	[RFC5155]
    TLSA = 52, // TLSA	[RFC6698]
    SMIMEA = 53,
    Unassigned = 54,
    HIP = 55,
    NINFO = 56,
    RKEY = 57,
    TALINK = 58,
    CDS = 59,
    CDNSKEY = 60,
    OPENPGPKEY = 61,
    CSYNC = 62,
    ZONEMD = 63,
    SVCB = 64,
    HTTPS = 65,
    SPF = 99, // [RFC7208]
    UINFO = 100,
    UID = 101,
    GID = 102,
    UNSPEC = 103,
    NID = 104,
    L32 = 105,
    L64 = 106,
    LP = 107,
    EUI48 = 108,
    EUI64 = 109,
    TKEY = 249,  // Transaction Key	[RFC2930]
    TSIG = 250,  // Transaction Signature	[RFC8945]
    IXFR = 251,  // incremental transfer	[RFC1995]
    AXFR = 252,  // transfer of an entire zone	[RFC1035][RFC5936]
    MAILB = 253, // mailbox-related RRs (MB, MG or MR)	[RFC1035]
    MAILA = 254, // mail agent RRs (OBSOLETE - see MX)	[RFC1035]
    ANY = 255,   // A request for some or all records the server has available
    URI = 256,
    CAA = 257, // Certification Authority Restriction	[RFC8659]
    AVC = 258,
    DOA = 259,
    AMTRELAY = 260,
    TA = 32768,  // DNSSEC Trust Authorities
    DLV = 32769, // DNSSEC Lookaside Validation (OBSOLETE)
}

// RR Class values: https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.4
#[derive(Debug, Copy, Clone, PartialEq, Eq, DnsEnum)]
#[repr(u16)]
pub enum QClass {
    IN = 1, // the Internet
    CS = 2, // the CSNET class (Obsolete - used only for examples in some obsolete RFCs)
    CH = 3, // the CHAOS class
    HS = 4, // Hesiod [Dyer 87]
    ANY = 255,
}

// Character string as described in: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
/// ```
/// use dnslib::rfc1035::CharacterString;
///
/// let cs = CharacterString::from("www");
/// assert_eq!(cs.to_string(), "www");
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CharacterString(pub String);

impl From<&str> for CharacterString {
    fn from(s: &str) -> Self {
        CharacterString(s.to_string())
    }
}

impl fmt::Display for CharacterString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Domain name: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
//
// Kept as a flat dotted string rather than a `Vec` of individually-owned
// labels: the wire codec (network_order::dns) only ever needs to walk it
// label-by-label on encode, and a flat `String` is simpler to build,
// compare and hand back to callers without borrowing from the receive
// buffer. The root name is the empty string.
/// ```
/// use dnslib::rfc1035::DomainName;
///
/// let dn = DomainName::try_from("www.google.com").unwrap();
/// assert_eq!(dn.to_string(), "www.google.com");
///
/// let dn = DomainName::try_from("www.google.ie.").unwrap();
/// assert_eq!(dn.to_string(), "www.google.ie");
///
/// let dn = DomainName::try_from(".").unwrap();
/// assert_eq!(dn.to_string(), ".");
///
/// assert!(DomainName::try_from("").is_err());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct DomainName(pub String);

impl TryFrom<&str> for DomainName {
    type Error = DNSError;

    fn try_from(domain: &str) -> Result<Self, Self::Error> {
        if domain.is_empty() {
            return Err(DNSError::DNSInternalError(InternalError::EmptyDomainName));
        }

        if domain == "." {
            return Ok(DomainName(String::new()));
        }

        let trimmed = domain.strip_suffix('.').unwrap_or(domain);
        Ok(DomainName(trimmed.to_string()))
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, ".")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl DomainName {
    pub fn labels(&self) -> Vec<&str> {
        if self.0.is_empty() {
            Vec::new()
        } else {
            self.0.split('.').collect()
        }
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Builds the wire-format label sequence (length-prefixed labels plus
    /// the terminating zero octet), validating against RFC 1035 §3.1's
    /// per-label and whole-name length limits. Kept as a `DNSResult`-returning
    /// helper, separate from `ToFromNetworkOrder::to_network_bytes`, so an
    /// empty label or an oversized name surfaces as `DNSError::Format`/
    /// `DNSError::SizeLimitExceeded` instead of collapsing to a generic
    /// `io::Error` once it crosses that trait's `io::Result` boundary.
    pub fn encode_labels(&self) -> DNSResult<Vec<u8>> {
        let mut encoded = Vec::new();
        let mut length = 0usize;

        for label in self.labels() {
            if label.is_empty() {
                return Err(DNSError::Format);
            }
            if label.len() > 63 {
                return Err(DNSError::SizeLimitExceeded);
            }

            encoded.push(label.len() as u8);
            encoded.extend_from_slice(label.as_bytes());
            length += label.len() + 1;
        }

        if length > 255 {
            return Err(DNSError::SizeLimitExceeded);
        }

        // sentinel terminating the label sequence
        encoded.push(0);
        Ok(encoded)
    }
}

//--------------------------------------------------------------------------------
// Question structure: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
//--------------------------------------------------------------------------------
#[derive(Debug, Default, Clone, DnsStruct)]
pub struct DNSQuestion {
    pub name: DomainName,
    pub r#type: QType,
    pub class: QClass,
}

impl DNSQuestion {
    /// Create a new question. By default, the IN class is used if None is
    /// provided as the qclass parameter.
    pub fn new(domain: &str, qtype: QType, qclass: Option<QClass>) -> DNSResult<Self> {
        let dn = DomainName::try_from(domain)?;
        Ok(DNSQuestion {
            name: dn,
            r#type: qtype,
            class: qclass.unwrap_or(QClass::IN),
        })
    }
}

// Default for QType, QClass, PacketType, OpCode and ResponseCode comes
// from their `#[derive(DnsEnum)]` (first variant), not a manual impl here.

//------------------------------------------------------------------------
// Resource record: a tagged sum, one variant per RDATA shape. The
// original C overlays every RDATA shape through a type-indexed union of
// structs; a Rust enum expresses the same "exactly one of these shapes,
// chosen by rtype" relationship without unsafe reinterpretation.
//------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq)]
pub struct EdnsOption {
    pub code: u16,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RData {
    /// CNAME, NS, PTR, MB, MD, MF, MG, MR — all a single name.
    Name(DomainName),
    Mx {
        preference: u16,
        exchange: DomainName,
    },
    Soa {
        mname: DomainName,
        rname: DomainName,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Hinfo {
        cpu: CharacterString,
        os: CharacterString,
    },
    Txt(Vec<CharacterString>),
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Srv {
        priority: u16,
        weight: u16,
        port: u16,
        target: DomainName,
    },
    Opt {
        udp_payload_size: u16,
        extended_rcode: u8,
        version: u8,
        flags: u16,
        options: Vec<EdnsOption>,
    },
    /// Any other type, including NULL: opaque bytes, preserved verbatim.
    Unknown { type_code: u16, data: Vec<u8> },
}

impl RData {
    /// The name this RDATA references in another record, if any. Used by
    /// the additional-section joiner to match glue A/AAAA records back to
    /// the answer/authority record that asked for them.
    pub fn referenced_name(&self) -> Option<&DomainName> {
        match self {
            RData::Name(name) => Some(name),
            RData::Mx { exchange, .. } => Some(exchange),
            RData::Soa { mname, .. } => Some(mname),
            RData::Srv { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// One fully parsed resource record: owner name, type/class/ttl (class and
/// ttl are reinterpreted for OPT per RFC 6891), and the decoded RDATA.
/// `rtype`/`rclass` are kept as raw wire values rather than strict
/// `QType`/`QClass` so an unassigned or unrecognized code doesn't abort
/// the parse; `qtype()`/`qclass()` give the checked conversion when it's
/// needed. `ip_joins` is populated after parsing by the additional-section
/// joiner.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub name: DomainName,
    pub rtype: u16,
    pub rclass: u16,
    pub ttl: u32,
    pub rdata: RData,
    pub ip_joins: Vec<std::net::IpAddr>,
}

impl ResourceRecord {
    pub fn qtype(&self) -> Option<QType> {
        QType::try_from(self.rtype).ok()
    }

    pub fn qclass(&self) -> Option<QClass> {
        QClass::try_from(self.rclass).ok()
    }

    pub fn is_opt(&self) -> bool {
        self.rtype == QType::OPT as u16
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = self
            .qtype()
            .map(|t| format!("{:?}", t))
            .unwrap_or_else(|| self.rtype.to_string());

        write!(
            f,
            "{} {} CLASS={} TTL={} {:?}",
            self.name, type_name, self.rclass, self.ttl, self.rdata
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_name_strips_trailing_dot() {
        let dn = DomainName::try_from("example.com.").unwrap();
        assert_eq!(dn.0, "example.com");
        assert_eq!(dn.labels(), vec!["example", "com"]);
    }

    #[test]
    fn domain_name_root() {
        let dn = DomainName::try_from(".").unwrap();
        assert!(dn.is_root());
        assert!(dn.labels().is_empty());
        assert_eq!(dn.to_string(), ".");
    }

    #[test]
    fn domain_name_rejects_empty() {
        assert!(DomainName::try_from("").is_err());
    }

    #[test]
    fn question_defaults_to_in_class() {
        let q = DNSQuestion::new("example.com", QType::A, None).unwrap();
        assert_eq!(q.class, QClass::IN);
        assert_eq!(q.name.0, "example.com");
    }

    #[test]
    fn referenced_name_for_mx() {
        let rdata = RData::Mx {
            preference: 10,
            exchange: DomainName::try_from("mail.example.com").unwrap(),
        };
        assert_eq!(
            rdata.referenced_name(),
            Some(&DomainName::try_from("mail.example.com").unwrap())
        );
    }

    #[test]
    fn referenced_name_none_for_a() {
        let rdata = RData::A(Ipv4Addr::new(93, 184, 216, 34));
        assert_eq!(rdata.referenced_name(), None);
    }

    #[test]
    fn flags_round_trip() {
        use crate::network_order::ToFromNetworkOrder;
        use std::io::Cursor;

        let flags = DNSPacketFlags {
            packet_type: PacketType::Response,
            op_code: OpCode::Query,
            authorative_answer: false,
            truncated: false,
            recursion_desired: true,
            recursion_available: true,
            z: false,
            authentic_data: true,
            checking_disabled: false,
            response_code: ResponseCode::NoError,
        };

        let mut buffer = Vec::new();
        flags.to_network_bytes(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let mut decoded = DNSPacketFlags::default();
        decoded.from_network_bytes(&mut cursor).unwrap();

        assert_eq!(decoded, flags);
    }
}
