//! Decoding and encoding of full DNS messages: the question section for
//! outbound queries, and the answer/authority/additional sections of a
//! response, including the RDATA shapes listed in RFC 1035 §3.3 plus the
//! OPT pseudo-RR of RFC 6891.
//!
//! A resource record's RDATA shape depends on its TYPE and RDLENGTH
//! fields, known only once those two fields have themselves been decoded
//! — so, unlike the other wire structures in this crate, `ResourceRecord`
//! is decoded through a dedicated function rather than through
//! `#[derive(DnsStruct)]`/`ToFromNetworkOrder`.
use std::cmp::Ordering;
use std::io::{self, Cursor, Read};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{DNSError, DNSResult};
use crate::network_order::ToFromNetworkOrder;
use crate::rfc1035::{
    CharacterString, DNSPacketHeader, DNSQuestion, DomainName, EdnsOption, PacketType, QClass,
    QType, RData, ResourceRecord, EDNS_OPT_NSID, EDNS_UDP_PAYLOAD,
};

/// A full DNS message: header, question section, and (for responses) the
/// three record sections. Outbound queries only ever populate `header`
/// and `questions`; `to_network_bytes` only ever serializes those two
/// (the OPT pseudo-RR, when present, is appended separately by the
/// transaction engine as an extra "additional" record before encoding).
#[derive(Debug, Clone, Default)]
pub struct DNSMessage {
    pub header: DNSPacketHeader,
    pub questions: Vec<DNSQuestion>,
    pub answers: Vec<ResourceRecord>,
    pub authorities: Vec<ResourceRecord>,
    pub additionals: Vec<ResourceRecord>,
}

impl DNSMessage {
    /// Build a freshly-initialized query for a single question. The
    /// caller sets the id via `header.id` (the transaction engine assigns
    /// it, rather than this constructor, so the same id can be reused
    /// across UDP retries).
    pub fn new_query(question: DNSQuestion) -> Self {
        let mut header = DNSPacketHeader::default();
        header.flags.packet_type = PacketType::Query;
        header.flags.recursion_desired = true;
        header.qd_count = 1;

        DNSMessage {
            header,
            questions: vec![question],
            answers: Vec::new(),
            authorities: Vec::new(),
            additionals: Vec::new(),
        }
    }

    /// Serializes the header and question section; used to build the
    /// bytes sent on the wire for a query.
    pub fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> io::Result<usize> {
        let mut length = self.header.to_network_bytes(buffer)?;

        for question in &self.questions {
            length += question.to_network_bytes(buffer)?;
        }

        for additional in &self.additionals {
            length += additional.to_network_bytes(buffer)?;
        }

        Ok(length)
    }

    /// Decodes a complete message received from a name server: the header,
    /// then exactly as many questions/answers/authorities/additionals as
    /// the header's count fields claim.
    pub fn from_network_bytes<'a>(buffer: &mut Cursor<&'a [u8]>) -> DNSResult<Self> {
        let mut header = DNSPacketHeader::default();
        header.from_network_bytes(buffer)?;

        let mut questions = Vec::with_capacity(header.qd_count as usize);
        for _ in 0..header.qd_count {
            let mut question = DNSQuestion::default();
            question.from_network_bytes(buffer)?;
            questions.push(question);
        }

        let mut answers = Vec::with_capacity(header.an_count as usize);
        for _ in 0..header.an_count {
            answers.push(ResourceRecord::from_network_bytes(buffer)?);
        }

        let mut authorities = Vec::with_capacity(header.ns_count as usize);
        for _ in 0..header.ns_count {
            authorities.push(ResourceRecord::from_network_bytes(buffer)?);
        }

        let mut additionals = Vec::with_capacity(header.ar_count as usize);
        for _ in 0..header.ar_count {
            additionals.push(ResourceRecord::from_network_bytes(buffer)?);
        }

        Ok(DNSMessage {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }
}

impl ResourceRecord {
    pub fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> io::Result<usize> {
        let mut length = self.name.to_network_bytes(buffer)?;

        buffer.write_u16::<BigEndian>(self.rtype)?;
        length += 2;
        buffer.write_u16::<BigEndian>(self.rclass)?;
        length += 2;
        buffer.write_u32::<BigEndian>(self.ttl)?;
        length += 4;

        let mut rdata = Vec::new();
        encode_rdata(&self.rdata, &mut rdata)?;

        buffer.write_u16::<BigEndian>(rdata.len() as u16)?;
        length += 2;
        buffer.extend_from_slice(&rdata);
        length += rdata.len();

        Ok(length)
    }

    /// Decodes one resource record: owner name, type/class/ttl, then
    /// RDATA dispatched on `rtype`. OPT records reinterpret `rclass` as
    /// the requestor's UDP payload size and `ttl` as the extended RCODE,
    /// version and flags (RFC 6891 §4.6/§6.1.3).
    pub fn from_network_bytes<'a>(buffer: &mut Cursor<&'a [u8]>) -> DNSResult<Self> {
        let mut name = DomainName::default();
        name.from_network_bytes(buffer)?;

        let rtype = buffer.read_u16::<BigEndian>()?;
        let rclass = buffer.read_u16::<BigEndian>()?;
        let ttl = buffer.read_u32::<BigEndian>()?;
        let rd_length = buffer.read_u16::<BigEndian>()?;

        let rdata_start = buffer.position();
        let rdata_end = rdata_start + rd_length as u64;

        if rdata_end > buffer.get_ref().len() as u64 {
            return Err(DNSError::SizeLimitExceeded);
        }

        let rdata = if rtype == QType::OPT as u16 {
            let mut opt = decode_opt(buffer, ttl, rd_length)?;
            // CLASS carries the requestor's UDP payload size for OPT records
            if let RData::Opt {
                udp_payload_size, ..
            } = &mut opt
            {
                *udp_payload_size = rclass;
            }
            opt
        } else {
            decode_rdata(buffer, rtype, rclass, rd_length)?
        };

        // RDLENGTH is authoritative: land exactly at the end of this
        // record's RDATA regardless of how many bytes the variant-specific
        // decode actually consumed (compression can make that shorter than
        // rd_length for name-bearing types).
        buffer.set_position(rdata_end);

        Ok(ResourceRecord {
            name,
            rtype,
            rclass,
            ttl,
            rdata,
            ip_joins: Vec::new(),
        })
    }
}

/// Decodes the RDATA for every type but OPT (handled separately by
/// `decode_opt`, which reinterprets CLASS/TTL rather than needing them as
/// a plain class check). `rclass` is only consulted by A/AAAA: per RFC
/// 1035 §3.4.1/§3.4.3.4 (and RFC 3596 for AAAA) those two shapes are only
/// defined for the IN class, while the name-bearing types (CNAME/NS/…)
/// parse under any class, matching the source's asymmetry.
fn decode_rdata<'a>(
    buffer: &mut Cursor<&'a [u8]>,
    rtype: u16,
    rclass: u16,
    rd_length: u16,
) -> DNSResult<RData> {
    use crate::rfc1035::QType::*;

    let rdata_start = buffer.position();
    let rdata_end = rdata_start + rd_length as u64;

    let qtype = QType::try_from(rtype).ok();

    let rdata = match qtype {
        Some(CNAME) | Some(NS) | Some(PTR) | Some(MB) | Some(MD) | Some(MF) | Some(MG)
        | Some(MR) => {
            let mut name = DomainName::default();
            name.from_network_bytes(buffer)?;
            RData::Name(name)
        }
        Some(MX) => {
            let preference = buffer.read_u16::<BigEndian>()?;
            let mut exchange = DomainName::default();
            exchange.from_network_bytes(buffer)?;
            RData::Mx {
                preference,
                exchange,
            }
        }
        Some(SOA) => {
            let mut mname = DomainName::default();
            mname.from_network_bytes(buffer)?;
            let mut rname = DomainName::default();
            rname.from_network_bytes(buffer)?;
            RData::Soa {
                mname,
                rname,
                serial: buffer.read_u32::<BigEndian>()?,
                refresh: buffer.read_u32::<BigEndian>()?,
                retry: buffer.read_u32::<BigEndian>()?,
                expire: buffer.read_u32::<BigEndian>()?,
                minimum: buffer.read_u32::<BigEndian>()?,
            }
        }
        Some(HINFO) => {
            let mut cpu = CharacterString::default();
            cpu.from_network_bytes(buffer)?;
            let mut os = CharacterString::default();
            os.from_network_bytes(buffer)?;
            RData::Hinfo { cpu, os }
        }
        Some(TXT) => {
            let mut strings = Vec::new();
            while buffer.position() < rdata_end {
                let mut cs = CharacterString::default();
                cs.from_network_bytes(buffer)?;
                strings.push(cs);
            }
            RData::Txt(strings)
        }
        Some(A) => {
            if rclass != QClass::IN as u16 {
                return Err(DNSError::Class);
            }
            if rd_length != 4 {
                return Err(DNSError::SizeLimitExceeded);
            }
            let mut octets = [0u8; 4];
            buffer.read_exact(&mut octets)?;
            RData::A(Ipv4Addr::from(octets))
        }
        Some(AAAA) => {
            if rclass != QClass::IN as u16 {
                return Err(DNSError::Class);
            }
            if rd_length != 16 {
                return Err(DNSError::SizeLimitExceeded);
            }
            let mut octets = [0u8; 16];
            buffer.read_exact(&mut octets)?;
            RData::Aaaa(Ipv6Addr::from(octets))
        }
        Some(SRV) => {
            let priority = buffer.read_u16::<BigEndian>()?;
            let weight = buffer.read_u16::<BigEndian>()?;
            let port = buffer.read_u16::<BigEndian>()?;
            let mut target = DomainName::default();
            target.from_network_bytes(buffer)?;
            RData::Srv {
                priority,
                weight,
                port,
                target,
            }
        }
        // any other type, including NULL: keep the opaque payload, don't
        // fail the whole message over a record we don't interpret
        _ => {
            let mut data = vec![0u8; rd_length as usize];
            buffer.read_exact(&mut data)?;
            RData::Unknown {
                type_code: rtype,
                data,
            }
        }
    };

    Ok(rdata)
}

/// OPT pseudo-RR (RFC 6891 §4.3, §6.1). `ttl_raw` is the 32-bit TTL field
/// as received, reinterpreted as extended-rcode(8) | version(8) | flags(16).
fn decode_opt<'a>(buffer: &mut Cursor<&'a [u8]>, ttl_raw: u32, rd_length: u16) -> DNSResult<RData> {
    let extended_rcode = ((ttl_raw >> 24) & 0xFF) as u8;
    let version = ((ttl_raw >> 16) & 0xFF) as u8;
    let flags = (ttl_raw & 0xFFFF) as u16;

    let rdata_end = buffer.position() + rd_length as u64;
    let mut options = Vec::new();

    while buffer.position() < rdata_end {
        let code = buffer.read_u16::<BigEndian>()?;
        let len = buffer.read_u16::<BigEndian>()?;

        let mut data = vec![0u8; len as usize];
        buffer.read_exact(&mut data)?;

        options.push(EdnsOption { code, data });
    }

    // the caller patches udp_payload_size in from the already-decoded
    // rclass field once this returns
    Ok(RData::Opt {
        udp_payload_size: 0,
        extended_rcode,
        version,
        flags,
        options,
    })
}

fn encode_rdata(rdata: &RData, buffer: &mut Vec<u8>) -> io::Result<()> {
    match rdata {
        RData::Name(name) => {
            name.to_network_bytes(buffer)?;
        }
        RData::Mx {
            preference,
            exchange,
        } => {
            buffer.write_u16::<BigEndian>(*preference)?;
            exchange.to_network_bytes(buffer)?;
        }
        RData::Soa {
            mname,
            rname,
            serial,
            refresh,
            retry,
            expire,
            minimum,
        } => {
            mname.to_network_bytes(buffer)?;
            rname.to_network_bytes(buffer)?;
            buffer.write_u32::<BigEndian>(*serial)?;
            buffer.write_u32::<BigEndian>(*refresh)?;
            buffer.write_u32::<BigEndian>(*retry)?;
            buffer.write_u32::<BigEndian>(*expire)?;
            buffer.write_u32::<BigEndian>(*minimum)?;
        }
        RData::Hinfo { cpu, os } => {
            cpu.to_network_bytes(buffer)?;
            os.to_network_bytes(buffer)?;
        }
        RData::Txt(strings) => {
            for s in strings {
                s.to_network_bytes(buffer)?;
            }
        }
        RData::A(addr) => buffer.extend_from_slice(&addr.octets()),
        RData::Aaaa(addr) => buffer.extend_from_slice(&addr.octets()),
        RData::Srv {
            priority,
            weight,
            port,
            target,
        } => {
            buffer.write_u16::<BigEndian>(*priority)?;
            buffer.write_u16::<BigEndian>(*weight)?;
            buffer.write_u16::<BigEndian>(*port)?;
            target.to_network_bytes(buffer)?;
        }
        RData::Opt {
            extended_rcode: _,
            version: _,
            flags: _,
            options,
            ..
        } => {
            for opt in options {
                buffer.write_u16::<BigEndian>(opt.code)?;
                buffer.write_u16::<BigEndian>(opt.len_as_u16())?;
                buffer.extend_from_slice(&opt.data);
            }
        }
        RData::Unknown { data, .. } => {
            buffer.extend_from_slice(data);
        }
    }

    Ok(())
}

/// Reorders MX records by ascending preference. Any pair that isn't "both
/// MX records sharing the same owner name" is left alone (`Ordering::Equal`)
/// — the comparator only ever swaps adjacent same-owner MX records, which
/// is exactly the selective pass the original C parser runs, and Rust's
/// sort_by is stable so everything else keeps its relative order.
pub fn sort_mx_preference(records: &mut [ResourceRecord]) {
    records.sort_by(|a, b| match (&a.rdata, &b.rdata) {
        (RData::Mx { preference: pa, .. }, RData::Mx { preference: pb, .. })
            if a.name == b.name =>
        {
            pa.cmp(pb)
        }
        _ => Ordering::Equal,
    });
}

/// Matches glue A/AAAA records in the additional section to the records
/// that reference their owner name (CNAME/NS/PTR/MB/MD/MF/MG/MR by name,
/// MX by exchange, SOA by mname, SRV by target) and appends the resolved
/// address to `ip_joins`. Call once for the answer section and once for
/// the authority section, mirroring how the original matcher walks each
/// in turn against every additional record.
///
/// An additional record whose owner name matches a referenced name but
/// whose type is neither A nor AAAA can't be used as glue; this is
/// reported rather than silently dropped, since it means the server sent
/// something the additional section was never meant to carry. The caller
/// surfaces it as the transaction's sticky error without aborting the
/// join for the records that did resolve.
pub fn join_additional(
    records: &mut [ResourceRecord],
    additionals: &[ResourceRecord],
) -> Option<DNSError> {
    let mut unresolvable = None;

    for additional in additionals {
        let ip: Option<IpAddr> = match &additional.rdata {
            RData::A(v4) => Some(IpAddr::V4(*v4)),
            RData::Aaaa(v6) => Some(IpAddr::V6(*v6)),
            _ => None,
        };

        for record in records.iter_mut() {
            if let Some(name) = record.rdata.referenced_name() {
                if *name == additional.name {
                    match ip {
                        Some(ip) => record.ip_joins.push(ip),
                        None => unresolvable = Some(DNSError::Type),
                    }
                }
            }
        }
    }

    unresolvable
}

impl EdnsOption {
    fn len_as_u16(&self) -> u16 {
        self.data.len() as u16
    }
}

/// Builds the OPT pseudo-RR appended to outgoing queries: root name, no
/// extended RCODE/flags, the given UDP payload size advertised via the
/// reused CLASS field (RFC 6891 §4.3). `options` is typically either empty
/// or a single NSID option.
pub fn new_opt_record(udp_payload_size: u16, options: Vec<EdnsOption>) -> ResourceRecord {
    ResourceRecord {
        name: DomainName::default(),
        rtype: QType::OPT as u16,
        rclass: udp_payload_size,
        ttl: 0,
        rdata: RData::Opt {
            udp_payload_size,
            extended_rcode: 0,
            version: 0,
            flags: 0,
            options,
        },
        ip_joins: Vec::new(),
    }
}

/// The OPT record this crate sends by default: advertises
/// `EDNS_UDP_PAYLOAD` and carries a single empty NSID option, so a
/// cooperative server can identify itself in the reply without this crate
/// having to ask for anything more elaborate.
pub fn default_opt_record() -> ResourceRecord {
    new_opt_record(
        EDNS_UDP_PAYLOAD,
        vec![EdnsOption {
            code: EDNS_OPT_NSID,
            data: Vec::new(),
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc1035::QClass;

    fn cname_record(owner: &str, target: &str) -> ResourceRecord {
        ResourceRecord {
            name: DomainName::try_from(owner).unwrap(),
            rtype: QType::CNAME as u16,
            rclass: QClass::IN as u16,
            ttl: 300,
            rdata: RData::Name(DomainName::try_from(target).unwrap()),
            ip_joins: Vec::new(),
        }
    }

    fn a_record(owner: &str, addr: Ipv4Addr) -> ResourceRecord {
        ResourceRecord {
            name: DomainName::try_from(owner).unwrap(),
            rtype: QType::A as u16,
            rclass: QClass::IN as u16,
            ttl: 300,
            rdata: RData::A(addr),
            ip_joins: Vec::new(),
        }
    }

    fn mx_record(owner: &str, preference: u16, exchange: &str) -> ResourceRecord {
        ResourceRecord {
            name: DomainName::try_from(owner).unwrap(),
            rtype: QType::MX as u16,
            rclass: QClass::IN as u16,
            ttl: 300,
            rdata: RData::Mx {
                preference,
                exchange: DomainName::try_from(exchange).unwrap(),
            },
            ip_joins: Vec::new(),
        }
    }

    #[test]
    fn join_additional_matches_cname_target() {
        let mut answers = vec![cname_record("www.example.com", "edge.example.net")];
        let additionals = vec![a_record("edge.example.net", Ipv4Addr::new(1, 2, 3, 4))];

        join_additional(&mut answers, &additionals);

        assert_eq!(
            answers[0].ip_joins,
            vec![IpAddr::V4(Ipv4Addr::new(1, 2, 3, 4))]
        );
    }

    #[test]
    fn join_additional_ignores_unrelated_glue() {
        let mut answers = vec![cname_record("www.example.com", "edge.example.net")];
        let additionals = vec![a_record("unrelated.example.net", Ipv4Addr::new(9, 9, 9, 9))];

        join_additional(&mut answers, &additionals);

        assert!(answers[0].ip_joins.is_empty());
    }

    #[test]
    fn sort_mx_preference_orders_same_owner_records() {
        let mut records = vec![
            mx_record("example.com", 20, "mx2.example.com"),
            mx_record("example.com", 10, "mx1.example.com"),
        ];

        sort_mx_preference(&mut records);

        match &records[0].rdata {
            RData::Mx { preference, .. } => assert_eq!(*preference, 10),
            _ => panic!("expected MX"),
        }
    }

    #[test]
    fn sort_mx_preference_leaves_different_owners_alone() {
        let mut records = vec![
            mx_record("b.example.com", 5, "mx.b.example.com"),
            mx_record("a.example.com", 50, "mx.a.example.com"),
        ];

        sort_mx_preference(&mut records);

        // different owners: comparator reports Equal, stable sort keeps order
        assert_eq!(records[0].name.0, "b.example.com");
        assert_eq!(records[1].name.0, "a.example.com");
    }

    #[test]
    fn resource_record_round_trips_a_record() {
        let record = a_record("example.com", Ipv4Addr::new(93, 184, 216, 34));
        let mut buffer = Vec::new();
        record.to_network_bytes(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let decoded = ResourceRecord::from_network_bytes(&mut cursor).unwrap();

        assert_eq!(decoded.rdata, record.rdata);
        assert_eq!(decoded.name, record.name);
    }

    #[test]
    fn a_record_outside_in_class_fails() {
        let mut record = a_record("example.com", Ipv4Addr::new(93, 184, 216, 34));
        record.rclass = QClass::CH as u16;

        let mut buffer = Vec::new();
        record.to_network_bytes(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let err = ResourceRecord::from_network_bytes(&mut cursor).unwrap_err();
        assert!(matches!(err, DNSError::Class));
    }

    #[test]
    fn cname_record_parses_regardless_of_class() {
        let mut record = cname_record("www.example.com", "example.com");
        record.rclass = QClass::CH as u16;

        let mut buffer = Vec::new();
        record.to_network_bytes(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let decoded = ResourceRecord::from_network_bytes(&mut cursor).unwrap();
        assert_eq!(decoded.rdata, record.rdata);
    }

    #[test]
    fn unknown_type_preserves_opaque_data() {
        let record = ResourceRecord {
            name: DomainName::try_from("example.com").unwrap(),
            rtype: 999,
            rclass: QClass::IN as u16,
            ttl: 0,
            rdata: RData::Unknown {
                type_code: 999,
                data: vec![0xDE, 0xAD, 0xBE, 0xEF],
            },
            ip_joins: Vec::new(),
        };

        let mut buffer = Vec::new();
        record.to_network_bytes(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let decoded = ResourceRecord::from_network_bytes(&mut cursor).unwrap();

        assert_eq!(decoded.rdata, record.rdata);
    }
}
