//! The transaction engine: builds and sends a query, then drives a
//! bounded retry/wait state machine until a usable response, a negative
//! answer, or a timeout.
//!
//! No file in `dandyvica-dnsquery` owns a multi-attempt, multi-server
//! exchange like this one — its CLI sends once and reads once. This
//! module is net-new, grounded directly in `original_source/query.c`,
//! `original_source/result.c`, and `original_source/parse.c`: hand-rolled
//! wire building via `ToFromNetworkOrder`, `log::debug!`/`log::warn!` at
//! the same points the source's `DEBUG()` macro fires, and `DNSError`
//! variants instead of the source's bare `int` return codes.
use std::io::{Cursor, Read, Write};
use std::net::{SocketAddr, TcpStream, UdpSocket};
use std::time::{Duration, Instant, SystemTime};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{DNSError, DNSResult};
use crate::nameserver::{EdnsState, NameServers};
use crate::network_order::ToFromNetworkOrder;
use crate::response::{default_opt_record, join_additional, sort_mx_preference, DNSMessage};
use crate::rfc1035::{
    DNSPacketFlags, DNSPacketHeader, DNSQuestion, PacketType, QClass, QType, ResourceRecord,
    MAX_DNS_PACKET_SIZE,
};

/// One step of the retry schedule a transaction replays after the initial
/// send: wait for a reply, re-ask a given server, or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Ask(usize),
    Wait(u64),
    Done,
}

/// Mirrors the retry cadence `original_source/result.c`'s caller is
/// expected to supply: ask server 0, wait 2s, ask server 1, wait 2s, ask
/// server 0 again, wait 4s, then give up.
pub const DEFAULT_EVENT_SCRIPT: &[Event] = &[
    Event::Ask(0),
    Event::Wait(2),
    Event::Ask(1),
    Event::Wait(2),
    Event::Ask(0),
    Event::Wait(4),
    Event::Done,
];

/// Handle-level settings `Resolver::config` can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFlag {
    Recursion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

/// The outcome of a completed transaction: the RCODE actually received
/// (combined with the OPT extended-RCODE bits, per RFC 6891 §6.1.3) and
/// the three record sections, glue-joined and MX-sorted.
#[derive(Debug, Clone, Default)]
pub struct DnsResult {
    pub rcode: u16,
    pub answer: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

/// A resolver handle: owned sockets, configured servers, handle-level
/// flags, and the state of whatever query is currently in flight.
/// Everything `original_source/internal.h`'s `DNSR` struct frees by hand
/// on `dnsr_destroy`/`dnsr_free_result` is instead reclaimed by ordinary
/// Rust ownership when the handle or its `DnsResult` drops.
pub struct Resolver {
    socket_v4: Option<UdpSocket>,
    socket_v6: Option<UdpSocket>,
    flags: DNSPacketFlags,
    nameservers: NameServers,
    query_buffer: Vec<u8>,
    question_len: usize,
    query_id: u16,
    query_time: Instant,
    state: usize,
    query_sent: bool,
    last_error: Option<DNSError>,
    last_responder: Option<usize>,
    rng: StdRng,
    force_tcp: bool,
    send_opt: bool,
    pending_tcp: Option<(Vec<u8>, SocketAddr)>,
}

impl Resolver {
    /// Binds an ephemeral UDP socket on each address family that's
    /// available locally; at least one must succeed.
    pub fn new() -> DNSResult<Self> {
        let socket_v4 = UdpSocket::bind("0.0.0.0:0").ok();
        let socket_v6 = UdpSocket::bind("[::]:0").ok();

        if socket_v4.is_none() && socket_v6.is_none() {
            return Err(DNSError::FdSet);
        }

        let mut flags = DNSPacketFlags::default();
        flags.packet_type = PacketType::Query;
        flags.recursion_desired = true;

        Ok(Resolver {
            socket_v4,
            socket_v6,
            flags,
            nameservers: NameServers::new(),
            query_buffer: Vec::new(),
            question_len: 0,
            query_id: 0,
            query_time: Instant::now(),
            state: 0,
            query_sent: false,
            last_error: None,
            last_responder: None,
            rng: StdRng::from_entropy(),
            force_tcp: false,
            send_opt: true,
            pending_tcp: None,
        })
    }

    pub fn last_error(&self) -> Option<&DNSError> {
        self.last_error.as_ref()
    }

    pub fn last_responder(&self) -> Option<usize> {
        self.last_responder
    }

    /// Forces every query on this handle over TCP instead of the default
    /// UDP-then-truncation-fallback path. Mirrors choosing
    /// `dnsr_send_query_tcp` unconditionally rather than only on a
    /// truncated UDP reply.
    pub fn set_tcp(&mut self, force: bool) {
        self.force_tcp = force;
    }

    /// Controls whether outgoing queries carry the EDNS OPT pseudo-RR.
    /// Some servers mishandle it outright rather than replying NOTIMP, so
    /// the caller can opt out up front instead of waiting on a demotion.
    pub fn set_opt(&mut self, send_opt: bool) {
        self.send_opt = send_opt;
    }

    /// Reconfigures the server list: `None` parses `/etc/resolv.conf`,
    /// `Some(addr)` installs one server on the default port 53.
    pub fn set_nameserver(&mut self, server: Option<&str>) -> DNSResult<()> {
        self.nameservers.configure(server, &mut self.rng)
    }

    /// Reconfigures the server list to a single explicit `addr:port`.
    pub fn set_nameserver_port(&mut self, server: &str, port: &str) -> DNSResult<()> {
        self.nameservers.configure_with_port(server, port, &mut self.rng)
    }

    pub fn config(&mut self, flag: ConfigFlag, toggle: Toggle) -> DNSResult<()> {
        match flag {
            ConfigFlag::Recursion => self.flags.recursion_desired = toggle == Toggle::On,
        }
        Ok(())
    }

    /// Builds the wire query and sends it to server 0 immediately.
    /// `result()` drives the retry schedule afterwards; this call never
    /// blocks waiting for a reply.
    pub fn query(&mut self, qtype: QType, qclass: QClass, name: &str) -> DNSResult<()> {
        if self.nameservers.is_empty() {
            self.set_nameserver(None)?;
        }

        let (buffer, question_len) =
            build_query(&self.flags, qtype, qclass, name, self.send_opt)?;

        self.query_buffer = buffer;
        self.question_len = question_len;
        self.query_id = self.rng.gen();
        self.state = 0;
        self.query_sent = false;
        self.last_error = None;
        self.last_responder = None;

        for entry in self.nameservers.iter_mut() {
            entry.asked = false;
        }

        self.send_query(0)?;
        self.state = 0;

        Ok(())
    }

    /// Drives the event script until a response (positive or NXDOMAIN)
    /// comes back, or until `timeout` (if given) elapses.
    pub fn result(&mut self, timeout: Option<Duration>) -> DNSResult<DnsResult> {
        if !self.query_sent {
            return Err(DNSError::NoQuery);
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        let mut resp_errno: Option<DNSError> = None;

        while self.state < DEFAULT_EVENT_SCRIPT.len() {
            match DEFAULT_EVENT_SCRIPT[self.state] {
                Event::Done => break,

                Event::Ask(index) => {
                    if index < self.nameservers.len() {
                        self.send_query(index)?;
                    }
                    self.state += 1;
                }

                Event::Wait(secs) => {
                    let elapsed = self.query_time.elapsed();
                    let base_wait = Duration::from_secs(secs).saturating_sub(elapsed);
                    let wait = match deadline {
                        Some(d) => base_wait.min(d.saturating_duration_since(Instant::now())),
                        None => base_wait,
                    };

                    match self.wait_for_datagram(wait)? {
                        None => self.state += 1,
                        Some((buf, from)) => match self.validate_resp(&buf, from) {
                            Err(DNSError::NsInvalid) => {
                                log::debug!("discarding reply from unmatched source {}", from);
                            }
                            Err(DNSError::Truncation) => {
                                let ns_index = self
                                    .nameservers
                                    .iter()
                                    .position(|ns| ns.asked && ns.addr == from)
                                    .ok_or(DNSError::NsInvalid)?;
                                let tcp_buf = self.tcp_fallback(ns_index)?;

                                match self.validate_resp(&tcp_buf, from) {
                                    Ok(idx) => {
                                        if let Some(result) =
                                            self.finish_response(&tcp_buf, idx, &mut resp_errno)?
                                        {
                                            return Ok(result);
                                        }
                                        self.state += 1;
                                    }
                                    Err(e) => {
                                        resp_errno = Some(e);
                                        self.state += 1;
                                    }
                                }
                            }
                            Err(e) => {
                                resp_errno = Some(e);
                                self.state += 1;
                            }
                            Ok(ns_index) => {
                                if let Some(result) =
                                    self.finish_response(&buf, ns_index, &mut resp_errno)?
                                {
                                    return Ok(result);
                                }
                                self.state += 1;
                            }
                        },
                    }
                }
            }

            if let Some(d) = deadline {
                if Instant::now() >= d {
                    break;
                }
            }
        }

        match resp_errno {
            Some(e) => Err(e),
            None => Err(DNSError::Timeout),
        }
    }

    /// Parses a validated reply and, unless its RCODE demands another
    /// retry, returns the assembled `DnsResult`. `Ok(None)` means the
    /// caller should stay in the retry schedule (error recorded into
    /// `resp_errno`); `Ok(Some(_))` means the transaction is over, success
    /// or NXDOMAIN alike.
    fn finish_response(
        &mut self,
        buf: &[u8],
        ns_index: usize,
        resp_errno: &mut Option<DNSError>,
    ) -> DNSResult<Option<DnsResult>> {
        let mut cursor = Cursor::new(buf);
        let message = DNSMessage::from_network_bytes(&mut cursor)?;

        self.last_responder = Some(ns_index);
        let rcode = extract_rcode(&message);

        match self.validate_rcode(rcode, ns_index) {
            Ok(()) | Err(DNSError::Name) => {
                let (result, join_error) = assemble_result(rcode, message);
                if let Some(e) = join_error {
                    self.last_error = Some(e);
                }
                Ok(Some(result))
            }
            Err(e) => {
                *resp_errno = Some(e);
                Ok(None)
            }
        }
    }

    /// Checks the response header/question against the outstanding query,
    /// grounded in `dnsr_validate_resp`: which server answered, whether
    /// the reply is for this query at all, and whether it's truncated.
    /// RA is logged, never enforced; the Z bit is left unchecked, matching
    /// the original source (the check there is commented out).
    fn validate_resp(&self, buf: &[u8], from: SocketAddr) -> DNSResult<usize> {
        if buf.len() < 12 {
            return Err(DNSError::NsInvalid);
        }

        let ns_index = self
            .nameservers
            .iter()
            .position(|ns| ns.asked && ns.addr == from)
            .ok_or(DNSError::NsInvalid)?;

        let entry = self.nameservers.get(ns_index).unwrap();
        let wire_id = u16::from_be_bytes([buf[0], buf[1]]);
        if self.query_id != (wire_id ^ entry.ns_id) {
            return Err(DNSError::NsInvalid);
        }

        let flags = u16::from_be_bytes([buf[2], buf[3]]);
        if flags & 0x8000 == 0 {
            return Err(DNSError::NotResponse);
        }
        log::debug!("RA={}", flags & 0x0080 != 0);

        if flags & 0x0200 != 0 {
            return Err(DNSError::Truncation);
        }

        let q_len = self.question_len;
        if buf.len() < q_len || self.query_buffer[12..q_len] != buf[12..q_len] {
            return Err(DNSError::QuestionWrong);
        }

        Ok(ns_index)
    }

    /// RCODE validator, grounded in `dnsr_validate_result`: demotes a
    /// server's EDNS capability on NOTIMP (only if still `Unknown`) or
    /// BADVERS (unconditionally), per RFC 6891 §7. `rcode` is the extended
    /// 12-bit code (`extract_rcode`'s `(extended << 4) | base`), so BADVERS
    /// (16) has to be matched against the unmasked value before falling
    /// back to the header's 4-bit RCODE space for everything else.
    fn validate_rcode(&mut self, rcode: u16, ns_index: usize) -> DNSResult<()> {
        if rcode == 16 {
            if let Some(entry) = self.nameservers.get_mut(ns_index) {
                entry.edns = EdnsState::Bad;
                log::warn!("server {} demoted to EDNS-bad (BADVERS)", entry.addr);
            }
            return Err(DNSError::NotImplemented);
        }

        match rcode & 0xF {
            0 => Ok(()),
            1 => Err(DNSError::Format),
            2 => Err(DNSError::Server),
            3 => Err(DNSError::Name),
            4 => {
                if let Some(entry) = self.nameservers.get_mut(ns_index) {
                    if entry.edns == EdnsState::Unknown {
                        entry.edns = EdnsState::Bad;
                        log::warn!("server {} demoted to EDNS-bad (NOTIMP)", entry.addr);
                    }
                }
                Err(DNSError::NotImplemented)
            }
            5 => Err(DNSError::Refused),
            other => {
                log::debug!("unhandled rcode {}, treating as success", other);
                Ok(())
            }
        }
    }

    /// Waits up to `wait` for a datagram on either socket. Standard
    /// sockets don't offer a portable multi-fd wait, so this alternates
    /// short bounded reads on each in turn rather than a real `select`.
    fn wait_for_datagram(
        &mut self,
        wait: Duration,
    ) -> DNSResult<Option<(Vec<u8>, SocketAddr)>> {
        if let Some(pending) = self.pending_tcp.take() {
            return Ok(Some(pending));
        }

        if self.socket_v4.is_none() && self.socket_v6.is_none() {
            return Err(DNSError::FdSet);
        }

        let deadline = Instant::now() + wait;
        let poll_slice = Duration::from_millis(50);
        let mut buf = [0u8; MAX_DNS_PACKET_SIZE];

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(None);
            }
            let slice = remaining.min(poll_slice).max(Duration::from_millis(1));

            if let Some(sock) = &self.socket_v4 {
                sock.set_read_timeout(Some(slice))?;
                match sock.recv_from(&mut buf) {
                    Ok((n, addr)) => return Ok(Some((buf[..n].to_vec(), addr))),
                    Err(e) if is_would_block(&e) => {}
                    Err(e) => return Err(DNSError::Io(e)),
                }
            }

            if let Some(sock) = &self.socket_v6 {
                sock.set_read_timeout(Some(slice))?;
                match sock.recv_from(&mut buf) {
                    Ok((n, addr)) => return Ok(Some((buf[..n].to_vec(), addr))),
                    Err(e) if is_would_block(&e) => {}
                    Err(e) => return Err(DNSError::Io(e)),
                }
            }
        }
    }

    /// Sends the outstanding query to server `index`, grounded in
    /// `dnsr_send_query`: strips the OPT pseudo-RR (and decrements
    /// ARCOUNT) for a server already known to reject it, patches the
    /// wire ID to `query_id XOR ns_id`, and enforces the server's UDP
    /// size limit.
    fn send_query(&mut self, index: usize) -> DNSResult<()> {
        let entry = self
            .nameservers
            .get(index)
            .ok_or(DNSError::NsInvalid)?
            .clone();

        let mut scratch = if entry.edns == EdnsState::Bad {
            let mut q = self.query_buffer[..self.question_len].to_vec();
            q[10] = 0;
            q[11] = 0;
            q
        } else {
            self.query_buffer.clone()
        };

        let wire_id = self.query_id ^ entry.ns_id;
        scratch[0..2].copy_from_slice(&wire_id.to_be_bytes());

        if self.force_tcp {
            log::debug!("sent query {:#06x} to {} over TCP", self.query_id, entry.addr);
            let resp = tcp_exchange(entry.addr, &scratch)?;
            self.pending_tcp = Some((resp, entry.addr));
        } else {
            if scratch.len() as u16 > entry.udp_limit {
                return Err(DNSError::SizeLimitExceeded);
            }

            let socket = match entry.addr {
                SocketAddr::V4(_) => self.socket_v4.as_ref(),
                SocketAddr::V6(_) => self.socket_v6.as_ref(),
            }
            .ok_or(DNSError::FdSet)?;

            socket.send_to(&scratch, entry.addr)?;
            log::debug!("sent query {:#06x} to {}", self.query_id, entry.addr);
        }

        self.query_time = Instant::now();
        self.query_sent = true;
        if let Some(ns) = self.nameservers.get_mut(index) {
            ns.asked = true;
        }

        Ok(())
    }

    /// TCP fallback for a truncated UDP reply, grounded in
    /// `dnsr_send_query_tcp`: fresh connection, 2-byte big-endian length
    /// prefix on both request and response, looped `read_exact` since TCP
    /// gives no datagram boundary.
    fn tcp_fallback(&mut self, index: usize) -> DNSResult<Vec<u8>> {
        let entry = self
            .nameservers
            .get(index)
            .ok_or(DNSError::NsInvalid)?
            .clone();

        log::warn!("truncated reply from {}, retrying over TCP", entry.addr);

        let bytes = if entry.edns == EdnsState::Bad {
            let mut q = self.query_buffer[..self.question_len].to_vec();
            q[10] = 0;
            q[11] = 0;
            q
        } else {
            self.query_buffer.clone()
        };

        tcp_exchange(entry.addr, &bytes)
    }
}

/// One TCP request/response round-trip, 2-byte big-endian length prefix on
/// both sides, shared by the truncation fallback path and forced-TCP mode.
fn tcp_exchange(addr: SocketAddr, bytes: &[u8]) -> DNSResult<Vec<u8>> {
    let mut stream = TcpStream::connect(addr)?;
    stream.write_all(&(bytes.len() as u16).to_be_bytes())?;
    stream.write_all(bytes)?;

    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf)?;
    let resp_len = u16::from_be_bytes(len_buf) as usize;

    let mut resp = vec![0u8; resp_len];
    stream.read_exact(&mut resp)?;

    Ok(resp)
}

fn is_would_block(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

/// Builds the outbound wire buffer: header, question, then the default
/// OPT pseudo-RR appended as the sole additional record. Returns the full
/// buffer along with the byte offset just past the question section
/// (`question_len`), which both the EDNS-strip path and the question-echo
/// check in `validate_resp` need.
fn build_query(
    flags: &DNSPacketFlags,
    qtype: QType,
    qclass: QClass,
    name: &str,
    send_opt: bool,
) -> DNSResult<(Vec<u8>, usize)> {
    let question = DNSQuestion::new(name, qtype, Some(qclass))?;

    let mut header = DNSPacketHeader::default();
    header.flags = flags.clone();
    header.flags.packet_type = PacketType::Query;
    header.qd_count = 1;
    header.ar_count = if send_opt { 1 } else { 0 };

    let mut buffer = Vec::new();
    header.to_network_bytes(&mut buffer)?;
    question.to_network_bytes(&mut buffer)?;
    let question_len = buffer.len();

    if send_opt {
        let opt = default_opt_record();
        opt.to_network_bytes(&mut buffer)?;
    }

    Ok((buffer, question_len))
}

/// Combines the header's 4-bit RCODE with the OPT pseudo-RR's extended
/// RCODE bits, if present, into the full 12-bit code (RFC 6891 §6.1.3).
fn extract_rcode(message: &DNSMessage) -> u16 {
    use crate::rfc1035::RData;

    let base = message.header.flags.response_code as u16 & 0xF;
    let extended = message
        .additionals
        .iter()
        .find_map(|r| match &r.rdata {
            RData::Opt { extended_rcode, .. } => Some(*extended_rcode as u16),
            _ => None,
        })
        .unwrap_or(0);

    (extended << 4) | base
}

fn assemble_result(rcode: u16, mut message: DNSMessage) -> (DnsResult, Option<DNSError>) {
    sort_mx_preference(&mut message.answers);
    let answer_error = join_additional(&mut message.answers, &message.additionals);
    let authority_error = join_additional(&mut message.authorities, &message.additionals);

    let result = DnsResult {
        rcode,
        answer: message.answers,
        authority: message.authorities,
        additional: message.additionals,
    };

    (result, answer_error.or(authority_error))
}

/// `true` once `since` plus the lowest TTL among `result`'s answers has
/// elapsed, i.e. the caller should not keep trusting this answer without
/// asking again. Grounded in `dnsr_result_expired`.
pub fn result_expired(result: &DnsResult, since: SystemTime) -> bool {
    let elapsed = match SystemTime::now().duration_since(since) {
        Ok(d) => d.as_secs(),
        Err(_) => return false,
    };

    result.answer.iter().any(|rr| (rr.ttl as u64) < elapsed)
}

/// Builds the `in-addr.arpa`/`ip6.arpa` PTR query name for `ip`, e.g.
/// `1.2.3.4` becomes `4.3.2.1.in-addr.arpa`. `suffix` overrides the
/// default zone, matching `dnsr_ntoptr`'s optional argument.
pub fn reverse_ip(ip: std::net::IpAddr, suffix: Option<&str>) -> String {
    match ip {
        std::net::IpAddr::V4(v4) => {
            let o = v4.octets();
            let suffix = suffix.unwrap_or("in-addr.arpa");
            format!("{}.{}.{}.{}.{}", o[3], o[2], o[1], o[0], suffix)
        }
        std::net::IpAddr::V6(v6) => {
            let suffix = suffix.unwrap_or("ip6.arpa");
            let mut nibbles = String::new();
            for byte in v6.octets().iter().rev() {
                nibbles.push_str(&format!("{:x}.{:x}.", byte & 0x0F, (byte >> 4) & 0x0F));
            }
            format!("{}{}", nibbles, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn build_query_records_question_len() {
        let flags = DNSPacketFlags::default();
        let (buffer, question_len) =
            build_query(&flags, QType::A, QClass::IN, "example.com", true).unwrap();

        // header(12) + name(13) + type(2) + class(2)
        assert_eq!(question_len, 12 + 13 + 2 + 2);
        assert!(buffer.len() > question_len, "OPT record must follow");
    }

    #[test]
    fn build_query_without_opt_has_no_trailing_record() {
        let flags = DNSPacketFlags::default();
        let (buffer, question_len) =
            build_query(&flags, QType::A, QClass::IN, "example.com", false).unwrap();

        assert_eq!(buffer.len(), question_len, "no OPT record must follow");
    }

    #[test]
    fn reverse_ip_v4() {
        let ip: std::net::IpAddr = "192.0.2.1".parse().unwrap();
        assert_eq!(reverse_ip(ip, None), "1.2.0.192.in-addr.arpa");
    }

    #[test]
    fn reverse_ip_v6() {
        let ip: std::net::IpAddr = "2001:db8::1".parse().unwrap();
        let name = reverse_ip(ip, None);
        assert!(name.ends_with("ip6.arpa"));
        assert!(name.starts_with("1.0.0.0."));
    }

    #[test]
    fn reverse_ip_custom_suffix() {
        let ip: std::net::IpAddr = "192.0.2.1".parse().unwrap();
        assert_eq!(reverse_ip(ip, Some("example.com")), "1.2.0.192.example.com");
    }

    #[test]
    fn result_expired_when_ttl_has_passed() {
        let record = ResourceRecord {
            name: crate::rfc1035::DomainName::try_from("example.com").unwrap(),
            rtype: QType::A as u16,
            rclass: QClass::IN as u16,
            ttl: 1,
            rdata: crate::rfc1035::RData::A(Ipv4Addr::new(1, 2, 3, 4)),
            ip_joins: Vec::new(),
        };
        let result = DnsResult {
            rcode: 0,
            answer: vec![record],
            authority: Vec::new(),
            additional: Vec::new(),
        };

        let captured_at = SystemTime::now() - Duration::from_secs(5);
        assert!(result_expired(&result, captured_at));
    }

    #[test]
    fn result_not_expired_within_ttl() {
        let record = ResourceRecord {
            name: crate::rfc1035::DomainName::try_from("example.com").unwrap(),
            rtype: QType::A as u16,
            rclass: QClass::IN as u16,
            ttl: 300,
            rdata: crate::rfc1035::RData::A(Ipv4Addr::new(1, 2, 3, 4)),
            ip_joins: Vec::new(),
        };
        let result = DnsResult {
            rcode: 0,
            answer: vec![record],
            authority: Vec::new(),
            additional: Vec::new(),
        };

        assert!(!result_expired(&result, SystemTime::now()));
    }

    #[test]
    fn resolver_new_binds_sockets() {
        let resolver = Resolver::new().unwrap();
        assert!(resolver.socket_v4.is_some() || resolver.socket_v6.is_some());
    }

    #[test]
    fn result_without_query_is_rejected() {
        let mut resolver = Resolver::new().unwrap();
        assert!(matches!(
            resolver.result(Some(Duration::from_millis(10))),
            Err(DNSError::NoQuery)
        ));
    }

    #[test]
    fn query_sends_to_loopback_without_listener() {
        // fire-and-forget UDP send: should succeed locally even though
        // nothing is listening on 127.0.0.1:53 in the test environment
        let mut resolver = Resolver::new().unwrap();
        resolver.set_nameserver(Some("127.0.0.1")).unwrap();
        assert!(resolver.query(QType::A, QClass::IN, "example.com").is_ok());
        assert!(resolver.query_sent);
    }

    #[test]
    fn config_toggles_recursion_desired() {
        let mut resolver = Resolver::new().unwrap();
        resolver.config(ConfigFlag::Recursion, Toggle::Off).unwrap();
        assert!(!resolver.flags.recursion_desired);
    }

    #[test]
    fn validate_rcode_demotes_on_badvers() {
        let mut resolver = Resolver::new().unwrap();
        resolver.set_nameserver(Some("127.0.0.1")).unwrap();

        let result = resolver.validate_rcode(16, 0);
        assert!(matches!(result, Err(DNSError::NotImplemented)));
        assert_eq!(resolver.nameservers.get(0).unwrap().edns, EdnsState::Bad);
    }

    #[test]
    fn validate_rcode_nxdomain_is_returned_not_swallowed() {
        let mut resolver = Resolver::new().unwrap();
        resolver.set_nameserver(Some("127.0.0.1")).unwrap();
        assert!(matches!(resolver.validate_rcode(3, 0), Err(DNSError::Name)));
    }
}
