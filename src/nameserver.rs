//! Name-server configuration: resolving a user-supplied address, a
//! `resolv.conf`-style file, or nothing at all into a bounded array of
//! addressed endpoints with per-server protocol state.
//!
//! Grounded in `original_source/config.c` (`dnsr_nameserver_port`,
//! `dnsr_parse_resolv`, `dnsr_nameserver_add`, `dnsr_nameserver_reset`) —
//! no file in `dandyvica-dnsquery` covers this, so the module is net-new,
//! built in the same idiom as the rest of this crate: manual `DNSError`,
//! `log::debug!` at the points the source's `DEBUG()` macro appears.
use std::io::{self, BufRead, BufReader};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::{DNSError, DNSResult};
use crate::rfc1035::MAX_UDP_BASIC;

/// `DNSR_MAX_NS` in the original source.
pub const MAX_NAMESERVERS: usize = 4;
pub const DEFAULT_PORT: u16 = 53;
pub const DEFAULT_RESOLV_CONF_PATH: &str = "/etc/resolv.conf";

/// Per-server EDNS capability, tracked across queries on the same handle:
/// `Unknown` until a response demotes it, `Bad` once the server has shown
/// it can't handle the OPT pseudo-RR, `Ok(version)` once a well-formed
/// EDNS response has been seen (version is currently always 0, but kept
/// so a future EDNS version bump has somewhere to go).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdnsState {
    Unknown,
    Bad,
    Ok(u8),
}

/// One configured endpoint. `ns_id` XOR-masks the on-wire query ID so
/// replies can be tied back to the server that was asked even though all
/// servers share the handle's single logical query ID; `asked` is reset
/// at the start of every new query.
#[derive(Debug, Clone, PartialEq)]
pub struct NameServerEntry {
    pub addr: SocketAddr,
    pub ns_id: u16,
    pub asked: bool,
    pub udp_limit: u16,
    pub edns: EdnsState,
}

impl NameServerEntry {
    fn new(addr: SocketAddr, rng: &mut StdRng) -> Self {
        NameServerEntry {
            addr,
            ns_id: rng.gen(),
            asked: false,
            udp_limit: MAX_UDP_BASIC,
            edns: EdnsState::Unknown,
        }
    }
}

/// A bounded array of up to `MAX_NAMESERVERS` entries, mirroring
/// `DNSR_MAX_NS`'s fixed-size `d_nsinfo` array via a `Vec` with a
/// capacity check on every insert instead of a statically-sized buffer.
#[derive(Debug, Clone, Default)]
pub struct NameServers {
    entries: Vec<NameServerEntry>,
}

impl NameServers {
    pub fn new() -> Self {
        NameServers {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NameServerEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut NameServerEntry> {
        self.entries.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NameServerEntry> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, NameServerEntry> {
        self.entries.iter_mut()
    }

    /// Clears every entry (`dnsr_nameserver_reset`).
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    fn push(&mut self, addr: SocketAddr, rng: &mut StdRng) -> DNSResult<()> {
        if self.entries.len() >= MAX_NAMESERVERS {
            log::debug!("nameserver {} not added: too many", addr);
            return Err(DNSError::Config);
        }
        self.entries.push(NameServerEntry::new(addr, rng));
        Ok(())
    }

    /// Replaces all entries. `server = None` parses the default
    /// `resolv.conf`-style file; `Some(addr)` installs one endpoint on
    /// the default port. Falls back to the loopback address if, after
    /// either path, no entry was added.
    pub fn configure(&mut self, server: Option<&str>, rng: &mut StdRng) -> DNSResult<()> {
        self.reset();

        match server {
            None => self.load_resolv_conf(DEFAULT_RESOLV_CONF_PATH, rng)?,
            Some(addr) => {
                let socket_addr = parse_numeric(addr, DEFAULT_PORT)?;
                self.push(socket_addr, rng)?;
            }
        }

        self.ensure_fallback(rng)
    }

    /// Replaces all entries with a single endpoint at `addr:port`.
    pub fn configure_with_port(
        &mut self,
        server: &str,
        port: &str,
        rng: &mut StdRng,
    ) -> DNSResult<()> {
        self.reset();

        let port: u16 = port.parse().map_err(|_| DNSError::Config)?;
        let socket_addr = parse_numeric(server, port)?;
        self.push(socket_addr, rng)?;

        self.ensure_fallback(rng)
    }

    fn ensure_fallback(&mut self, rng: &mut StdRng) -> DNSResult<()> {
        if self.entries.is_empty() {
            log::debug!("no nameservers configured, falling back to loopback");
            let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT);
            self.push(addr, rng)?;
        }
        Ok(())
    }

    /// Parses a `resolv.conf`-style file: whitespace-separated tokens,
    /// `#` comments, only `nameserver <addr>` lines interpreted. A line
    /// with no trailing newline is treated as too long and skipped
    /// entirely rather than truncated-and-parsed
    /// (`original_source/config.c`'s `buf[len-1] != '\n'` check). A
    /// missing file yields zero entries, not an error; any other I/O
    /// failure is propagated as `DNSError::Io`.
    fn load_resolv_conf(&mut self, path: &str, rng: &mut StdRng) -> DNSResult<()> {
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("{}: not found, no nameservers configured from file", path);
                return Ok(());
            }
            Err(e) => {
                log::debug!("{}: {}", path, e);
                return Err(DNSError::Io(e));
            }
        };

        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();

        loop {
            raw.clear();
            let n = reader.read_until(b'\n', &mut raw)?;
            if n == 0 {
                break;
            }
            if raw.last() != Some(&b'\n') {
                log::debug!("{}: line too long, skipped", path);
                continue;
            }

            let line = String::from_utf8_lossy(&raw);
            let mut tokens = line.split_whitespace();

            let first = match tokens.next() {
                Some(t) => t,
                None => continue,
            };
            if first.starts_with('#') {
                continue;
            }
            if first != "nameserver" {
                continue;
            }

            let addr_tok = match tokens.next() {
                Some(t) => t,
                None => continue,
            };

            if self.entries.len() >= MAX_NAMESERVERS {
                log::debug!("nameserver {} not added: too many", addr_tok);
                continue;
            }

            let socket_addr = parse_numeric(addr_tok, DEFAULT_PORT)?;
            self.push(socket_addr, rng)?;
        }

        Ok(())
    }
}

/// Numeric-only address parsing (`AI_NUMERICHOST` in
/// `dnsr_nameserver_add`'s `getaddrinfo` hints): no DNS lookups, IPv4 or
/// IPv6 literal only.
fn parse_numeric(host: &str, port: u16) -> DNSResult<SocketAddr> {
    let ip: IpAddr = host.parse().map_err(|_| DNSError::Config)?;
    Ok(SocketAddr::new(ip, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn rng() -> StdRng {
        StdRng::from_entropy()
    }

    /// A scratch file under the system temp dir, named uniquely per test
    /// via the calling thread's id, removed when dropped.
    struct ScratchFile(std::path::PathBuf);

    impl ScratchFile {
        fn new(contents: &[u8]) -> Self {
            let path = std::env::temp_dir().join(format!(
                "dnslib-resolv-conf-test-{:?}",
                std::thread::current().id()
            ));
            let mut f = std::fs::File::create(&path).unwrap();
            f.write_all(contents).unwrap();
            ScratchFile(path)
        }

        fn path(&self) -> &str {
            self.0.to_str().unwrap()
        }
    }

    impl Drop for ScratchFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.0);
        }
    }

    #[test]
    fn configure_with_explicit_address() {
        let mut ns = NameServers::new();
        let mut r = rng();
        ns.configure(Some("127.0.0.1"), &mut r).unwrap();

        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get(0).unwrap().addr.port(), DEFAULT_PORT);
        assert_eq!(ns.get(0).unwrap().udp_limit, MAX_UDP_BASIC);
        assert_eq!(ns.get(0).unwrap().edns, EdnsState::Unknown);
    }

    #[test]
    fn configure_with_port_overrides_default() {
        let mut ns = NameServers::new();
        let mut r = rng();
        ns.configure_with_port("127.0.0.1", "5353", &mut r).unwrap();

        assert_eq!(ns.get(0).unwrap().addr.port(), 5353);
    }

    #[test]
    fn configure_rejects_non_numeric_host() {
        let mut ns = NameServers::new();
        let mut r = rng();
        assert!(matches!(
            ns.configure(Some("not-an-ip"), &mut r),
            Err(DNSError::Config)
        ));
    }

    #[test]
    fn missing_resolv_conf_falls_back_to_loopback() {
        let mut ns = NameServers::new();
        let mut r = rng();
        ns.load_resolv_conf("/nonexistent/path/resolv.conf", &mut r)
            .unwrap();
        ns.ensure_fallback(&mut r).unwrap();

        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get(0).unwrap().addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn parses_nameserver_lines_and_skips_comments() {
        let file = ScratchFile::new(
            b"# a comment\nnameserver 192.0.2.1\nnameserver 192.0.2.2\ndomain example.com\n",
        );

        let mut ns = NameServers::new();
        let mut r = rng();
        ns.load_resolv_conf(file.path(), &mut r).unwrap();

        assert_eq!(ns.len(), 2);
        assert_eq!(
            ns.get(0).unwrap().addr.ip(),
            "192.0.2.1".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            ns.get(1).unwrap().addr.ip(),
            "192.0.2.2".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn caps_at_max_nameservers() {
        let mut contents = String::new();
        for i in 0..6 {
            contents.push_str(&format!("nameserver 192.0.2.{}\n", i + 1));
        }
        let file = ScratchFile::new(contents.as_bytes());

        let mut ns = NameServers::new();
        let mut r = rng();
        ns.load_resolv_conf(file.path(), &mut r).unwrap();

        assert_eq!(ns.len(), MAX_NAMESERVERS);
    }

    #[test]
    fn line_without_trailing_newline_is_skipped() {
        let file = ScratchFile::new(b"nameserver 192.0.2.1\nnameserver 192.0.2.2");

        let mut ns = NameServers::new();
        let mut r = rng();
        ns.load_resolv_conf(file.path(), &mut r).unwrap();

        // the second line has no trailing '\n' and is dropped entirely
        assert_eq!(ns.len(), 1);
    }
}
