//! Display method: as we can't impl the Display trait outside the module
//! where it's defined, and to not put these methods in the lib, use a
//! wrapper.
use std::fmt;

use dnslib::rfc1035::{DNSPacketFlags, DNSPacketHeader, DNSQuestion, PacketType, RData, ResourceRecord};
use dnslib::transaction::DnsResult;

pub struct DisplayWrapper<'a, T>(pub &'a T);

impl fmt::Display for DisplayWrapper<'_, DNSPacketHeader> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id:{:X}({}) ", self.0.id, self.0.id)?;
        write!(f, "flags:[{}] ", DisplayWrapper(&self.0.flags))?;

        if self.0.flags.packet_type == PacketType::Query {
            write!(f, "qd:{}", self.0.qd_count)
        } else {
            write!(
                f,
                "qd:{}, an:{} ns:{} ar:{}",
                self.0.qd_count, self.0.an_count, self.0.ns_count, self.0.ar_count
            )
        }
    }
}

impl fmt::Display for DisplayWrapper<'_, DNSPacketFlags> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ", self.0.packet_type)?;

        if self.0.packet_type == PacketType::Query {
            write!(
                f,
                "opcode:{:?} rd:{}",
                self.0.op_code, self.0.recursion_desired
            )
        } else {
            write!(
                f,
                "opcode:{:?} tc:{} ra:{} ad:{} rcode:{:?}",
                self.0.op_code,
                self.0.truncated,
                self.0.recursion_available,
                self.0.authentic_data,
                self.0.response_code
            )
        }
    }
}

impl fmt::Display for DisplayWrapper<'_, DNSQuestion> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "domain:{} qtype:{:?} class:{:?}",
            self.0.name, self.0.r#type, self.0.class
        )
    }
}

impl fmt::Display for DisplayWrapper<'_, RData> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            RData::Name(name) => write!(f, "{}", name),
            RData::Mx {
                preference,
                exchange,
            } => write!(f, "preference:{} exchange:{}", preference, exchange),
            RData::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "mname:{} rname:{} serial:{} refresh:{} retry:{} expire:{} minimum:{}",
                mname, rname, serial, refresh, retry, expire, minimum
            ),
            RData::Hinfo { cpu, os } => write!(f, "cpu:\"{}\" os:\"{}\"", cpu, os),
            RData::Txt(strings) => {
                let joined = strings
                    .iter()
                    .map(|s| format!("\"{}\"", s))
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "{}", joined)
            }
            RData::A(addr) => write!(f, "{}", addr),
            RData::Aaaa(addr) => write!(f, "{}", addr),
            RData::Srv {
                priority,
                weight,
                port,
                target,
            } => write!(
                f,
                "priority:{} weight:{} port:{} target:{}",
                priority, weight, port, target
            ),
            RData::Opt {
                udp_payload_size,
                extended_rcode,
                version,
                flags,
                options,
            } => write!(
                f,
                "udp_payload:{} ext_rcode:{} version:{} flags:{:#06x} options:{}",
                udp_payload_size,
                extended_rcode,
                version,
                flags,
                options.len()
            ),
            RData::Unknown { type_code, data } => {
                write!(f, "type={} {} bytes", type_code, data.len())
            }
        }
    }
}

impl fmt::Display for DisplayWrapper<'_, ResourceRecord> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = self
            .0
            .qtype()
            .map(|t| format!("{:?}", t))
            .unwrap_or_else(|| self.0.rtype.to_string());

        write!(
            f,
            "{} {} CLASS={} TTL={} {}",
            self.0.name,
            type_name,
            self.0.rclass,
            self.0.ttl,
            DisplayWrapper(&self.0.rdata)
        )?;

        for ip in &self.0.ip_joins {
            write!(f, " [glue:{}]", ip)?;
        }

        Ok(())
    }
}

impl fmt::Display for DisplayWrapper<'_, DnsResult> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rcode:{}", self.0.rcode)?;

        writeln!(f, "ANSWER ({}):", self.0.answer.len())?;
        for rr in &self.0.answer {
            writeln!(f, "  {}", DisplayWrapper(rr))?;
        }

        if !self.0.authority.is_empty() {
            writeln!(f, "AUTHORITY ({}):", self.0.authority.len())?;
            for rr in &self.0.authority {
                writeln!(f, "  {}", DisplayWrapper(rr))?;
            }
        }

        if !self.0.additional.is_empty() {
            writeln!(f, "ADDITIONAL ({}):", self.0.additional.len())?;
            for rr in &self.0.additional {
                writeln!(f, "  {}", DisplayWrapper(rr))?;
            }
        }

        Ok(())
    }
}

/// Prints a fully assembled result the way the CLI wants to show it.
pub fn display_result(result: &DnsResult) {
    print!("{}", DisplayWrapper(result));
}
