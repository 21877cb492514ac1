//! `ToFromNetworkOrder` impls for the rfc1035 domain-name and
//! character-string wire types, plus the three simple enums whose codec is
//! generated through `derive_enum!`.
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::collections::HashSet;
use std::io::{self, Cursor, Read, Result};

use crate::derive_enum;
use crate::error::{DNSError, DNSResult};
use crate::network_order::ToFromNetworkOrder;
use crate::rfc1035::{CharacterString, DomainName, PacketType, QClass, QType};
use crate::util::{is_extended_label, is_pointer};

/// Following a compression pointer more than this many times almost
/// certainly means a cycle; bails out even if the `HashSet` below somehow
/// missed it (e.g. a very long chain of distinct offsets).
const MAX_POINTER_HOPS: usize = 128;

impl<'a> ToFromNetworkOrder<'a> for CharacterString {
    /// ```
    /// use dnslib::network_order::ToFromNetworkOrder;
    /// use dnslib::rfc1035::CharacterString;
    ///
    /// let cs = CharacterString::from("google");
    /// let mut buffer: Vec<u8> = Vec::new();
    /// assert_eq!(cs.to_network_bytes(&mut buffer).unwrap(), 7);
    /// assert_eq!(buffer, &[0x06, 0x67, 0x6f, 0x6f, 0x67, 0x6c, 0x65]);
    /// ```
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> Result<usize> {
        if self.0.len() > 255 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "character-string longer than 255 octets",
            ));
        }

        buffer.write_u8(self.0.len() as u8)?;
        buffer.extend_from_slice(self.0.as_bytes());
        Ok(self.0.len() + 1)
    }

    /// ```
    /// use std::io::Cursor;
    /// use dnslib::network_order::ToFromNetworkOrder;
    /// use dnslib::rfc1035::CharacterString;
    ///
    /// let b = [0x06_u8, 0x67, 0x6f, 0x6f, 0x67, 0x6c, 0x65];
    /// let mut buffer = Cursor::new(b.as_slice());
    /// let mut cs = CharacterString::default();
    /// assert!(cs.from_network_bytes(&mut buffer).is_ok());
    /// assert_eq!(cs.0, "google");
    /// ```
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        let size = buffer.read_u8()? as usize;

        let mut data = vec![0u8; size];
        buffer.read_exact(&mut data)?;

        self.0 = String::from_utf8(data)?;
        Ok(())
    }
}

impl<'a> ToFromNetworkOrder<'a> for DomainName {
    /// ```
    /// use dnslib::rfc1035::DomainName;
    /// use dnslib::network_order::ToFromNetworkOrder;
    ///
    /// let dn = DomainName::try_from("www.google.ie").unwrap();
    /// let mut buffer: Vec<u8> = Vec::new();
    ///
    /// assert_eq!(dn.to_network_bytes(&mut buffer).unwrap(), 15);
    /// assert_eq!(buffer, &[
    ///     0x03, 0x77, 0x77, 0x77, 0x06, 0x67, 0x6f, 0x6f, 0x67, 0x6c, 0x65, 0x02, 0x69, 0x65, 0x00,
    /// ]);
    /// ```
    fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> Result<usize> {
        let encoded = self.encode_labels().map_err(crate::error::wire_error)?;
        buffer.extend_from_slice(&encoded);
        Ok(encoded.len())
    }

    /// Decodes starting at the cursor's current position against the whole
    /// backing buffer, following compression pointers iteratively (not
    /// recursively). Guards against pointer cycles both by capping the
    /// number of hops (`MAX_POINTER_HOPS`) and by tracking the set of
    /// pointer-byte offsets already visited: a pointer landing back on one
    /// aborts immediately rather than looping. The outer cursor is left
    /// exactly two bytes past the *first* pointer encountered (or past the
    /// terminating zero, if the name has no pointer at all) regardless of
    /// how many pointers are chased internally.
    ///
    /// ```
    /// use std::io::Cursor;
    /// use dnslib::network_order::ToFromNetworkOrder;
    /// use dnslib::rfc1035::DomainName;
    ///
    /// // "google.com" followed by a pointer back to offset 0
    /// let sample: &[u8] = &[
    ///     0x06, b'g', b'o', b'o', b'g', b'l', b'e', 0x03, b'c', b'o', b'm', 0x00,
    ///     0xc0, 0x00,
    /// ];
    /// let mut buffer = Cursor::new(sample);
    /// buffer.set_position(12);
    /// let mut dn = DomainName::default();
    /// assert!(dn.from_network_bytes(&mut buffer).is_ok());
    /// assert_eq!(dn.0, "google.com");
    /// assert_eq!(buffer.position(), 14);
    /// ```
    fn from_network_bytes(&mut self, buffer: &mut Cursor<&'a [u8]>) -> DNSResult<()> {
        let backing = *buffer.get_ref();

        let mut labels: Vec<String> = Vec::new();
        let mut total_len = 0usize;
        let mut cursor_index = buffer.position() as usize;
        let mut after_first_pointer: Option<usize> = None;
        let mut visited_pointers: HashSet<usize> = HashSet::new();
        let mut hops = 0usize;

        loop {
            if cursor_index >= backing.len() {
                return Err(DNSError::SizeLimitExceeded);
            }

            let marker = backing[cursor_index];

            if marker == 0 {
                if after_first_pointer.is_none() {
                    after_first_pointer = Some(cursor_index + 1);
                }
                break;
            }

            if is_pointer(marker) {
                if cursor_index + 1 >= backing.len() {
                    return Err(DNSError::SizeLimitExceeded);
                }

                if after_first_pointer.is_none() {
                    after_first_pointer = Some(cursor_index + 2);
                }

                if !visited_pointers.insert(cursor_index) {
                    return Err(DNSError::Parse);
                }

                hops += 1;
                if hops > MAX_POINTER_HOPS {
                    return Err(DNSError::Parse);
                }

                let pointer = u16::from_be_bytes([marker, backing[cursor_index + 1]]);
                let offset = (pointer & 0x3FFF) as usize;

                if offset >= backing.len() {
                    return Err(DNSError::SizeLimitExceeded);
                }

                cursor_index = offset;
                continue;
            }

            if is_extended_label(marker) {
                return Err(DNSError::Parse);
            }

            let size = marker as usize;
            let label_start = cursor_index + 1;
            let label_end = label_start + size;

            if label_end > backing.len() {
                return Err(DNSError::SizeLimitExceeded);
            }
            if size > 63 {
                return Err(DNSError::SizeLimitExceeded);
            }

            let label = std::str::from_utf8(&backing[label_start..label_end])?;
            labels.push(label.to_string());

            total_len += size + 1;
            if total_len > 255 {
                return Err(DNSError::SizeLimitExceeded);
            }

            cursor_index = label_end;
        }

        self.0 = labels.join(".");
        buffer.set_position(after_first_pointer.unwrap() as u64);

        Ok(())
    }
}

// Impl QType, QClass & PacketType enums
derive_enum!(QType, u16);
derive_enum!(QClass, u16);
derive_enum!(PacketType, u16);

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // sample taken from a real wire capture (wireshark), exercises
    // compression
    const SAMPLE: &[u8] = &[
        0x41, 0x2a, 0x81, 0x80, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x06, 0x67, 0x6f,
        0x6f, 0x67, 0x6c, 0x65, 0x03, 0x63, 0x6f, 0x6d, 0x00, 0x00, 0x05, 0x00, 0x01, 0xc0, 0x0c,
        0x00, 0x06, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3c, 0x00, 0x26, 0x03, 0x6e, 0x73, 0x31, 0xc0,
        0x0c, 0x09, 0x64, 0x6e, 0x73, 0x2d, 0x61, 0x64, 0x6d, 0x69, 0x6e, 0xc0, 0x0c, 0x19, 0x1b,
        0xc0, 0x0c, 0x00, 0x00, 0x03, 0x84, 0x00, 0x00, 0x03, 0x84, 0x00, 0x00, 0x07, 0x08, 0x00,
        0x00, 0x00, 0x3c, 0x00, 0x00, 0x29, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    #[test]
    fn domain_name_plain() {
        let mut buffer = Cursor::new(SAMPLE);
        buffer.set_position(12);

        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut buffer).is_ok());
        assert_eq!(dn.0, "google.com");
        assert_eq!(buffer.position(), 24);
    }

    #[test]
    fn domain_name_pure_pointer() {
        let mut buffer = Cursor::new(SAMPLE);
        buffer.set_position(28);

        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut buffer).is_ok());
        assert_eq!(dn.0, "google.com");
        assert_eq!(buffer.position(), 30);
    }

    #[test]
    fn domain_name_label_then_pointer() {
        let mut buffer = Cursor::new(SAMPLE);
        buffer.set_position(40);

        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut buffer).is_ok());
        assert_eq!(dn.0, "ns1.google.com");
        assert_eq!(buffer.position(), 45);
    }

    #[test]
    fn domain_name_rejects_pointer_cycle() {
        // offset 0 points to itself
        let sample: &[u8] = &[0xc0, 0x00];
        let mut buffer = Cursor::new(sample);

        let mut dn = DomainName::default();
        assert!(dn.from_network_bytes(&mut buffer).is_err());
    }

    #[test]
    fn domain_name_round_trip() {
        let dn = DomainName::try_from("www.example.com").unwrap();
        let mut buffer: Vec<u8> = Vec::new();
        dn.to_network_bytes(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let mut decoded = DomainName::default();
        decoded.from_network_bytes(&mut cursor).unwrap();

        assert_eq!(decoded, dn);
    }

    #[test]
    fn empty_label_reports_format_error() {
        let dn = DomainName("a..b".to_string());
        let mut buffer: Vec<u8> = Vec::new();

        let err = dn.to_network_bytes(&mut buffer).unwrap_err();
        let dns_err = DNSError::from(err);
        assert!(matches!(dns_err, DNSError::Format));
    }

    #[test]
    fn oversized_name_reports_size_limit_exceeded() {
        let label = "a".repeat(63);
        let dn = DomainName(std::iter::repeat(label).take(5).collect::<Vec<_>>().join("."));
        let mut buffer: Vec<u8> = Vec::new();

        let err = dn.to_network_bytes(&mut buffer).unwrap_err();
        let dns_err = DNSError::from(err);
        assert!(matches!(dns_err, DNSError::SizeLimitExceeded));
    }

    #[test]
    fn character_string_round_trip() {
        let cs = CharacterString::from("hello world");
        let mut buffer: Vec<u8> = Vec::new();
        cs.to_network_bytes(&mut buffer).unwrap();

        let mut cursor = Cursor::new(buffer.as_slice());
        let mut decoded = CharacterString::default();
        decoded.from_network_bytes(&mut cursor).unwrap();

        assert_eq!(decoded, cs);
    }
}
