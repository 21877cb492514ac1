//! Small stand-alone helpers shared across the wire codec and the CLI.
use std::char;
use std::io::Cursor;

/// Top two bits `11` mark a compression pointer (RFC 1035 §4.1.4).
pub fn is_pointer(b: u8) -> bool {
    b & 0b1100_0000 == 0b1100_0000
}

/// Top two bits `01`/`10` mark an extended label type; neither is defined
/// by RFC 1035 and both are unsupported here.
pub fn is_extended_label(b: u8) -> bool {
    matches!(b & 0b1100_0000, 0b0100_0000 | 0b1000_0000)
}

// Debug utility: dump a cursor's backing buffer with index/hex/ascii rows.
pub fn pretty_cursor(buffer: &Cursor<&[u8]>) {
    let reference = buffer.get_ref();

    eprintln!("position={}", buffer.position());

    eprint!("index:");
    for i in 0..reference.len() {
        eprint!("{:02} ", i);
    }
    eprintln!();

    eprint!("byte :");
    for x in *reference {
        eprint!("{:02X} ", x);
    }
    eprintln!();

    eprint!("ascii:");
    for x in *reference {
        let c = char::from_u32(*x as u32).unwrap();
        if c.is_ascii_alphanumeric() {
            eprint!("{:>2} ", c);
        } else {
            eprint!("   ");
        }
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_detection() {
        assert!(is_pointer(0xC0));
        assert!(is_pointer(0xFF));
        assert!(!is_pointer(0x3F));
    }

    #[test]
    fn extended_label_detection() {
        assert!(is_extended_label(0x40));
        assert!(is_extended_label(0x80));
        assert!(!is_extended_label(0x00));
        assert!(!is_extended_label(0xC0));
    }
}
