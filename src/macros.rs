// auto-implement the ToFromNetworkOrder trait for simple discriminant-backed enums
#[macro_export]
macro_rules! derive_enum {
    ($t:ty, u8) => {
        impl<'a> $crate::network_order::ToFromNetworkOrder<'a> for $t {
            fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
                use byteorder::WriteBytesExt;
                buffer.write_u8(*self as u8)?;
                Ok(1)
            }

            fn from_network_bytes(
                &mut self,
                buffer: &mut std::io::Cursor<&'a [u8]>,
            ) -> $crate::error::DNSResult<()> {
                use byteorder::ReadBytesExt;
                let value = buffer.read_u8()?;
                *self = <$t>::try_from(value).map_err($crate::error::DNSError::from)?;
                Ok(())
            }
        }
    };

    ($t:ty, u16) => {
        impl<'a> $crate::network_order::ToFromNetworkOrder<'a> for $t {
            fn to_network_bytes(&self, buffer: &mut Vec<u8>) -> std::io::Result<usize> {
                use byteorder::{BigEndian, WriteBytesExt};
                buffer.write_u16::<BigEndian>(*self as u16)?;
                Ok(2)
            }

            fn from_network_bytes(
                &mut self,
                buffer: &mut std::io::Cursor<&'a [u8]>,
            ) -> $crate::error::DNSResult<()> {
                use byteorder::{BigEndian, ReadBytesExt};
                let value = buffer.read_u16::<BigEndian>()?;
                *self = <$t>::try_from(value).map_err($crate::error::DNSError::from)?;
                Ok(())
            }
        }
    };
}

// convenience helper for codec unit tests: round-trip a value through
// to_network_bytes and hand back the buffer alongside the byte count
#[macro_export]
macro_rules! test_to_network {
    ($data:ident) => {{
        let mut buffer: Vec<u8> = Vec::new();
        let bytes_written = $data.to_network_bytes(&mut buffer).unwrap();

        (buffer, bytes_written)
    }};
}
