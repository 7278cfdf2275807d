use crate::{
    codec::{Codec, Cursor},
    Error, Keyblock, Principal, Timestamp,
};

pub type Kvno = u32;

const SIZE_FIELD_SIZE: usize = 4;
const VNO_SIZE: usize = 4;

/// One keytab record.
///
/// `size` is the length of everything after the size field. Decoding takes
/// it from the stream; encoding always writes the freshly computed body
/// length. After changing any other field call [`recompute_size`] so the
/// stored value (used by [`Codec::consumed_size`] and by equality) matches
/// what will be written.
///
/// [`recompute_size`]: KeytabEntry::recompute_size
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeytabEntry {
    pub size: u32,
    pub principal: Principal,
    pub timestamp: Timestamp,
    pub vno8: u8,
    pub key: Keyblock,
    pub vno: Kvno,
}

impl KeytabEntry {
    pub fn new(
        principal: Principal,
        timestamp: Timestamp,
        kvno: Kvno,
        key: Keyblock,
    ) -> anyhow::Result<Self> {
        let mut entry = Self {
            size: 0,
            principal,
            timestamp,
            // The 8-bit field keeps the low byte, as MIT does.
            vno8: kvno as u8,
            key,
            vno: kvno,
        };
        entry.recompute_size()?;
        Ok(entry)
    }

    /// The 32-bit key version overrides the 8-bit one unless it is zero.
    pub fn kvno(&self) -> Kvno {
        if self.vno != 0 {
            self.vno
        } else {
            self.vno8.into()
        }
    }

    /// Overwrites `size` with the length of the body as it would be encoded
    /// now. Idempotent.
    pub fn recompute_size(&mut self) -> anyhow::Result<()> {
        let mut body = vec![];
        self.encode_body(&mut body)?;
        self.size = body_size(body.len())?;
        Ok(())
    }

    fn encode_body(&self, buf: &mut Vec<u8>) -> anyhow::Result<()> {
        self.principal.encode_into(buf)?;
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.push(self.vno8);
        self.key.encode_into(buf)?;
        buf.extend_from_slice(&self.vno.to_be_bytes());
        Ok(())
    }
}

fn body_size(length: usize) -> anyhow::Result<u32> {
    Ok(u32::try_from(length).map_err(|_| Error::KRB5_KT_LENGTH_MISMATCH)?)
}

impl Codec for KeytabEntry {
    // A record is a 32-bit size followed by `size` bytes:
    //
    // entry ::=
    //     principal
    //     timestamp (32 bits)
    //     key version (8 bits)
    //     enctype (16 bits)
    //     key length (16 bits)
    //     key contents
    //     key version (32 bits) [optional]
    // principal ::=
    //     count of components (16 bits)
    //     realm (data)
    //     component1 (data)
    //     ...
    //     name type (32 bits)
    // data ::=
    //     length (16 bits)
    //     value (length bytes)
    //
    // There is no flag for the trailing 32-bit key version. It is present
    // when at least 4 bytes remain in the record after the key, otherwise it
    // reads as 0. Anything after it inside the record is skipped.
    fn decode_from(cursor: &mut Cursor<'_>) -> anyhow::Result<Self> {
        let size = cursor.read_u32()?;
        let mut record = cursor.window(size as usize)?;

        let principal = Principal::decode_from(&mut record)?;
        let timestamp = record.read_u32()?;
        let vno8 = record.read_u8()?;
        let key = Keyblock::decode_from(&mut record)?;
        let vno = if record.remaining() >= VNO_SIZE {
            record.read_u32()?
        } else {
            0
        };

        Ok(Self {
            size,
            principal,
            timestamp,
            vno8,
            key,
            vno,
        })
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> anyhow::Result<()> {
        let start = buf.len();
        buf.extend_from_slice(&[0; SIZE_FIELD_SIZE]);
        self.encode_body(buf)?;
        let size = body_size(buf.len() - start - SIZE_FIELD_SIZE)?;
        buf[start..start + SIZE_FIELD_SIZE].copy_from_slice(&size.to_be_bytes());
        Ok(())
    }

    fn consumed_size(&self) -> usize {
        SIZE_FIELD_SIZE + self.size as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Data, Enctype, NameType};

    const KEY: &str = "0102030405060708090a0c0b0d0e0f10";

    fn krbtgt_entry() -> KeytabEntry {
        let mut entry = KeytabEntry {
            size: 0,
            principal: Principal {
                component_count: 1,
                realm: Data {
                    length: 17,
                    data: b"TESTSEGMENT.local".to_vec(),
                },
                components: vec![Data {
                    length: 6,
                    data: b"krbtgt".to_vec(),
                }],
                name_type: NameType::UNKNOWN,
            },
            timestamp: 0,
            vno8: 0,
            key: Keyblock::new(Enctype::AES256_CTS_HMAC_SHA1_96, hex::decode(KEY).unwrap()),
            vno: 0,
        };
        entry.recompute_size().unwrap();
        entry
    }

    // The same record as written by an implementation that omits the 32-bit
    // key version.
    fn krbtgt_bytes_without_vno() -> Vec<u8> {
        let realm = hex::encode("TESTSEGMENT.local");
        let component = hex::encode("krbtgt");
        let body = [
            "0001",
            "0011",
            realm.as_str(),
            "0006",
            component.as_str(),
            "00000000",
            "00000000",
            "00",
            "0012",
            "0010",
            KEY,
        ]
        .concat();
        hex::decode(format!("{:08x}{}", body.len() / 2, body)).unwrap()
    }

    #[test]
    fn size_excludes_the_size_field() {
        let entry = krbtgt_entry();
        assert_eq!(entry.size, 62);
        let bytes = entry.encode().unwrap();
        assert_eq!(bytes.len(), 66);
        assert_eq!(&bytes[..4], &62u32.to_be_bytes());
        assert_eq!(entry.consumed_size(), bytes.len());
    }

    #[test]
    fn krbtgt_entry_is_stable_across_encode_decode() {
        let entry = krbtgt_entry();
        let bytes = entry.encode().unwrap();
        let (decoded, consumed) = KeytabEntry::decode(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, entry);
        assert_eq!(decoded.encode().unwrap(), bytes);
    }

    #[test]
    fn missing_extended_vno_reads_as_zero() {
        let bytes = krbtgt_bytes_without_vno();
        let (decoded, consumed) = KeytabEntry::decode(&bytes).unwrap();
        assert_eq!(decoded.size, 58);
        assert_eq!(consumed, 62);
        assert_eq!(decoded.vno, 0);
    }

    #[test]
    fn encoding_adds_the_missing_extended_vno_once() {
        let (first, _) = KeytabEntry::decode(&krbtgt_bytes_without_vno()).unwrap();

        // Encoding always writes the 32-bit version, so the record grows by
        // exactly four bytes. This is the expected normalisation.
        let grown = first.encode().unwrap();
        assert_eq!(grown.len(), krbtgt_bytes_without_vno().len() + 4);
        let (second, _) = KeytabEntry::decode(&grown).unwrap();
        assert_eq!(second.size, first.size + 4);
        assert_eq!(second.vno, 0);
        assert_ne!(second, first);

        // From then on the bytes are stable.
        assert_eq!(second.encode().unwrap(), grown);
        assert_eq!(second, krbtgt_entry());
    }

    #[test]
    fn fewer_than_four_trailing_bytes_are_not_a_vno() {
        let mut bytes = krbtgt_bytes_without_vno();
        bytes.extend_from_slice(&[0xff, 0xff, 0xff]);
        bytes[3] += 3;
        let (decoded, consumed) = KeytabEntry::decode(&bytes).unwrap();
        assert_eq!(decoded.vno, 0);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn extended_vno_overrides_legacy_vno() {
        let mut entry = krbtgt_entry();
        entry.vno8 = 1;
        entry.vno = 257;
        entry.recompute_size().unwrap();
        let (decoded, _) = KeytabEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_eq!(decoded.vno, 257);
        assert_eq!(decoded.kvno(), 257);

        let (legacy, _) = KeytabEntry::decode(&krbtgt_bytes_without_vno()).unwrap();
        assert_eq!(legacy.kvno(), 0);
    }

    #[test]
    fn new_truncates_legacy_vno() {
        let entry = KeytabEntry::new(
            Principal::new("EXAMPLE.COM", ["host", "a.example.com"], NameType::SRV_HST),
            1_700_000_000,
            258,
            Keyblock::new(Enctype::AES128_CTS_HMAC_SHA1_96, vec![7; 16]),
        )
        .unwrap();
        assert_eq!(entry.vno8, 2);
        assert_eq!(entry.vno, 258);
        assert_eq!(entry.consumed_size(), entry.encode().unwrap().len());
    }

    #[test]
    fn padding_after_extended_vno_is_skipped() {
        let mut bytes = krbtgt_entry().encode().unwrap();
        bytes.extend_from_slice(&[0; 8]);
        bytes[3] += 8;
        bytes.extend_from_slice(b"next");
        let (decoded, consumed) = KeytabEntry::decode(&bytes).unwrap();
        assert_eq!(consumed, 74);
        assert_eq!(decoded.size, 70);
        assert_eq!(decoded.vno, 0);
    }

    #[test]
    fn record_size_bounds_nested_fields() {
        let mut bytes = krbtgt_entry().encode().unwrap();
        // Shrink the declared size so the key block crosses the boundary,
        // with plenty of bytes still available in the buffer.
        bytes[3] = 40;
        let err = KeytabEntry::decode(&bytes).unwrap_err();
        assert!(Error::KRB5_KT_TRUNCATED.matches(&err));
    }

    #[test]
    fn every_truncation_is_detected() {
        let bytes = krbtgt_entry().encode().unwrap();
        for end in 0..bytes.len() {
            let err = KeytabEntry::decode(&bytes[..end]).unwrap_err();
            assert!(Error::KRB5_KT_TRUNCATED.matches(&err), "cut at {}", end);
        }
    }

    #[test]
    fn stale_size_breaks_equality_until_recomputed() {
        let mut entry = krbtgt_entry();
        entry.principal.components[0] = Data::new("HTTP");
        let (decoded, _) = KeytabEntry::decode(&entry.encode().unwrap()).unwrap();
        assert_ne!(decoded, entry);

        entry.recompute_size().unwrap();
        assert_eq!(entry.size, 60);
        assert_eq!(decoded, entry);
        entry.recompute_size().unwrap();
        assert_eq!(entry.size, 60);
    }

    #[test]
    fn tampered_lengths_are_rejected() {
        let mut entry = krbtgt_entry();
        entry.principal.realm.length = 3;
        assert!(Error::KRB5_KT_LENGTH_MISMATCH.matches(&entry.encode().unwrap_err()));
        assert!(Error::KRB5_KT_LENGTH_MISMATCH.matches(&entry.recompute_size().unwrap_err()));

        let mut entry = krbtgt_entry();
        entry.principal.components[0].length = 7;
        assert!(Error::KRB5_KT_LENGTH_MISMATCH.matches(&entry.encode().unwrap_err()));

        let mut entry = krbtgt_entry();
        entry.key.contents.data.pop();
        assert!(Error::KRB5_KT_LENGTH_MISMATCH.matches(&entry.encode().unwrap_err()));
    }
}
