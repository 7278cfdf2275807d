use super::Enctype;
use crate::{
    codec::{Codec, Cursor},
    Data,
};

const ENCTYPE_SIZE: usize = 2;

/// Key material: an enctype tag and the raw key bytes.
///
/// Key length is not checked against the enctype.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyblock {
    pub enctype: Enctype,
    pub contents: Data,
}

impl Keyblock {
    pub fn new(enctype: Enctype, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            enctype,
            contents: Data::new(contents),
        }
    }
}

impl Codec for Keyblock {
    fn decode_from(cursor: &mut Cursor<'_>) -> anyhow::Result<Self> {
        let enctype = Enctype(cursor.read_u16()?);
        let contents = Data::decode_from(cursor)?;
        Ok(Self { enctype, contents })
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> anyhow::Result<()> {
        buf.extend_from_slice(&self.enctype.0.to_be_bytes());
        self.contents.encode_into(buf)
    }

    fn consumed_size(&self) -> usize {
        ENCTYPE_SIZE + self.contents.consumed_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn aes256_key() -> Keyblock {
        let key = hex::decode("0102030405060708090a0c0b0d0e0f10").unwrap();
        Keyblock::new(Enctype::AES256_CTS_HMAC_SHA1_96, key)
    }

    #[test]
    fn encodes_tag_then_counted_key() {
        let bytes = aes256_key().encode().unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "001200100102030405060708090a0c0b0d0e0f10"
        );
        assert_eq!(bytes.len(), aes256_key().consumed_size());
    }

    #[test]
    fn round_trips_with_consumed_size() {
        let keyblock = aes256_key();
        let (decoded, consumed) = Keyblock::decode(&keyblock.encode().unwrap()).unwrap();
        assert_eq!(decoded, keyblock);
        assert_eq!(consumed, 20);
    }

    #[test]
    fn unknown_enctype_round_trips() {
        let keyblock = Keyblock::new(Enctype(0xfffe), vec![0xaa; 3]);
        let (decoded, _) = Keyblock::decode(&keyblock.encode().unwrap()).unwrap();
        assert_eq!(decoded.enctype, Enctype(0xfffe));
        assert_eq!(decoded, keyblock);
    }

    #[test]
    fn tampered_key_length_is_rejected() {
        let mut keyblock = aes256_key();
        keyblock.contents.length = 32;
        let err = keyblock.encode().unwrap_err();
        assert!(Error::KRB5_KT_LENGTH_MISMATCH.matches(&err));
    }

    #[test]
    fn every_truncation_is_detected() {
        let bytes = aes256_key().encode().unwrap();
        for end in 0..bytes.len() {
            let err = Keyblock::decode(&bytes[..end]).unwrap_err();
            assert!(Error::KRB5_KT_TRUNCATED.matches(&err), "cut at {}", end);
        }
    }
}
