use crate::{
    codec::{Codec, Cursor},
    Error,
};

const LENGTH_SIZE: usize = 2;

/// A counted octet string: a 16-bit length followed by that many bytes.
/// Realms, principal components and key contents all use this encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Data {
    pub length: u16,
    pub data: Vec<u8>,
}

impl Data {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        let data = data.into();
        // Anything longer than u16::MAX keeps a mismatched length so that
        // encoding fails instead of truncating.
        let length = u16::try_from(data.len()).unwrap_or(u16::MAX);
        Self { length, data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Codec for Data {
    fn decode_from(cursor: &mut Cursor<'_>) -> anyhow::Result<Self> {
        let length = cursor.read_u16()?;
        let data = cursor.read_bytes(length.into())?.to_vec();
        Ok(Self { length, data })
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> anyhow::Result<()> {
        if usize::from(self.length) != self.data.len() {
            Err(Error::KRB5_KT_LENGTH_MISMATCH)?
        }
        buf.extend_from_slice(&self.length.to_be_bytes());
        buf.extend_from_slice(&self.data);
        Ok(())
    }

    fn consumed_size(&self) -> usize {
        LENGTH_SIZE + usize::from(self.length)
    }
}
