use crate::Error;
use nom::{
    bytes::complete::take,
    number::complete::{be_u16, be_u32, be_u8},
    IResult,
};

type ParseResult<'a, T> = IResult<&'a [u8], T, nom::error::Error<&'a [u8]>>;

/// A wire structure of the keytab format.
///
/// Decoding goes through a shared [`Cursor`], so a parent learns how far each
/// child advanced without re-parsing it. Encoding appends to a caller buffer.
pub trait Codec: Sized {
    fn decode_from(cursor: &mut Cursor<'_>) -> anyhow::Result<Self>;

    fn encode_into(&self, buf: &mut Vec<u8>) -> anyhow::Result<()>;

    /// Number of bytes this value occupies on the wire according to its own
    /// length fields. A stale `KeytabEntry::size` makes this stale too, so
    /// encoding never uses it to size buffers.
    fn consumed_size(&self) -> usize;

    /// Decodes one value from the start of `buf`, returning it with the
    /// number of bytes consumed.
    fn decode(buf: &[u8]) -> anyhow::Result<(Self, usize)> {
        let mut cursor = Cursor::new(buf);
        let value = Self::decode_from(&mut cursor)?;
        Ok((value, cursor.position()))
    }

    fn encode(&self) -> anyhow::Result<Vec<u8>> {
        let mut buf = vec![];
        self.encode_into(&mut buf)?;
        Ok(buf)
    }
}

/// Read position over an immutable input buffer. All bounds checks of the
/// codec happen here: any read past the end is `KRB5_KT_TRUNCATED`.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    position: usize,
}

macro_rules! read_int {
    ($fn:ident, $type:ident, $parser:ident) => {
        pub fn $fn(&mut self) -> anyhow::Result<$type> {
            let result = $parser(self.rest());
            self.advance(result)
        }
    };
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    read_int!(read_u8, u8, be_u8);
    read_int!(read_u16, u16, be_u16);
    read_int!(read_u32, u32, be_u32);

    pub fn read_bytes(&mut self, size: usize) -> anyhow::Result<&'a [u8]> {
        let result = take(size)(self.rest());
        self.advance(result)
    }

    /// Splits the next `size` bytes off as their own cursor and moves past
    /// them. Reads on the returned cursor cannot run beyond the window.
    pub fn window(&mut self, size: usize) -> anyhow::Result<Cursor<'a>> {
        self.read_bytes(size).map(Cursor::new)
    }

    fn rest(&self) -> &'a [u8] {
        &self.buf[self.position..]
    }

    fn advance<T>(&mut self, result: ParseResult<'a, T>) -> anyhow::Result<T> {
        match result {
            Ok((rest, value)) => {
                self.position = self.buf.len() - rest.len();
                Ok(value)
            }
            Err(_) => Err(Error::KRB5_KT_TRUNCATED)?,
        }
    }
}
