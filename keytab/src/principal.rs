use crate::{
    codec::{Codec, Cursor},
    Data, Error,
};
use std::{mem, str::Chars};

const REALM_SEP: char = '@';
const COMPONENT_SEP: char = '/';
const KRB5_TGS_NAME: &str = "krbtgt";
const KRB5_WELLKNOWN_NAMESTR: &str = "WELLKNOWN";

const COMPONENT_COUNT_SIZE: usize = 2;
const NAME_TYPE_SIZE: usize = 4;

/// The principal part of a keytab entry.
///
/// `component_count` is stored as read and is checked against `components`
/// when encoding; it is never adjusted silently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    pub component_count: u16,
    pub realm: Data,
    pub components: Vec<Data>,
    pub name_type: NameType,
}

impl Principal {
    pub fn new<C>(realm: &str, components: C, name_type: NameType) -> Self
    where
        C: IntoIterator,
        C::Item: Into<Vec<u8>>,
    {
        let components: Vec<Data> = components.into_iter().map(Data::new).collect();
        Self {
            component_count: u16::try_from(components.len()).unwrap_or(u16::MAX),
            realm: Data::new(realm),
            components,
            name_type,
        }
    }

    /// Parses `comp1/comp2@REALM`. The realm is mandatory since a keytab has
    /// no default realm to fall back on. Quoted characters are read back the
    /// way [`Principal::unparse_name`] writes them.
    pub fn parse_name(name: &str) -> anyhow::Result<Self> {
        let mut components = vec![];
        let mut current = vec![];
        let mut in_realm = false;
        let mut chars = name.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => Self::unquote(&mut chars, &mut current)?,
                COMPONENT_SEP if !in_realm => components.push(mem::take(&mut current)),
                REALM_SEP if !in_realm => {
                    components.push(mem::take(&mut current));
                    in_realm = true;
                }
                COMPONENT_SEP | REALM_SEP => Err(Error::KRB5_PARSE_MALFORMED)?,
                c => current.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes()),
            }
        }
        if !in_realm || components == [Vec::<u8>::new()] {
            Err(Error::KRB5_PARSE_MALFORMED)?
        }
        let name_type = Self::infer_principal_type(&components);
        let mut principal = Self::new("", components, name_type);
        principal.realm = Data::new(current);
        Ok(principal)
    }

    fn unquote(chars: &mut Chars<'_>, buf: &mut Vec<u8>) -> anyhow::Result<()> {
        let c = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('b') => '\u{8}',
            Some('0') => '\0',
            Some('x') => {
                let digits: String = chars.by_ref().take(2).collect();
                if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                    Err(Error::KRB5_PARSE_MALFORMED)?
                }
                buf.push(u8::from_str_radix(&digits, 16)?);
                return Ok(());
            }
            Some(c) => c,
            None => Err(Error::KRB5_PARSE_MALFORMED)?,
        };
        buf.extend_from_slice(c.encode_utf8(&mut [0; 4]).as_bytes());
        Ok(())
    }

    fn infer_principal_type(components: &[Vec<u8>]) -> NameType {
        if components.len() == 2 && components[0] == KRB5_TGS_NAME.as_bytes() {
            NameType::SRV_INST
        } else if components.len() >= 2 && components[0] == KRB5_WELLKNOWN_NAMESTR.as_bytes() {
            NameType::WELLKNOWN
        } else {
            NameType::PRINCIPAL
        }
    }

    /// Renders `comp1/comp2@REALM`. Separators, backslashes and control
    /// characters inside a field are quoted as MIT does, and bytes that are
    /// not UTF-8 are written as `\xNN`, so distinct principals never render
    /// alike.
    pub fn unparse_name(&self) -> String {
        let mut name = String::new();
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                name.push(COMPONENT_SEP);
            }
            Self::quote(component.as_bytes(), &mut name);
        }
        name.push(REALM_SEP);
        Self::quote(self.realm.as_bytes(), &mut name);
        name
    }

    fn quote(bytes: &[u8], out: &mut String) {
        for chunk in bytes.utf8_chunks() {
            for c in chunk.valid().chars() {
                match c {
                    COMPONENT_SEP | REALM_SEP | '\\' => {
                        out.push('\\');
                        out.push(c);
                    }
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\u{8}' => out.push_str("\\b"),
                    '\0' => out.push_str("\\0"),
                    c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u8)),
                    c => out.push(c),
                }
            }
            for b in chunk.invalid() {
                out.push_str(&format!("\\x{:02x}", b));
            }
        }
    }

    /// Same realm and components, in order. Name type is not compared.
    pub fn compare(&self, other: &Self) -> bool {
        self.realm.data == other.realm.data
            && self.components.len() == other.components.len()
            && self
                .components
                .iter()
                .zip(&other.components)
                .all(|(c1, c2)| c1.data == c2.data)
    }
}

impl Codec for Principal {
    fn decode_from(cursor: &mut Cursor<'_>) -> anyhow::Result<Self> {
        let component_count = cursor.read_u16()?;
        let realm = Data::decode_from(cursor)?;
        // Each component takes at least its two length bytes.
        let mut components =
            Vec::with_capacity(usize::from(component_count).min(cursor.remaining() / 2));
        for _ in 0..component_count {
            components.push(Data::decode_from(cursor)?);
        }
        let name_type = NameType(cursor.read_u32()?);
        Ok(Self {
            component_count,
            realm,
            components,
            name_type,
        })
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> anyhow::Result<()> {
        if usize::from(self.component_count) != self.components.len() {
            Err(Error::KRB5_KT_LENGTH_MISMATCH)?
        }
        buf.extend_from_slice(&self.component_count.to_be_bytes());
        self.realm.encode_into(buf)?;
        for component in &self.components {
            component.encode_into(buf)?;
        }
        buf.extend_from_slice(&self.name_type.0.to_be_bytes());
        Ok(())
    }

    fn consumed_size(&self) -> usize {
        COMPONENT_COUNT_SIZE
            + self.realm.consumed_size()
            + self
                .components
                .iter()
                .map(Codec::consumed_size)
                .sum::<usize>()
            + NAME_TYPE_SIZE
    }
}

/// Principal name type. Opaque to the codec; the constants are the
/// registered values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NameType(pub u32);

macro_rules! name_type {
    ($name_type:ident, $int:expr) => {
        pub const $name_type: NameType = NameType($int);
    };
}

impl NameType {
    // Name type not known
    name_type!(UNKNOWN, 0);
    // Just the name of the principal as in DCE, or for users
    name_type!(PRINCIPAL, 1);
    // Service and other unique instance (krbtgt)
    name_type!(SRV_INST, 2);
    // Service with host name as instance (telnet, rcommands)
    name_type!(SRV_HST, 3);
    // Service with host as remaining components
    name_type!(SRV_XHST, 4);
    // Unique ID
    name_type!(UID, 5);
    // PKINIT
    name_type!(X500_PRINCIPAL, 6);
    // Name in form of SMTP email name
    name_type!(SMTP_NAME, 7);
    // Windows 2000 UPN
    name_type!(ENTERPRISE_PRINCIPAL, 10);
    // Well-known (special) principal
    name_type!(WELLKNOWN, 11);
}
