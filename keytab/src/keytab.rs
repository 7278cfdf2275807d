mod file_data;
mod keytab_entry;

pub use self::keytab_entry::{KeytabEntry, Kvno};
use crate::{
    codec::{Codec, Cursor},
    Conf, Context, Error, Principal,
};
use std::{env, path::PathBuf};
use tracing::debug;

const KRB5_ENV_KTNAME: &str = "KRB5_KTNAME";
const KRB5_ENV_CLIENT_KTNAME: &str = "KRB5_CLIENT_KTNAME";
const DEFKTNAME: &str = "FILE:/etc/krb5.keytab";
const DEFCKTNAME: &str = "FILE:/var/kerberos/krb5/user/%{euid}/client.keytab";
const FILE_PREFIX: &str = "FILE";
const WRFILE_PREFIX: &str = "WRFILE";

const VERSION_SIZE: usize = 2;

pub const KRB5_KT_VNO_1: u16 = 0x0501;
pub const KRB5_KT_VNO: u16 = 0x0502;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormatVersion {
    V1 = KRB5_KT_VNO_1 as isize,
    V2 = KRB5_KT_VNO as isize,
}

impl TryFrom<u16> for FileFormatVersion {
    type Error = anyhow::Error;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            KRB5_KT_VNO_1 => Ok(Self::V1),
            KRB5_KT_VNO => Ok(Self::V2),
            _ => Err(Error::KRB5_KEYTAB_BADVNO)?,
        }
    }
}

/// An in-memory keytab file: a format version and its records, in file
/// order.
///
/// There is no in-place update of a single record. Edit the `entries`,
/// call [`Keytab::recompute_sizes`] and encode the whole keytab again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keytab {
    pub version: u16,
    pub entries: Vec<KeytabEntry>,
}

impl Default for Keytab {
    fn default() -> Self {
        Self::new(KRB5_KT_VNO)
    }
}

impl Keytab {
    pub fn new(version: u16) -> Self {
        Self {
            version,
            entries: vec![],
        }
    }

    pub fn push(&mut self, entry: KeytabEntry) {
        self.entries.push(entry)
    }

    /// Entries whose principal has the same realm and components as
    /// `principal`, in file order.
    pub fn entries_for<'a>(
        &'a self,
        principal: &'a Principal,
    ) -> impl Iterator<Item = &'a KeytabEntry> + 'a {
        self.entries
            .iter()
            .filter(move |entry| entry.principal.compare(principal))
    }

    /// Recomputes the size of every entry, stopping at the first failure.
    /// Entries before the failing one keep their new size.
    pub fn recompute_sizes(&mut self) -> anyhow::Result<()> {
        for entry in &mut self.entries {
            entry.recompute_size()?;
        }
        Ok(())
    }

    /// The decoder accepts any version value; this tells whether it is one
    /// MIT defines.
    pub fn format_version(&self) -> anyhow::Result<FileFormatVersion> {
        FileFormatVersion::try_from(self.version)
    }

    pub fn default_name(context: &Context) -> anyhow::Result<String> {
        Self::resolve_default_name(
            context,
            env::var(KRB5_ENV_KTNAME).ok(),
            Conf::DEFAULT_KEYTAB_NAME,
            DEFKTNAME,
        )
    }

    pub fn client_default_name(context: &Context) -> anyhow::Result<String> {
        Self::resolve_default_name(
            context,
            env::var(KRB5_ENV_CLIENT_KTNAME).ok(),
            Conf::DEFAULT_CLIENT_KEYTAB_NAME,
            DEFCKTNAME,
        )
    }

    fn resolve_default_name(
        context: &Context,
        env_name: Option<String>,
        conf_name: &str,
        fallback: &str,
    ) -> anyhow::Result<String> {
        let name = match env_name {
            Some(name) => name,
            None => Context::expand_path_tokens(
                context
                    .get_string(conf_name)
                    .as_deref()
                    .unwrap_or(fallback),
            )?,
        };
        debug!(%name, "resolved default keytab name");
        Ok(name)
    }

    /// Maps a keytab name such as `FILE:/etc/krb5.keytab` to the path of the
    /// file holding it.
    pub fn resolve_path(name: &str) -> anyhow::Result<PathBuf> {
        let (prefix, residual) = match name.split_once(':') {
            None => return Ok(PathBuf::from(name)),
            // Use `FILE` when prefix is a drive letter
            Some((p, _)) if p.len() == 1 && p.as_bytes()[0].is_ascii_alphabetic() => {
                (FILE_PREFIX, name)
            }
            Some(_) if name.starts_with('/') => (FILE_PREFIX, name),
            Some((prefix, residual)) => (prefix, residual),
        };
        match prefix {
            FILE_PREFIX | WRFILE_PREFIX => Ok(PathBuf::from(residual)),
            _ => Err(Error::KRB5_KT_UNKNOWN_TYPE)?,
        }
    }
}

impl Codec for Keytab {
    // A two-byte version followed by records up to the end of the input.
    // Leftover bytes that do not form a whole record are a truncation error.
    fn decode_from(cursor: &mut Cursor<'_>) -> anyhow::Result<Self> {
        let version = cursor.read_u16()?;
        let mut entries = vec![];
        while !cursor.is_empty() {
            entries.push(KeytabEntry::decode_from(cursor)?);
        }
        Ok(Self { version, entries })
    }

    fn encode_into(&self, buf: &mut Vec<u8>) -> anyhow::Result<()> {
        buf.extend_from_slice(&self.version.to_be_bytes());
        for entry in &self.entries {
            entry.encode_into(buf)?;
        }
        Ok(())
    }

    fn consumed_size(&self) -> usize {
        VERSION_SIZE
            + self
                .entries
                .iter()
                .map(Codec::consumed_size)
                .sum::<usize>()
    }
}
