use super::Keytab;
use crate::codec::Codec;
use anyhow::Context;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    os::unix::fs::OpenOptionsExt,
    path::Path,
};
use tracing::debug;

// Keytabs hold long-term keys, so new files are readable by the owner only.
const KEYTAB_FILE_MODE: u32 = 0o600;

impl Keytab {
    /// Reads and decodes the whole file at `path`.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let buf =
            fs::read(path).with_context(|| format!("while reading keytab {}", path.display()))?;
        let (keytab, consumed) = Self::decode(&buf)?;
        debug!(
            path = %path.display(),
            version = keytab.version,
            entries = keytab.entries.len(),
            bytes = consumed,
            "loaded keytab"
        );
        Ok(keytab)
    }

    /// Encodes the keytab and replaces the contents of the file at `path`.
    /// Nothing is written when encoding fails.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let buf = self.encode()?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(KEYTAB_FILE_MODE)
            .open(path)
            .with_context(|| format!("while writing keytab {}", path.display()))?;
        file.write_all(&buf)
            .with_context(|| format!("while writing keytab {}", path.display()))?;
        debug!(
            path = %path.display(),
            entries = self.entries.len(),
            bytes = buf.len(),
            "saved keytab"
        );
        Ok(())
    }
}
