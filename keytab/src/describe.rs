use crate::{Data, Keyblock, Keytab, KeytabEntry, Timestamp};
use chrono::{SecondsFormat, TimeZone, Utc};
use std::fmt;

const GUIDE: &str = " │ ";

/// Renders a value as an indented tree, one field per line. Every nesting
/// level adds one ` │ ` guide.
pub trait Describe {
    fn describe(&self, indent: usize) -> String;
}

struct Tree {
    prompt: String,
    out: String,
}

impl Tree {
    fn new(indent: usize) -> Self {
        Self {
            prompt: GUIDE.repeat(indent),
            out: String::new(),
        }
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        self.out.push_str(&self.prompt);
        self.out.push_str(&args.to_string());
        self.out.push('\n');
    }

    fn nest(&mut self, subtree: String) {
        self.out.push_str(&subtree);
    }
}

/// Printable ASCII as is, every other byte as `\xNN`.
pub fn printable(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| match b {
            0x20..=0x7e => (b as char).to_string(),
            _ => format!("\\x{:02x}", b),
        })
        .collect()
}

fn rfc3339(timestamp: Timestamp) -> String {
    match Utc.timestamp_opt(timestamp.into(), 0).single() {
        Some(time) => time.to_rfc3339_opts(SecondsFormat::Secs, true),
        None => timestamp.to_string(),
    }
}

fn label(id: Option<usize>) -> String {
    id.map(|id| format!(" #{}", id)).unwrap_or_default()
}

fn describe_data(data: &Data, indent: usize, id: Option<usize>) -> String {
    let mut tree = Tree::new(indent);
    tree.line(format_args!("<Data{}>", label(id)));
    tree.line(format_args!(" │ Length : 0x{:04x} ({})", data.length, data.length));
    tree.line(format_args!(" │ Data   :"));
    tree.line(format_args!(" │  │ Hex : {}", hex::encode(&data.data)));
    tree.line(format_args!(" │  │ Raw : {}", printable(&data.data)));
    tree.line(format_args!(" │  └─"));
    tree.line(format_args!(" └─"));
    tree.out
}

fn describe_entry(entry: &KeytabEntry, indent: usize, id: Option<usize>) -> String {
    let principal = &entry.principal;
    let mut tree = Tree::new(indent);
    tree.line(format_args!("<KeytabEntry{}>", label(id)));
    tree.line(format_args!(
        " │ Size          : 0x{:08x} ({})",
        entry.size, entry.size
    ));
    tree.line(format_args!(
        " │ NumComponents : 0x{:04x} ({})",
        principal.component_count, principal.component_count
    ));
    tree.line(format_args!(
        " │ Realm         : {}",
        printable(principal.realm.as_bytes())
    ));
    tree.line(format_args!(" │ Components    :"));
    for (i, component) in principal.components.iter().enumerate() {
        tree.nest(describe_data(component, indent + 2, Some(i)));
        tree.line(format_args!(" │  └─"));
    }
    tree.line(format_args!(
        " │ NameType      : 0x{:08x} ({})",
        principal.name_type.0, principal.name_type.0
    ));
    tree.line(format_args!(
        " │ Timestamp     : 0x{:08x} ({})",
        entry.timestamp,
        rfc3339(entry.timestamp)
    ));
    tree.line(format_args!(
        " │ Vno8          : 0x{:02x} ({})",
        entry.vno8, entry.vno8
    ));
    tree.line(format_args!(" │ Key           :"));
    tree.nest(entry.key.describe(indent + 2));
    tree.line(format_args!(
        " │ Vno           : 0x{:08x} ({})",
        entry.vno, entry.vno
    ));
    tree.line(format_args!(" └─"));
    tree.out
}

impl Describe for Data {
    fn describe(&self, indent: usize) -> String {
        describe_data(self, indent, None)
    }
}

impl Describe for Keyblock {
    fn describe(&self, indent: usize) -> String {
        let mut tree = Tree::new(indent);
        tree.line(format_args!("<Keyblock>"));
        tree.line(format_args!(
            " │ Type : 0x{:04x} ({}) ({})",
            self.enctype.0, self.enctype, self.enctype.0
        ));
        tree.line(format_args!(" │ Key  :"));
        tree.nest(describe_data(&self.contents, indent + 2, None));
        tree.line(format_args!(" └─"));
        tree.out
    }
}

impl Describe for KeytabEntry {
    fn describe(&self, indent: usize) -> String {
        describe_entry(self, indent, None)
    }
}

impl Describe for Keytab {
    fn describe(&self, indent: usize) -> String {
        let mut tree = Tree::new(indent);
        tree.line(format_args!("<Keytab>"));
        tree.line(format_args!(
            " │ FileFormatVersion : 0x{:04x} ({})",
            self.version, self.version
        ));
        tree.line(format_args!(
            " │ Entries           : {}",
            self.entries.len()
        ));
        for (i, entry) in self.entries.iter().enumerate() {
            tree.nest(describe_entry(entry, indent + 1, Some(i)));
        }
        tree.line(format_args!(" └─"));
        tree.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Enctype, NameType, Principal};

    #[test]
    fn escapes_non_printable_bytes() {
        assert_eq!(printable(b"krbtgt"), "krbtgt");
        assert_eq!(printable(&[b'a', 0x00, 0x7f, b'~']), "a\\x00\\x7f~");
    }

    #[test]
    fn describes_data() {
        let expected = [
            " │ <Data>",
            " │  │ Length : 0x0002 (2)",
            " │  │ Data   :",
            " │  │  │ Hex : 6101",
            " │  │  │ Raw : a\\x01",
            " │  │  └─",
            " │  └─",
            "",
        ]
        .join("\n");
        assert_eq!(Data::new(vec![b'a', 1]).describe(1), expected);
    }

    #[test]
    fn describes_keyblock_with_enctype_name() {
        let keyblock = Keyblock::new(Enctype::AES256_CTS_HMAC_SHA1_96, vec![1, 2]);
        let text = keyblock.describe(0);
        assert!(text.starts_with("<Keyblock>\n"));
        assert!(text.contains(" │ Type : 0x0012 (aes256-cts-hmac-sha1-96) (18)\n"));
        assert!(text.contains(" │  │  │ Hex : 0102\n"));

        let text = Keyblock::new(Enctype(0x7777), vec![]).describe(0);
        assert!(text.contains("(etype 30583)"));
    }

    #[test]
    fn describes_keytab_entries_in_order() {
        let mut keytab = Keytab::default();
        for kvno in [1, 2] {
            keytab.push(
                KeytabEntry::new(
                    Principal::new("TESTSEGMENT.local", ["krbtgt"], NameType::UNKNOWN),
                    0,
                    kvno,
                    Keyblock::new(Enctype::AES256_CTS_HMAC_SHA1_96, vec![0; 16]),
                )
                .unwrap(),
            );
        }
        let text = keytab.describe(0);
        assert!(text.starts_with("<Keytab>\n │ FileFormatVersion : 0x0502 (1282)\n"));
        assert!(text.contains(" │ Entries           : 2\n"));
        let first = text.find(" │ <KeytabEntry #0>").unwrap();
        let second = text.find(" │ <KeytabEntry #1>").unwrap();
        assert!(first < second);
        assert!(text.contains(" │  │ Size          : 0x0000003e (62)\n"));
        assert!(text.contains(" │  │ Realm         : TESTSEGMENT.local\n"));
        assert!(text.contains(" │  │ Timestamp     : 0x00000000 (1970-01-01T00:00:00Z)\n"));
        assert!(text.contains(" │  │ Vno           : 0x00000002 (2)\n"));
        assert!(text.ends_with(" └─\n"));
    }
}
