use std::fmt;

struct EnctypeName {
    enctype: Enctype,
    name: &'static str,
    aliases: &'static [&'static str],
    deprecated: bool,
}

macro_rules! enctype_name {
    ($enctype:ident, $name:expr, [$($alias:expr),*], $deprecated:expr) => {
        EnctypeName {
            enctype: Enctype::$enctype,
            name: $name,
            aliases: &[$($alias),*],
            deprecated: $deprecated,
        }
    };
}

// Names as MIT prints them. Single DES is no longer supported by MIT but
// keeps its names so old keytabs still list readably.
static ENCTYPE_NAMES: [EnctypeName; 15] = [
    enctype_name!(DES_CBC_CRC, "des-cbc-crc", [], true),
    enctype_name!(DES_CBC_MD4, "des-cbc-md4", [], true),
    enctype_name!(DES_CBC_MD5, "des-cbc-md5", [], true),
    enctype_name!(DES_CBC_RAW, "des-cbc-raw", [], true),
    enctype_name!(DES_HMAC_SHA1, "des-hmac-sha1", [], true),
    enctype_name!(DES3_CBC_RAW, "des3-cbc-raw", [], true),
    enctype_name!(
        DES3_CBC_SHA1,
        "des3-cbc-sha1",
        ["des3-hmac-sha1", "des3-cbc-sha1-kd"],
        true
    ),
    enctype_name!(
        ARCFOUR_HMAC,
        "arcfour-hmac",
        ["rc4-hmac", "arcfour-hmac-md5"],
        true
    ),
    enctype_name!(
        ARCFOUR_HMAC_EXP,
        "arcfour-hmac-exp",
        ["rc4-hmac-exp", "arcfour-hmac-md5-exp"],
        true
    ),
    enctype_name!(
        AES128_CTS_HMAC_SHA1_96,
        "aes128-cts-hmac-sha1-96",
        ["aes128-cts", "aes128-sha1"],
        false
    ),
    enctype_name!(
        AES256_CTS_HMAC_SHA1_96,
        "aes256-cts-hmac-sha1-96",
        ["aes256-cts", "aes256-sha1"],
        false
    ),
    enctype_name!(
        CAMELLIA128_CTS_CMAC,
        "camellia128-cts-cmac",
        ["camellia128-cts"],
        false
    ),
    enctype_name!(
        CAMELLIA256_CTS_CMAC,
        "camellia256-cts-cmac",
        ["camellia256-cts"],
        false
    ),
    enctype_name!(
        AES128_CTS_HMAC_SHA256_128,
        "aes128-cts-hmac-sha256-128",
        ["aes128-sha2"],
        false
    ),
    enctype_name!(
        AES256_CTS_HMAC_SHA384_192,
        "aes256-cts-hmac-sha384-192",
        ["aes256-sha2"],
        false
    ),
];

/// Encryption type tag of a key block.
///
/// Any 16-bit value is valid on the wire; the names below are for display
/// only and an unknown tag round-trips unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Enctype(pub u16);

macro_rules! enctype {
    ($enctype:ident, $int:expr) => {
        pub const $enctype: Enctype = Enctype($int);
    };
}

impl Enctype {
    enctype!(NULL, 0x0000);
    // @deprecated no longer supported
    enctype!(DES_CBC_CRC, 0x0001);
    // @deprecated no longer supported
    enctype!(DES_CBC_MD4, 0x0002);
    // @deprecated no longer supported
    enctype!(DES_CBC_MD5, 0x0003);
    // @deprecated no longer supported
    enctype!(DES_CBC_RAW, 0x0004);
    // @deprecated DES-3 cbc with SHA1
    enctype!(DES3_CBC_SHA, 0x0005);
    // @deprecated DES-3 cbc mode raw
    enctype!(DES3_CBC_RAW, 0x0006);
    // @deprecated no longer supported
    enctype!(DES_HMAC_SHA1, 0x0008);

    enctype!(DES3_CBC_SHA1, 0x0010);
    // RFC 3962
    enctype!(AES128_CTS_HMAC_SHA1_96, 0x0011);
    // RFC 3962
    enctype!(AES256_CTS_HMAC_SHA1_96, 0x0012);
    // RFC 8009
    enctype!(AES128_CTS_HMAC_SHA256_128, 0x0013);
    // RFC 8009
    enctype!(AES256_CTS_HMAC_SHA384_192, 0x0014);
    // RFC 4757
    enctype!(ARCFOUR_HMAC, 0x0017);
    // RFC 4757
    enctype!(ARCFOUR_HMAC_EXP, 0x0018);
    // RFC 6803
    enctype!(CAMELLIA128_CTS_CMAC, 0x0019);
    // RFC 6803
    enctype!(CAMELLIA256_CTS_CMAC, 0x001a);
    enctype!(UNKNOWN, 0x01ff);

    fn lookup(self) -> Option<&'static EnctypeName> {
        ENCTYPE_NAMES.iter().find(|entry| entry.enctype == self)
    }

    /// Unknown tags count as deprecated.
    pub fn is_deprecated(self) -> bool {
        self.lookup().map_or(true, |entry| entry.deprecated)
    }

    pub fn name(self, shortest: bool) -> anyhow::Result<&'static str> {
        let entry = self
            .lookup()
            .ok_or_else(|| anyhow::anyhow!("Invalid enctype: {}", self.0))?;
        let mut name = entry.name;
        if shortest {
            for alias in entry.aliases {
                if alias.len() < name.len() {
                    name = *alias
                }
            }
        }
        Ok(name)
    }

    pub fn deprecated_name(self, shortest: bool) -> anyhow::Result<String> {
        let name = self.name(shortest)?;
        if self.is_deprecated() {
            Ok(format!("DEPRECATED:{}", name))
        } else {
            Ok(name.to_owned())
        }
    }
}

impl fmt::Display for Enctype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name(false) {
            Ok(name) => write!(f, "{}", name),
            Err(_) => write!(f, "etype {}", self.0),
        }
    }
}
