mod profile;

pub use self::profile::Profile;
use nix::unistd::{Uid, User};

pub struct Conf;

macro_rules! conf {
    ($name:ident, $value:expr) => {
        pub const $name: &'static str = $value;
    };
}

impl Conf {
    conf!(DEFAULT_CLIENT_KEYTAB_NAME, "default_client_keytab_name");
    conf!(DEFAULT_KEYTAB_NAME, "default_keytab_name");
    conf!(LIBDEFAULTS, "libdefaults");
}

/// Library settings read from the krb5 profile.
#[derive(Debug)]
pub struct Context {
    pub profile: Profile,
    pub profile_secure: bool,
}

impl Context {
    pub fn init() -> anyhow::Result<Self> {
        Self::new(false)
    }

    /// Ignores `KRB5_CONFIG` and reads only the system profile.
    pub fn init_secure() -> anyhow::Result<Self> {
        Self::new(true)
    }

    pub fn new(secure: bool) -> anyhow::Result<Self> {
        let profile = Profile::new(secure)?;
        Ok(Self {
            profile,
            profile_secure: secure,
        })
    }

    pub fn from_profile(profile: Profile) -> Self {
        Self {
            profile,
            profile_secure: false,
        }
    }

    /// Looks up `name` in the `[libdefaults]` section.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.profile
            .get_string(&format!("{}.{}", Conf::LIBDEFAULTS, name))
    }

    /// Expands `%{euid}`, `%{uid}`, `%{USERID}` and `%{username}` in `path`.
    pub fn expand_path_tokens(path: &str) -> anyhow::Result<String> {
        let mut buf = String::with_capacity(path.len());
        let mut path_remained = path;
        while !path_remained.is_empty() {
            let token_begin = match path_remained.find("%{") {
                Some(token_begin) => {
                    buf.push_str(&path_remained[..token_begin]);
                    token_begin
                }
                None => {
                    buf.push_str(path_remained);
                    break;
                }
            };
            let token_end = match path_remained[token_begin..].find('}') {
                Some(token_end) => token_begin + token_end,
                None => Err(anyhow::anyhow!("Invalid argument"))?,
            };
            buf.push_str(&Self::expand_token(
                &path_remained[token_begin + 2..token_end],
            )?);
            path_remained = &path_remained[token_end + 1..];
        }
        Ok(buf)
    }

    fn expand_token(token: &str) -> anyhow::Result<String> {
        let token_value = match token {
            "euid" => Uid::effective().to_string(),
            "username" => User::from_uid(Uid::effective())?
                .map(|u| u.name)
                .unwrap_or_else(|| Uid::effective().to_string()),
            "uid" | "USERID" => Uid::current().to_string(),
            _ => Err(anyhow::anyhow!("Invalid argument"))?,
        };
        Ok(token_value)
    }
}
