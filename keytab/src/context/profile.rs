use config::{Config, File, FileFormat};
use std::env;

const DEFAULT_SECURE_PROFILE_PATH: &str = "/etc/krb5.conf";
const DEFAULT_PROFILE_PATH: &str = DEFAULT_SECURE_PROFILE_PATH;

/// The krb5.conf files in lookup order. Missing files are skipped.
#[derive(Debug)]
pub struct Profile {
    files: Vec<ProfileFile>,
}

macro_rules! get_value {
    ($fn:ident, $type:ident) => {
        pub fn $fn(&self, key: &str) -> Option<$type> {
            for file in &self.files {
                if let Ok(value) = file.config.$fn(key) {
                    return Some(value);
                }
            }
            None
        }
    };
}

impl Profile {
    pub fn new(secure: bool) -> anyhow::Result<Self> {
        Self::from_files(&Self::default_config_files(secure))
    }

    pub fn from_files(files: &[String]) -> anyhow::Result<Self> {
        let mut profile_files = vec![];
        for file in files {
            profile_files.push(ProfileFile::new(file)?);
        }
        Ok(Self {
            files: profile_files,
        })
    }

    fn default_config_files(secure: bool) -> Vec<String> {
        let filepath = if secure {
            DEFAULT_SECURE_PROFILE_PATH.to_owned()
        } else {
            env::var("KRB5_CONFIG").unwrap_or(DEFAULT_PROFILE_PATH.to_owned())
        };
        filepath.split(':').map(|f| f.to_owned()).collect()
    }

    get_value!(get_string, String);
}

#[derive(Debug)]
struct ProfileFile {
    config: Config,
}

impl ProfileFile {
    fn new(filename: &str) -> anyhow::Result<Self> {
        let expanded_filename = match (filename.starts_with("~/"), env::var("HOME")) {
            (true, Ok(home_env)) => format!("{}{}", home_env, &filename[1..]),
            _ => filename.to_owned(),
        };
        let config = Config::builder()
            .add_source(
                File::with_name(&expanded_filename)
                    .format(FileFormat::Ini)
                    .required(false),
            )
            .build()?;
        Ok(Self { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn earlier_files_win() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        writeln!(first, "[libdefaults]\ndefault_keytab_name = FILE:/first").unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            second,
            "[libdefaults]\ndefault_keytab_name = FILE:/second\ndefault_client_keytab_name = FILE:/client"
        )
        .unwrap();
        let files = [first.path(), second.path()].map(|p| p.to_str().unwrap().to_owned());

        let profile = Profile::from_files(&files).unwrap();
        assert_eq!(
            profile.get_string("libdefaults.default_keytab_name"),
            Some("FILE:/first".to_owned())
        );
        assert_eq!(
            profile.get_string("libdefaults.default_client_keytab_name"),
            Some("FILE:/client".to_owned())
        );
        assert_eq!(profile.get_string("libdefaults.default_realm"), None);
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("krb5.conf").to_str().unwrap().to_owned();
        let profile = Profile::from_files(&[missing]).unwrap();
        assert_eq!(profile.get_string("libdefaults.default_keytab_name"), None);
    }
}
