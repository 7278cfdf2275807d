pub mod codec;
pub mod context;
pub mod crypto;
pub mod data;
pub mod describe;
pub mod error;
pub mod keytab;
pub mod principal;
pub mod str_conv;

pub use self::{
    codec::{Codec, Cursor},
    context::{Conf, Context},
    crypto::{Enctype, Keyblock},
    data::Data,
    describe::Describe,
    error::Error,
    keytab::{FileFormatVersion, Keytab, KeytabEntry, Kvno},
    principal::{NameType, Principal},
    str_conv::StrConv,
};
use std::process::ExitCode;

/// Seconds since the Unix epoch, as stored in keytab entries.
pub type Timestamp = u32;

pub fn prefix_progname_to_error_if_needed(progname: &str, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}: {:#}", progname, err);
            ExitCode::FAILURE
        }
    }
}
