use super::{error, Error};

impl Error {
    error!(
        KRB5_PARSE_MALFORMED,
        -1765328250, "Malformed representation of principal"
    );
    error!(KRB5_KT_UNKNOWN_TYPE, -1765328204, "Unknown Key table type");
    error!(
        KRB5_KEYTAB_BADVNO,
        -1765328171, "Unsupported key table format version number"
    );
    // Reported as KRB5_KT_FORMAT by MIT; short reads are the only format
    // failure the codec can detect.
    error!(KRB5_KT_TRUNCATED, -1765328156, "Keytab data truncated");
    error!(
        KRB5_KT_LENGTH_MISMATCH,
        22, "Declared length does not match data size"
    );
}
