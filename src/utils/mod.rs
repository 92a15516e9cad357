pub mod date;
pub mod extractor;
pub mod file_magic;
pub mod jwt;
pub mod name;
pub mod parameter_error_handler;
pub mod password;
pub mod random_code;
pub mod sql;
pub mod validate;

pub use extractor::{
    SafeClassIdI64, SafeDeviceIdI64, SafeIDI64, SafeImportJobId, SafeProvisioningIdI64,
    SafeSchoolIdI64, SafeStudentIdI64,
};
pub use file_magic::validate_magic_bytes;
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
