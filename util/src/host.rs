//! Host platform (linux for example) utility functions

use std::path::PathBuf;

use uname;

/// Retrieve uname information.
pub fn get_uname() -> std::io::Result<uname::Info> {
    uname::uname()
}

/// Get the root directory of the software from the `PLANAR_SW_ROOT`
/// environment variable.
pub fn get_planar_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var("PLANAR_SW_ROOT").map(PathBuf::from)
}
