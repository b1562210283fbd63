//! Generic parameters functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot load the parameter file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the parameter file: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter file.
///
/// The file is a TOML document which is deserialised into the parameter
/// struct `P`.
pub fn load<P, S>(param_file_path: S) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    S: AsRef<Path>,
{
    // Load the file into a string
    let params_str = match read_to_string(param_file_path) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e)),
    };

    // Parse the string into the parameter struct
    match toml::from_str(params_str.as_str()) {
        Ok(p) => Ok(p),
        Err(e) => Err(LoadError::DeserialiseError(e)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct TestParams {
        max_velocity_ms: f64,
        num_modules: usize,
    }

    #[test]
    fn test_load() {
        let dir = std::env::temp_dir().join("util_params_test.toml");
        std::fs::write(&dir, "max_velocity_ms = 4.5\nnum_modules = 4\n").unwrap();

        let params: TestParams = load(&dir).unwrap();
        assert_eq!(params.max_velocity_ms, 4.5);
        assert_eq!(params.num_modules, 4);
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<TestParams, _> = load("/nonexistent/params.toml");
        assert!(matches!(result, Err(LoadError::FileLoadError(_))));
    }
}
