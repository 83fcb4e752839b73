/*
MIT License
Copyright (c) 2021 Germán Molina
Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:
The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.
THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
*/

use thiserror::Error;

/// Everything that can go wrong when building a cumulative sky
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value that falls outside of its domain (e.g., a latitude
    /// of 95 degrees). The object that rejected it keeps its previous state.
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// The name of the parameter
        name: &'static str,
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// A climate file that cannot be read into a full year of data
    #[error("Climate data error: {0}")]
    Climate(String),

    /// The Perez model was queried without a usable set of coefficients
    #[error("the sky model has no usable coefficients... call fit() first")]
    ModelNotFitted,

    /// Serializing results
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for building an [`Error::InvalidParameter`]
    pub(crate) fn invalid<V: std::fmt::Display>(name: &'static str, value: V, reason: &str) -> Self {
        Error::InvalidParameter {
            name,
            value: format!("{}", value),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let e = Error::invalid("latitude", 2.5, "must be within [-PI/2, PI/2]");
        assert_eq!(
            format!("{}", e),
            "Invalid parameter: latitude = 2.5 (must be within [-PI/2, PI/2])"
        );
    }
}
