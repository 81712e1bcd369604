// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type shared by every mutator in the crate.  A mutator
//! that returns one of these has not touched its receiver.

use failure::Fail;
use num::Complex;

/// Everything that can go wrong while configuring or rendering a
/// fractal.  Numeric trouble inside a single pixel's Newton iteration
/// is not represented here: it is absorbed by the convergence unit.
#[derive(Debug, Fail, PartialEq)]
pub enum NewtonError {
    /// A count, size or limit was outside its permitted range.
    #[fail(display = "invalid configuration: {}", _0)]
    InvalidConfiguration(String),

    /// A root index did not name an existing root.
    #[fail(display = "root index {} is out of range for {} roots", index, count)]
    RootOutOfRange {
        /// The index that was asked for.
        index: usize,
        /// The number of roots the polynomial actually has.
        count: usize,
    },

    /// Rebuilding the pixel/plane map produced a non-invertible
    /// transform.
    #[fail(
        display = "the plane transform for scale {} centered on {} is not invertible",
        scale, center
    )]
    DegenerateTransform {
        /// The scale the map was being rebuilt with.
        scale: f64,
        /// The center the map was being rebuilt with.
        center: Complex<f64>,
    },

    /// One of the render threads panicked, so the pixel buffer is
    /// incomplete.
    #[fail(display = "a render worker panicked during the convergence pass")]
    WorkerPanicked,
}

/// Shorthand for results carrying a `NewtonError`.
pub type Result<T> = std::result::Result<T, NewtonError>;

/// Builds an `InvalidConfiguration` error from anything printable.
pub(crate) fn invalid<S: Into<String>>(reason: S) -> NewtonError {
    NewtonError::InvalidConfiguration(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_names_index_and_count() {
        let e = NewtonError::RootOutOfRange { index: 7, count: 3 };
        assert_eq!(e.to_string(), "root index 7 is out of range for 3 roots");
    }

    #[test]
    fn invalid_configuration_carries_its_reason() {
        let e = invalid("root count must be at least 1");
        assert_eq!(
            e.to_string(),
            "invalid configuration: root count must be at least 1"
        );
    }
}
