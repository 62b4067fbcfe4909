//! Value and size bounds.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use crate::error::{Error, ErrorKind};


//------------ Bounds --------------------------------------------------------

/// Inclusive bounds of a value.
///
/// INTEGER values use bounds on their value while strings and repetitions
/// use bounds on their length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bounds<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + fmt::Display> Bounds<T> {
    /// Creates new bounds.
    ///
    /// # Panics
    ///
    /// The function panics if `min` is greater than `max`.
    pub fn new(min: T, max: T) -> Self {
        assert!(min <= max, "lower bound {} above upper bound {}", min, max);
        Bounds { min, max }
    }

    /// Returns the lower bound.
    pub fn min(&self) -> &T {
        &self.min
    }

    /// Returns the upper bound.
    pub fn max(&self) -> &T {
        &self.max
    }

    /// Returns whether the value is within the bounds.
    pub fn contains(&self, value: &T) -> bool {
        self.min <= *value && *value <= self.max
    }

    /// Returns a bounds error if the value is outside the bounds.
    pub fn check(&self, value: &T) -> Result<(), Error> {
        if self.contains(value) {
            Ok(())
        }
        else {
            Err(Error::new(ErrorKind::Bounds, format!(
                "{} not in bounds {}", value, self
            )))
        }
    }
}

impl<T: fmt::Display> fmt::Display for Bounds<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}..{}]", self.min, self.max)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn check() {
        let bounds = Bounds::new(2usize, 4);
        assert!(bounds.check(&2).is_ok());
        assert!(bounds.check(&4).is_ok());
        let err = bounds.check(&5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert_eq!(err.msg(), "5 not in bounds [2..4]");
        assert_eq!(err.offset(), None);
        assert!(!bounds.contains(&1));
    }

    #[test]
    #[should_panic]
    fn inverted() {
        let _ = Bounds::new(4, 2);
    }
}
