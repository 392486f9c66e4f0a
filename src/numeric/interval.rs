use crate::numeric::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;

/// Real interval used as the domain restriction of a function argument.
///
/// `Interval::all()` is the unrestricted domain. Bounds are compared with the checked
/// [`Value::compare`], so exact and real bounds can be mixed.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    lower: Bound<Value>,
    upper: Bound<Value>,
}

impl Interval {
    pub fn new(lower: Bound<Value>, upper: Bound<Value>) -> Interval {
        Interval { lower, upper }
    }

    /// (-∞, ∞)
    pub fn all() -> Interval {
        Interval::new(Bound::Unbounded, Bound::Unbounded)
    }

    /// [a, b]
    pub fn closed(a: impl Into<Value>, b: impl Into<Value>) -> Interval {
        Interval::new(Bound::Included(a.into()), Bound::Included(b.into()))
    }

    /// (a, b)
    pub fn open(a: impl Into<Value>, b: impl Into<Value>) -> Interval {
        Interval::new(Bound::Excluded(a.into()), Bound::Excluded(b.into()))
    }

    /// [a, ∞)
    pub fn at_least(a: impl Into<Value>) -> Interval {
        Interval::new(Bound::Included(a.into()), Bound::Unbounded)
    }

    /// (a, ∞)
    pub fn greater_than(a: impl Into<Value>) -> Interval {
        Interval::new(Bound::Excluded(a.into()), Bound::Unbounded)
    }

    /// (-∞, b]
    pub fn at_most(b: impl Into<Value>) -> Interval {
        Interval::new(Bound::Unbounded, Bound::Included(b.into()))
    }

    /// (-∞, b)
    pub fn less_than(b: impl Into<Value>) -> Interval {
        Interval::new(Bound::Unbounded, Bound::Excluded(b.into()))
    }

    pub fn lower(&self) -> &Bound<Value> {
        &self.lower
    }

    pub fn upper(&self) -> &Bound<Value> {
        &self.upper
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(
            (&self.lower, &self.upper),
            (Bound::Unbounded, Bound::Unbounded)
        )
    }

    /// Membership test. Values without an ordering (complex numbers with an imaginary part)
    /// belong only to the unrestricted interval.
    pub fn contains(&self, x: &Value) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let above_lower = match &self.lower {
            Bound::Unbounded => true,
            Bound::Included(a) => matches!(x.compare(a), Ok(Ordering::Greater | Ordering::Equal)),
            Bound::Excluded(a) => matches!(x.compare(a), Ok(Ordering::Greater)),
        };
        let below_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(b) => matches!(x.compare(b), Ok(Ordering::Less | Ordering::Equal)),
            Bound::Excluded(b) => matches!(x.compare(b), Ok(Ordering::Less)),
        };
        above_lower && below_upper
    }

    /// true if no value can satisfy both bounds
    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (Bound::Included(a), Bound::Included(b)) => {
                matches!(a.compare(b), Ok(Ordering::Greater))
            }
            (Bound::Included(a), Bound::Excluded(b))
            | (Bound::Excluded(a), Bound::Included(b))
            | (Bound::Excluded(a), Bound::Excluded(b)) => {
                matches!(a.compare(b), Ok(Ordering::Greater | Ordering::Equal))
            }
            _ => false,
        }
    }

    /// The narrowest interval contained in both.
    pub fn intersect(&self, other: &Interval) -> Interval {
        Interval {
            lower: tighter(&self.lower, &other.lower, Ordering::Greater),
            upper: tighter(&self.upper, &other.upper, Ordering::Less),
        }
    }
}

/// Picks the more restrictive of two bounds. `prefer` is the ordering that makes a bound
/// tighter: `Greater` for lower bounds, `Less` for upper bounds.
fn tighter(a: &Bound<Value>, b: &Bound<Value>, prefer: Ordering) -> Bound<Value> {
    match (a, b) {
        (Bound::Unbounded, other) | (other, Bound::Unbounded) => other.clone(),
        (Bound::Included(x) | Bound::Excluded(x), Bound::Included(y) | Bound::Excluded(y)) => {
            match x.compare(y) {
                Ok(ord) if ord == prefer => a.clone(),
                Ok(Ordering::Equal) => {
                    // on a tie the exclusive bound is the narrower one
                    if matches!(a, Bound::Excluded(_)) {
                        a.clone()
                    } else {
                        b.clone()
                    }
                }
                Ok(_) => b.clone(),
                Err(_) => a.clone(),
            }
        }
    }
}

impl Default for Interval {
    fn default() -> Interval {
        Interval::all()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.lower {
            Bound::Unbounded => write!(f, "(-∞, ")?,
            Bound::Included(a) => write!(f, "[{}, ", a)?,
            Bound::Excluded(a) => write!(f, "({}, ", a)?,
        }
        match &self.upper {
            Bound::Unbounded => write!(f, "∞)"),
            Bound::Included(b) => write!(f, "{}]", b),
            Bound::Excluded(b) => write!(f, "{})", b),
        }
    }
}
