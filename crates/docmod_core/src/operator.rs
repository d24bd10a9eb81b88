//! Update operators, operator sets, and server versions.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// An atomic update operator.
///
/// The discriminant order is the order operators appear in
/// [`Operator::ALL`] and the bit index inside an [`OperatorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// `$set`: replace the field's value.
    Set,
    /// `$unset`: remove the field.
    Unset,
    /// `$inc`: add a delta to a numeric field.
    Inc,
    /// `$push`: append one element to a list.
    Push,
    /// `$pushAll`: append several elements to a list.
    PushAll,
    /// `$pull`: remove every occurrence of one element.
    Pull,
    /// `$pullAll`: remove every occurrence of several elements.
    PullAll,
    /// `$addToSet`: append an element unless already present.
    AddToSet,
    /// `$pop`: remove the first or last element.
    Pop,
}

impl Operator {
    /// Every operator, in wire order.
    pub const ALL: [Operator; 9] = [
        Operator::Set,
        Operator::Unset,
        Operator::Inc,
        Operator::Push,
        Operator::PushAll,
        Operator::Pull,
        Operator::PullAll,
        Operator::AddToSet,
        Operator::Pop,
    ];

    /// Returns the key this operator is emitted under.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Operator::Set => "$set",
            Operator::Unset => "$unset",
            Operator::Inc => "$inc",
            Operator::Push => "$push",
            Operator::PushAll => "$pushAll",
            Operator::Pull => "$pull",
            Operator::PullAll => "$pullAll",
            Operator::AddToSet => "$addToSet",
            Operator::Pop => "$pop",
        }
    }

    /// Returns the oldest server version that understands this operator.
    #[must_use]
    pub const fn min_server_version(self) -> ServerVersion {
        match self {
            Operator::Unset => ServerVersion::new(1, 3, 0),
            Operator::AddToSet => ServerVersion::new(1, 3, 3),
            Operator::Pop => ServerVersion::new(1, 1, 0),
            _ => ServerVersion::new(0, 0, 0),
        }
    }

    /// Whether this operator stores a sequence of element values.
    #[must_use]
    pub const fn is_multi_value(self) -> bool {
        matches!(self, Operator::PushAll | Operator::PullAll)
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operator: {s}"))
    }
}

/// A fixed set of operators, declared by a field type.
///
/// Sets are built at compile time with [`OperatorSet::with`] and checked
/// with [`OperatorSet::contains`]; nothing is looked up at runtime.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OperatorSet(u16);

impl OperatorSet {
    /// The empty set.
    pub const EMPTY: OperatorSet = OperatorSet(0);

    /// `$set` and `$unset`, valid on every built-in field type.
    pub const BASE: OperatorSet = OperatorSet::EMPTY.with(Operator::Set).with(Operator::Unset);

    /// Base operators plus `$inc`.
    pub const NUMERIC: OperatorSet = OperatorSet::BASE.with(Operator::Inc);

    /// Base operators plus every list operator.
    pub const LIST: OperatorSet = OperatorSet::BASE
        .with(Operator::Push)
        .with(Operator::PushAll)
        .with(Operator::Pull)
        .with(Operator::PullAll)
        .with(Operator::AddToSet)
        .with(Operator::Pop);

    /// Base operators plus the list operators that keep elements unique.
    pub const SET: OperatorSet = OperatorSet::BASE
        .with(Operator::AddToSet)
        .with(Operator::Pull)
        .with(Operator::PullAll)
        .with(Operator::Pop);

    /// Every operator.
    pub const ALL: OperatorSet = OperatorSet::LIST.with(Operator::Inc);

    /// Returns a copy of this set that also contains `op`.
    #[must_use]
    pub const fn with(self, op: Operator) -> Self {
        Self(self.0 | op.bit())
    }

    /// Returns a copy of this set without `op`.
    #[must_use]
    pub const fn without(self, op: Operator) -> Self {
        Self(self.0 & !op.bit())
    }

    /// Whether `op` is in the set.
    #[must_use]
    pub const fn contains(self, op: Operator) -> bool {
        self.0 & op.bit() != 0
    }

    /// Returns the operators present in both sets.
    #[must_use]
    pub const fn intersection(self, other: OperatorSet) -> Self {
        Self(self.0 & other.0)
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of operators in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Operators supported by a server of the given version.
    #[must_use]
    pub fn supported_by(version: ServerVersion) -> Self {
        Operator::ALL
            .into_iter()
            .filter(|op| op.min_server_version() <= version)
            .collect()
    }

    /// Iterates the operators in wire order.
    pub fn iter(self) -> impl Iterator<Item = Operator> {
        Operator::ALL.into_iter().filter(move |op| self.contains(*op))
    }
}

impl FromIterator<Operator> for OperatorSet {
    fn from_iter<I: IntoIterator<Item = Operator>>(iter: I) -> Self {
        iter.into_iter().fold(OperatorSet::EMPTY, OperatorSet::with)
    }
}

impl fmt::Debug for OperatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for OperatorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for op in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(op.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// A store server version, compared component-wise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    /// Major version.
    pub major: u16,
    /// Minor version.
    pub minor: u16,
    /// Patch version.
    pub patch: u16,
}

impl ServerVersion {
    /// Creates a server version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parses `major.minor.patch`; missing trailing components are zero.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidVersion`] when a component is not a number
    /// or there are more than three.
    pub fn parse(s: &str) -> CoreResult<Self> {
        let invalid = || CoreError::InvalidVersion {
            version: s.to_string(),
        };

        let mut parts = [0u16; 3];
        let mut count = 0;
        for component in s.trim().split('.') {
            let slot = parts.get_mut(count).ok_or_else(invalid)?;
            *slot = component.parse().map_err(|_| invalid())?;
            count += 1;
        }

        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for ServerVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(op.as_str().parse::<Operator>().unwrap(), op);
        }
        assert!("$rename".parse::<Operator>().is_err());
    }

    #[test]
    fn builtin_sets() {
        assert_eq!(OperatorSet::BASE.len(), 2);
        assert!(OperatorSet::NUMERIC.contains(Operator::Inc));
        assert!(!OperatorSet::NUMERIC.contains(Operator::Push));
        assert!(OperatorSet::LIST.contains(Operator::PushAll));
        assert!(!OperatorSet::LIST.contains(Operator::Inc));
        assert!(!OperatorSet::SET.contains(Operator::Push));
        assert!(OperatorSet::SET.contains(Operator::AddToSet));
        assert_eq!(OperatorSet::ALL.len(), Operator::ALL.len());
        assert!(OperatorSet::EMPTY.is_empty());
    }

    #[test]
    fn set_display_and_iteration_follow_wire_order() {
        let set: OperatorSet = [Operator::Pop, Operator::Set, Operator::Inc].into_iter().collect();
        assert_eq!(set.to_string(), "$set $inc $pop");
        assert_eq!(
            set.without(Operator::Inc).iter().collect::<Vec<_>>(),
            vec![Operator::Set, Operator::Pop]
        );
    }

    #[test]
    fn version_ordering_and_parsing() {
        assert!(ServerVersion::new(1, 3, 0) < ServerVersion::new(1, 3, 3));
        assert!(ServerVersion::new(2, 0, 0) > ServerVersion::new(1, 9, 9));
        assert_eq!(ServerVersion::parse("1.3.3").unwrap(), ServerVersion::new(1, 3, 3));
        assert_eq!(ServerVersion::parse("2.4").unwrap(), ServerVersion::new(2, 4, 0));
        assert!(ServerVersion::parse("1.x").is_err());
        assert!(ServerVersion::parse("1.2.3.4").is_err());
        assert!(ServerVersion::parse("").is_err());
        assert_eq!(ServerVersion::new(1, 1, 0).to_string(), "1.1.0");
    }

    #[test]
    fn supported_by_version() {
        let old = OperatorSet::supported_by(ServerVersion::new(1, 0, 0));
        assert!(old.contains(Operator::Set));
        assert!(old.contains(Operator::PushAll));
        assert!(!old.contains(Operator::Pop));
        assert!(!old.contains(Operator::Unset));

        let mid = OperatorSet::supported_by(ServerVersion::new(1, 3, 0));
        assert!(mid.contains(Operator::Unset));
        assert!(!mid.contains(Operator::AddToSet));

        assert_eq!(
            OperatorSet::supported_by(ServerVersion::new(1, 3, 3)),
            OperatorSet::ALL
        );
    }
}
