//! Causal timestamps.

use crate::error::{ClockError, ClockResult};
use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Width of the physical component in the serialized form: 48 bits
/// of milliseconds, 12 hex digits. Enough until the year 10889.
const PHYSICAL_HEX_DIGITS: usize = 12;
/// Width of the counter component: 16 bits, 4 hex digits.
const COUNTER_HEX_DIGITS: usize = 4;

/// A hybrid logical clock timestamp.
///
/// An `Hlc` combines physical wall-clock milliseconds, a logical
/// counter for sub-millisecond causality, and the originating node's
/// identity. The triple forms a total order consistent with
/// causality even across devices with unsynchronized clocks.
///
/// # Ordering
///
/// Timestamps compare by `(physical, counter, node)`. The serialized
/// string form uses fixed-width hex for the numeric components, so
/// lexicographic comparison of two serialized timestamps gives the
/// same answer as comparing the parsed values:
///
/// ```
/// use fieldsync_clock::{Hlc, NodeId};
///
/// let a = Hlc::new(1000, 0, NodeId::new("a").unwrap());
/// let b = Hlc::new(1000, 1, NodeId::new("a").unwrap());
/// assert!(a < b);
/// assert!(a.to_string() < b.to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hlc {
    /// Physical time in milliseconds since the Unix epoch.
    pub physical: u64,
    /// Logical counter for events within one millisecond.
    pub counter: u16,
    /// Identity of the node that produced the timestamp.
    pub node: NodeId,
}

impl Hlc {
    /// Creates a timestamp from its components.
    #[must_use]
    pub fn new(physical: u64, counter: u16, node: NodeId) -> Self {
        Self {
            physical,
            counter,
            node,
        }
    }

    /// Parses a timestamp from its serialized string form.
    ///
    /// # Errors
    ///
    /// Returns `ClockError` if the string does not have three
    /// `:`-separated parts or a numeric component is not valid hex.
    pub fn parse(text: &str) -> ClockResult<Self> {
        let mut parts = text.splitn(3, ':');
        let (physical, counter, node) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(c), Some(n)) if !p.is_empty() && !c.is_empty() && !n.is_empty() => {
                (p, c, n)
            }
            _ => return Err(ClockError::InvalidFormat(text.to_string())),
        };

        let physical =
            u64::from_str_radix(physical, 16).map_err(|_| ClockError::InvalidComponent {
                component: "physical",
                value: physical.to_string(),
            })?;
        let counter =
            u16::from_str_radix(counter, 16).map_err(|_| ClockError::InvalidComponent {
                component: "counter",
                value: counter.to_string(),
            })?;
        let node = NodeId::new(node)?;

        Ok(Self::new(physical, counter, node))
    }
}

impl fmt::Display for Hlc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:0pw$x}:{:0cw$x}:{}",
            self.physical,
            self.counter,
            self.node,
            pw = PHYSICAL_HEX_DIGITS,
            cw = COUNTER_HEX_DIGITS,
        )
    }
}

impl FromStr for Hlc {
    type Err = ClockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Hlc {
    type Error = ClockError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Hlc> for String {
    fn from(hlc: Hlc) -> Self {
        hlc.to_string()
    }
}

impl Ord for Hlc {
    fn cmp(&self, other: &Self) -> Ordering {
        self.physical
            .cmp(&other.physical)
            .then_with(|| self.counter.cmp(&other.counter))
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for Hlc {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(id: &str) -> NodeId {
        NodeId::new(id).unwrap()
    }

    #[test]
    fn string_form_is_fixed_width() {
        let ts = Hlc::new(0x1234, 7, node("n1"));
        assert_eq!(ts.to_string(), "000000001234:0007:n1");
    }

    #[test]
    fn parse_roundtrip() {
        let ts = Hlc::new(1_700_000_000_000, 42, node("device-a"));
        let back = Hlc::parse(&ts.to_string()).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Hlc::parse("").is_err());
        assert!(Hlc::parse("abc").is_err());
        assert!(Hlc::parse("12:34").is_err());
        assert!(Hlc::parse("zz:0001:n").is_err());
        assert!(Hlc::parse("0001:zz:n").is_err());
        assert!(Hlc::parse("0001:0001:").is_err());
    }

    #[test]
    fn node_id_may_contain_non_hex() {
        // UUID node ids have dashes; only the separator is reserved.
        let ts = Hlc::parse("000000000001:0000:550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(ts.physical, 1);
    }

    #[test]
    fn ordering_by_components() {
        let a = Hlc::new(1, 0, node("a"));
        let b = Hlc::new(2, 0, node("a"));
        let c = Hlc::new(2, 1, node("a"));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn node_id_tie_break() {
        // Same physical millisecond, same counter, different devices:
        // the node id decides, never equality.
        let a = Hlc::new(1000, 0, node("A"));
        let b = Hlc::new(1000, 0, node("B"));
        assert!(a < b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn serde_as_string() {
        let ts = Hlc::new(0xABC, 1, node("n"));
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"000000000abc:0001:n\"");
        let back: Hlc = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    proptest! {
        #[test]
        fn compare_matches_string_compare(
            p1 in 0u64..(1 << 48), c1 in any::<u16>(),
            p2 in 0u64..(1 << 48), c2 in any::<u16>(),
            n1 in "[a-z0-9-]{1,16}", n2 in "[a-z0-9-]{1,16}",
        ) {
            let a = Hlc::new(p1, c1, NodeId::new(n1).unwrap());
            let b = Hlc::new(p2, c2, NodeId::new(n2).unwrap());
            prop_assert_eq!(a.cmp(&b), a.to_string().cmp(&b.to_string()));
        }

        #[test]
        fn parse_inverts_display(
            p in 0u64..(1 << 48), c in any::<u16>(), n in "[a-z0-9-]{1,16}",
        ) {
            let ts = Hlc::new(p, c, NodeId::new(n).unwrap());
            prop_assert_eq!(Hlc::parse(&ts.to_string()).unwrap(), ts);
        }
    }
}
