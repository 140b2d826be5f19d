use std::{borrow::Borrow, fmt};

use indexmap::IndexSet;

/// Stable handle of a party inside a [`crate::Ledger`].
///
/// Assigned once at ledger construction from the party's input position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartyId(pub usize);

impl PartyId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PartyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Payment method identifier (e.g. `UPI`, `Cash`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Channel(String);

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Channel {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Channel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Channel {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Insertion-ordered set of channels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChannelSet {
    channels: IndexSet<Channel>,
}

impl ChannelSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the channel was already present.
    pub fn insert(&mut self, channel: impl Into<Channel>) -> bool {
        self.channels.insert(channel.into())
    }

    pub fn contains(&self, channel: &str) -> bool {
        self.channels.contains(channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> + '_ {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// First channel of `self`, in insertion order, that `other` also accepts.
    pub fn first_shared_with(&self, other: &ChannelSet) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|channel| other.contains(channel.as_str()))
    }
}

impl<C: Into<Channel>> FromIterator<C> for ChannelSet {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let mut set = Self::new();
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ChannelSet {
    type Item = &'a Channel;
    type IntoIter = indexmap::set::Iter<'a, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

/// A participant with a signed net balance (negative: owes, positive: is owed).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    pub net_amount: i64,
    pub channels: ChannelSet,
}

impl Party {
    pub fn new<I, C>(name: impl Into<String>, net_amount: i64, channels: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Channel>,
    {
        Self {
            name: name.into(),
            net_amount,
            channels: channels.into_iter().collect(),
        }
    }

    pub fn is_debtor(&self) -> bool {
        self.net_amount < 0
    }

    pub fn is_creditor(&self) -> bool {
        self.net_amount > 0
    }

    pub fn is_settled(&self) -> bool {
        self.net_amount == 0
    }
}

/// One emitted payment: `from` pays `amount` to `to` over `channel`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettlementInstruction {
    pub from: PartyId,
    pub to: PartyId,
    pub amount: i64,
    pub channel: Channel,
}

/// Balance left on a party when a run stops short of settling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResidualBalance {
    pub party: PartyId,
    pub amount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::debtor_order(&["UPI", "Cash"], &["Cash", "UPI"], Some("UPI"))]
    #[case::single_overlap(&["Card", "Cash"], &["Cash"], Some("Cash"))]
    #[case::disjoint(&["UPI"], &["Cash"], None)]
    #[case::empty_other(&["UPI"], &[], None)]
    #[case::case_sensitive(&["upi"], &["UPI"], None)]
    fn first_shared_follows_insertion_order(
        #[case] own: &[&str],
        #[case] other: &[&str],
        #[case] expected: Option<&str>,
    ) {
        let own: ChannelSet = own.iter().copied().collect();
        let other: ChannelSet = other.iter().copied().collect();

        assert_eq!(
            own.first_shared_with(&other).map(Channel::as_str),
            expected
        );
    }

    #[test]
    fn duplicate_channels_keep_first_position() {
        let mut set: ChannelSet = ["Cash", "UPI"].into_iter().collect();
        assert!(!set.insert("Cash"));
        assert!(set.insert("Card"));

        let order: Vec<&str> = set.iter().map(Channel::as_str).collect();
        assert_eq!(order, vec!["Cash", "UPI", "Card"]);
    }

    #[rstest]
    #[case::debtor(-5, true, false, false)]
    #[case::creditor(5, false, true, false)]
    #[case::settled(0, false, false, true)]
    fn party_sign_predicates(
        #[case] net_amount: i64,
        #[case] debtor: bool,
        #[case] creditor: bool,
        #[case] settled: bool,
    ) {
        let party = Party::new("A", net_amount, ["X"]);
        assert_eq!(party.is_debtor(), debtor);
        assert_eq!(party.is_creditor(), creditor);
        assert_eq!(party.is_settled(), settled);
    }
}
