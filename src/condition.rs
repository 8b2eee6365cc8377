//! Wait conditions, as understood by the host's wait primitive.
//!
//! A `Wait` is a conjunction of per-channel terms; a wait call takes a list
//! of `Wait`s and wakes up on the first sample where any of them holds.

use std::convert::TryFrom;
use std::fmt;

use crate::logic::{
	Channel,
	Pins,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Condition {
	Rising,
	Falling,
	Edge,
	High,
	Low,
	Stable,
}

impl Condition {
	/// `prev` is `None` on the first sample of a stream; edges can't match there.
	pub fn matches(self, prev: Option<bool>, cur: bool) -> bool {
		match (self, prev) {
			(Condition::High, _) => cur,
			(Condition::Low, _) => !cur,
			(_, None) => false,
			(Condition::Rising, Some(prev)) => !prev && cur,
			(Condition::Falling, Some(prev)) => prev && !cur,
			(Condition::Edge, Some(prev)) => prev != cur,
			(Condition::Stable, Some(prev)) => prev == cur,
		}
	}

	pub fn as_char(self) -> char {
		match self {
			Condition::Rising => 'r',
			Condition::Falling => 'f',
			Condition::Edge => 'e',
			Condition::High => 'h',
			Condition::Low => 'l',
			Condition::Stable => 's',
		}
	}
}

impl TryFrom<char> for Condition {
	type Error = ::failure::Error;

	fn try_from(c: char) -> Result<Self, Self::Error> {
		Ok(match c {
			'r' => Condition::Rising,
			'f' => Condition::Falling,
			'e' => Condition::Edge,
			'h' => Condition::High,
			'l' => Condition::Low,
			's' => Condition::Stable,
			_ => bail!("invalid wait condition {:?} (expected one of r, f, e, h, l, s)", c),
		})
	}
}

impl fmt::Display for Condition {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{}", self.as_char())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Term {
	pub channel: Channel,
	pub condition: Condition,
}

/// All terms must hold on the same sample. No terms: matches any sample.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Wait {
	terms: Vec<Term>,
}

impl Wait {
	pub fn new() -> Self {
		Wait { terms: Vec::new() }
	}

	pub fn with(mut self, channel: Channel, condition: Condition) -> Self {
		self.terms.push(Term { channel, condition });
		self
	}

	pub fn rising(self, channel: Channel) -> Self {
		self.with(channel, Condition::Rising)
	}

	pub fn falling(self, channel: Channel) -> Self {
		self.with(channel, Condition::Falling)
	}

	pub fn high(self, channel: Channel) -> Self {
		self.with(channel, Condition::High)
	}

	pub fn low(self, channel: Channel) -> Self {
		self.with(channel, Condition::Low)
	}

	pub fn terms(&self) -> &[Term] {
		&self.terms
	}

	pub fn matches(&self, prev: Option<Pins>, cur: Pins) -> bool {
		self.terms.iter().all(|term| {
			term.condition.matches(prev.map(|p| p.level(term.channel)), cur.level(term.channel))
		})
	}
}

impl fmt::Display for Wait {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "{{")?;
		for (i, term) in self.terms.iter().enumerate() {
			if i > 0 { write!(f, ", ")?; }
			write!(f, "{}: '{}'", term.channel.index(), term.condition)?;
		}
		write!(f, "}}")
	}
}

/// Evaluate a list of alternatives; `None` when none holds.
pub fn match_any(alternatives: &[Wait], prev: Option<Pins>, cur: Pins) -> Option<Vec<bool>> {
	let matched: Vec<bool> = alternatives.iter().map(|w| w.matches(prev, cur)).collect();
	if alternatives.is_empty() || matched.iter().any(|m| *m) {
		Some(matched)
	} else {
		None
	}
}
