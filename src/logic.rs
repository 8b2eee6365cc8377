use std::fmt;
use std::str;

/// Index of a sample in the captured stream; the first sample is 0.
pub type SampleNum = u64;

/// The four Microwire lines, in the order the decoder declares them.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Channel {
	Cs = 0,
	Sk = 1,
	Si = 2,
	So = 3,
}

impl Channel {
	pub const ALL: [Channel; 4] = [Channel::Cs, Channel::Sk, Channel::Si, Channel::So];

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn from_index(index: usize) -> Option<Channel> {
		Channel::ALL.get(index).cloned()
	}

	pub fn id(self) -> &'static str {
		match self {
			Channel::Cs => "cs",
			Channel::Sk => "sk",
			Channel::Si => "si",
			Channel::So => "so",
		}
	}
}

impl fmt::Display for Channel {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.id())
	}
}

impl str::FromStr for Channel {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if let Some(ch) = Channel::ALL.iter().find(|ch| ch.id().eq_ignore_ascii_case(s)) {
			return Ok(*ch);
		}
		let index = with_context!(("invalid channel: {:?}", s),
			Ok(s.parse::<usize>()?)
		)?;
		match Channel::from_index(index) {
			Some(ch) => Ok(ch),
			None => bail!("invalid channel index: {} (only 0..=3)", index),
		}
	}
}

/// Levels of all channels at one sample.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Pins {
	pub cs: bool,
	pub sk: bool,
	pub si: bool,
	pub so: bool,
}

impl Pins {
	pub fn new(cs: bool, sk: bool, si: bool, so: bool) -> Self {
		Pins { cs, sk, si, so }
	}

	pub fn level(&self, channel: Channel) -> bool {
		match channel {
			Channel::Cs => self.cs,
			Channel::Sk => self.sk,
			Channel::Si => self.si,
			Channel::So => self.so,
		}
	}

	pub fn set(&mut self, channel: Channel, level: bool) -> &mut Self {
		match channel {
			Channel::Cs => self.cs = level,
			Channel::Sk => self.sk = level,
			Channel::Si => self.si = level,
			Channel::So => self.so = level,
		}
		self
	}

	// bit N is channel N
	pub fn bits(&self) -> u8 {
		Channel::ALL.iter()
			.filter(|ch| self.level(**ch))
			.fold(0u8, |acc, ch| acc | (1 << ch.index()))
	}

	pub fn from_bits(bits: u8) -> Self {
		let mut pins = Pins::default();
		for ch in Channel::ALL.iter() {
			pins.set(*ch, 0 != bits & (1 << ch.index()));
		}
		pins
	}
}

impl fmt::Debug for Pins {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "Pins(")?;
		for (i, ch) in Channel::ALL.iter().enumerate() {
			if i > 0 { write!(f, " ")?; }
			let id = ch.id();
			if self.level(*ch) {
				write!(f, "{}", id.to_uppercase())?;
			} else {
				write!(f, "{}", id)?;
			}
		}
		write!(f, ")")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn channel_parse() {
		assert_eq!("cs".parse::<Channel>().unwrap(), Channel::Cs);
		assert_eq!("SK".parse::<Channel>().unwrap(), Channel::Sk);
		assert_eq!("3".parse::<Channel>().unwrap(), Channel::So);
		assert!("4".parse::<Channel>().is_err());
		assert!("clk".parse::<Channel>().is_err());
	}

	#[test]
	fn pins_bits() {
		let pins = Pins::new(true, false, true, false);
		assert_eq!(pins.bits(), 0b0101);
		assert_eq!(Pins::from_bits(0b0101), pins);
		assert_eq!(Pins::from_bits(0xf0), Pins::default());
	}

	#[test]
	fn pins_debug_marks_high_lines() {
		assert_eq!(format!("{:?}", Pins::new(true, false, false, true)), "Pins(CS sk si SO)");
	}
}
