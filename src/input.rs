//! Raw captures: one byte per sample, each channel on a configurable bit.

use std::fs;
use std::io::{
	self,
	BufReader,
	Read,
};
use std::path::Path;

use crate::logic::{
	Channel,
	Pins,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ChannelMap {
	pub cs: u8,
	pub sk: u8,
	pub si: u8,
	pub so: u8,
}

impl Default for ChannelMap {
	fn default() -> Self {
		ChannelMap { cs: 0, sk: 1, si: 2, so: 3 }
	}
}

impl ChannelMap {
	pub fn bit(&self, channel: Channel) -> u8 {
		match channel {
			Channel::Cs => self.cs,
			Channel::Sk => self.sk,
			Channel::Si => self.si,
			Channel::So => self.so,
		}
	}

	pub fn set_bit(&mut self, channel: Channel, bit: u8) -> &mut Self {
		match channel {
			Channel::Cs => self.cs = bit,
			Channel::Sk => self.sk = bit,
			Channel::Si => self.si = bit,
			Channel::So => self.so = bit,
		}
		self
	}

	pub fn validate(&self) -> crate::AResult<()> {
		for (i, ch) in Channel::ALL.iter().enumerate() {
			let bit = self.bit(*ch);
			ensure!(bit < 8, "bit {} for channel {} out of range (only 0..=7)", bit, ch);
			for other in &Channel::ALL[..i] {
				ensure!(self.bit(*other) != bit, "channels {} and {} both mapped to bit {}", other, ch, bit);
			}
		}
		Ok(())
	}

	pub fn decode(&self, byte: u8) -> Pins {
		let mut pins = Pins::default();
		for ch in Channel::ALL.iter() {
			pins.set(*ch, 0 != byte & (1 << self.bit(*ch)));
		}
		pins
	}

	pub fn encode(&self, pins: Pins) -> u8 {
		Channel::ALL.iter()
			.filter(|ch| pins.level(**ch))
			.fold(0u8, |acc, ch| acc | (1 << self.bit(*ch)))
	}
}

/// Samples from a raw capture; I/O errors end up in the stream.
pub fn read_samples<R: Read>(reader: R, map: ChannelMap) -> impl Iterator<Item = crate::AResult<Pins>> {
	BufReader::new(reader).bytes().map(move |byte| Ok(map.decode(byte?)))
}

/// `-` opens stdin.
pub fn open_input(path: &Path) -> crate::AResult<Box<dyn Read>> {
	if path == Path::new("-") {
		return Ok(Box::new(io::stdin()));
	}
	with_context!(("couldn't open capture {}", path.display()), {
		let file = fs::File::open(path)?;
		Ok(Box::new(file) as Box<dyn Read>)
	})
}
