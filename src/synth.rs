//! Bit-bang Microwire like a bus master would, recording the pins into
//! samples instead of driving hardware.

use crate::logic::{
	Pins,
	SampleNum,
};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Signal {
	Clear,
	Zero,
	One,
}

impl Signal {
	pub fn with_clock(self, clock: bool) -> Pins {
		let (cs, si) = match self {
			Signal::Clear => (false, false),
			Signal::Zero => (true, false),
			Signal::One => (true, true),
		};
		Pins { cs, sk: clock, si, so: false }
	}
}

impl From<bool> for Signal {
	fn from(v: bool) -> Self {
		match v {
			false => Signal::Zero,
			true => Signal::One,
		}
	}
}

#[derive(Clone, Debug)]
pub struct Synth {
	samples: Vec<Pins>,
	// samples per clock edge
	half_period: usize,
	pins: Pins,
}

impl Synth {
	pub fn new(half_period: usize) -> Self {
		assert!(half_period > 0);
		Synth {
			samples: Vec::new(),
			half_period,
			pins: Pins::default(),
		}
	}

	/// Sample number the next recorded sample will get.
	pub fn position(&self) -> SampleNum {
		self.samples.len() as SampleNum
	}

	pub fn pins(&self) -> Pins {
		self.pins
	}

	/// Hold the current pins for `n` samples.
	pub fn idle(&mut self, n: usize) -> &mut Self {
		let pins = self.pins;
		self.samples.extend((0..n).map(|_| pins));
		self
	}

	pub fn set_pins(&mut self, pins: Pins) -> &mut Self {
		self.pins = pins;
		self.idle(self.half_period)
	}

	pub fn select(&mut self) -> &mut Self {
		let pins = Pins { cs: true, sk: false, ..self.pins };
		self.set_pins(pins)
	}

	pub fn deselect(&mut self) -> &mut Self {
		self.set_pins(Signal::Clear.with_clock(false))
	}

	/// One SK cycle; data is set up while SK is low.
	pub fn clock_bit(&mut self, si: bool, so: bool) -> &mut Self {
		let mut low = Signal::from(si).with_clock(false);
		low.so = so;
		let high = Pins { sk: true, ..low };
		self.set_pins(low);
		self.set_pins(high);
		self.set_pins(low)
	}

	pub fn start_bit(&mut self) -> &mut Self {
		self.clock_bit(true, false)
	}

	/// `num` lowest bits of `word` on SI, highest bit first.
	pub fn send_bits(&mut self, word: u16, num: usize) -> &mut Self {
		assert!(num <= 16);
		for bit in (0..num).rev() {
			self.clock_bit(0 != word & (1 << bit), false);
		}
		self
	}

	/// `num` lowest bits of `word` on SO, highest bit first.
	pub fn receive_bits(&mut self, word: u16, num: usize) -> &mut Self {
		assert!(num <= 16);
		for bit in (0..num).rev() {
			self.clock_bit(false, 0 != word & (1 << bit));
		}
		self
	}

	pub fn samples(&self) -> &[Pins] {
		&self.samples
	}

	pub fn into_samples(self) -> Vec<Pins> {
		self.samples
	}
}
