//! Microwire decoder.
//!
//! Microwire is a 3-wire, half-duplex, synchronous serial bus: CS scopes a
//! transaction (active high), every SK cycle carries one bit on SI (towards
//! the slave) and SO (from the slave). A transaction starts with a "1" start
//! bit on SI, followed by a device specific number of opcode, address and
//! data bits; e.g. a 93C46 READ is `1 10 AAAAAA` followed by 16 SO bits.
//!
//! Address and word size are variable, so the structured output is just the
//! list of all bits in a transaction, with the sample range of each bit and
//! both the SI and SO level. Only one of them is meaningful per bit, which
//! one is up to the consumer.

use std::fmt;
use std::mem;

use crate::condition::Wait;
use crate::descriptor::{
	AnnotationClass,
	Descriptor,
	MICROWIRE,
};
use crate::host::{
	Decoder,
	Next,
	Wakeup,
};
use crate::logic::{
	Channel,
	SampleNum,
};
use crate::output::{
	Annotation,
	Event,
	Output,
	OutputId,
	OutputType,
	Payload,
};

/// One SK cycle: opened by the rising edge, closed by the falling edge.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BitEvent {
	pub ss: SampleNum,
	pub es: SampleNum,
	pub si: bool,
	pub so: bool,
}

impl fmt::Display for BitEvent {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "({}, {}, {}, {})", self.ss, self.es, self.si as u8, self.so as u8)
	}
}

/// All bits between start bit and CS deassertion; never empty.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Packet {
	pub ss: SampleNum,
	/// opening sample of the last bit
	pub es: SampleNum,
	pub bits: Vec<BitEvent>,
}

impl Packet {
	pub fn from_bits(bits: Vec<BitEvent>) -> Option<Packet> {
		let ss = bits.first()?.ss;
		let es = bits.last()?.ss;
		Some(Packet { ss, es, bits })
	}

	pub fn si_bits(&self) -> impl Iterator<Item = bool> + '_ {
		self.bits.iter().map(|b| b.si)
	}

	pub fn so_bits(&self) -> impl Iterator<Item = bool> + '_ {
		self.bits.iter().map(|b| b.so)
	}
}

impl fmt::Display for Packet {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		for (i, bit) in self.bits.iter().enumerate() {
			if i > 0 { write!(f, " ")?; }
			write!(f, "{}", bit)?;
		}
		Ok(())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum State {
	AwaitChipSelect,
	AwaitStartCondition,
	AwaitStartBitClose {
		start: SampleNum,
	},
	AwaitBitOrChipSelectDrop,
	AwaitBitClose {
		start: SampleNum,
		si: bool,
		so: bool,
	},
	FlushTransaction,
}

impl State {
	fn conditions(&self) -> Next {
		match self {
			State::AwaitChipSelect => Next::Wait(vec![
				Wait::new().rising(Channel::Cs),
			]),
			State::AwaitStartCondition => Next::Wait(vec![
				Wait::new().high(Channel::Si).rising(Channel::Sk).high(Channel::Cs),
				Wait::new().falling(Channel::Cs),
			]),
			State::AwaitStartBitClose { .. } => Next::Wait(vec![
				Wait::new().falling(Channel::Sk).high(Channel::Cs),
				Wait::new().falling(Channel::Cs),
			]),
			State::AwaitBitOrChipSelectDrop => Next::Wait(vec![
				Wait::new().rising(Channel::Sk),
				Wait::new().falling(Channel::Cs),
			]),
			State::AwaitBitClose { .. } => Next::Wait(vec![
				Wait::new().falling(Channel::Sk),
			]),
			State::FlushTransaction => Next::Continue,
		}
	}
}

pub struct MicrowireDecoder {
	state: State,
	bits: Vec<BitEvent>,
	out_python: Option<OutputId>,
	out_ann: Option<OutputId>,
}

impl MicrowireDecoder {
	pub fn new() -> Self {
		MicrowireDecoder {
			state: State::AwaitChipSelect,
			bits: Vec::new(),
			out_python: None,
			out_ann: None,
		}
	}

	pub fn state(&self) -> State {
		self.state
	}

	/// Bits of the transaction in progress.
	pub fn bits(&self) -> &[BitEvent] {
		&self.bits
	}

	fn put_ann(&self, output: &mut dyn Output, ss: SampleNum, es: SampleNum, annotation: Annotation) -> crate::AResult<()> {
		let id = match self.out_ann {
			Some(id) => id,
			None => bail!("{}: annotation output not registered, start() wasn't called", MICROWIRE.id),
		};
		output.put(Event { ss, es, output: id, payload: Payload::Annotation(annotation) })
	}

	fn put_python(&self, output: &mut dyn Output, packet: Packet) -> crate::AResult<()> {
		let id = match self.out_python {
			Some(id) => id,
			None => bail!("{}: python output not registered, start() wasn't called", MICROWIRE.id),
		};
		output.put(Event { ss: packet.ss, es: packet.es, output: id, payload: Payload::Python(packet) })
	}

	fn bit_annotations(bit: &BitEvent) -> [Annotation; 2] {
		let si = bit.si as u8;
		let so = bit.so as u8;
		[
			Annotation::new(AnnotationClass::SiBit, vec![
				format!("SI bit: {}", si), format!("SI: {}", si), format!("{}", si),
			]),
			Annotation::new(AnnotationClass::SoBit, vec![
				format!("SO bit: {}", so), format!("SO: {}", so), format!("{}", so),
			]),
		]
	}

	fn transition(&mut self, wakeup: &Wakeup, output: &mut dyn Output) -> crate::AResult<State> {
		let at = wakeup.samplenum;
		Ok(match self.state {
			State::AwaitChipSelect => State::AwaitStartCondition,
			State::AwaitStartCondition => {
				if wakeup.matched(0) {
					State::AwaitStartBitClose { start: at }
				} else {
					debug!("{}: chip select dropped at {} before start condition", MICROWIRE.id, at);
					State::AwaitChipSelect
				}
			},
			State::AwaitStartBitClose { start } => {
				if wakeup.matched(0) && wakeup.pins.cs {
					self.put_ann(output, start, at, Annotation::new(AnnotationClass::StartBit, vec!["Start bit", "S"]))?;
					self.bits.clear();
					State::AwaitBitOrChipSelectDrop
				} else {
					debug!("{}: chip select dropped at {} within start bit from {}", MICROWIRE.id, at, start);
					State::AwaitChipSelect
				}
			},
			State::AwaitBitOrChipSelectDrop => {
				if !wakeup.pins.cs {
					State::FlushTransaction
				} else {
					State::AwaitBitClose {
						start: at,
						si: wakeup.pins.si,
						so: wakeup.pins.so,
					}
				}
			},
			State::AwaitBitClose { start, si, so } => {
				let bit = BitEvent { ss: start, es: at, si, so };
				for annotation in Self::bit_annotations(&bit).iter() {
					self.put_ann(output, bit.ss, bit.es, annotation.clone())?;
				}
				self.bits.push(bit);
				State::AwaitBitOrChipSelectDrop
			},
			State::FlushTransaction => unreachable!("flushing doesn't wait for samples"),
		})
	}

	fn flush(&mut self, output: &mut dyn Output) -> crate::AResult<()> {
		let bits = mem::replace(&mut self.bits, Vec::new());
		match Packet::from_bits(bits) {
			Some(packet) => {
				debug!("{}: packet {}-{} with {} bits", MICROWIRE.id, packet.ss, packet.es, packet.bits.len());
				self.put_python(output, packet)?;
			},
			None => debug!("{}: dropping transaction without bits", MICROWIRE.id),
		}
		Ok(())
	}
}

impl Default for MicrowireDecoder {
	fn default() -> Self {
		MicrowireDecoder::new()
	}
}

impl fmt::Debug for MicrowireDecoder {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("MicrowireDecoder")
			.field("state", &self.state)
			.field("bits", &self.bits.len())
			.field("started", &(self.out_python.is_some() && self.out_ann.is_some()))
			.finish()
	}
}

impl Decoder for MicrowireDecoder {
	fn descriptor(&self) -> &'static Descriptor {
		&MICROWIRE
	}

	fn reset(&mut self) {
		self.state = State::AwaitChipSelect;
		self.bits.clear();
	}

	fn start(&mut self, output: &mut dyn Output) -> crate::AResult<()> {
		self.out_python = Some(output.register(OutputType::Python)?);
		self.out_ann = Some(output.register(OutputType::Annotation)?);
		Ok(())
	}

	fn next(&self) -> Next {
		self.state.conditions()
	}

	fn resume(&mut self, wakeup: Option<&Wakeup>, output: &mut dyn Output) -> crate::AResult<()> {
		let next = match (self.state, wakeup) {
			(State::FlushTransaction, _) => {
				self.flush(output)?;
				State::AwaitChipSelect
			},
			(_, Some(wakeup)) => self.transition(wakeup, output)?,
			(state, None) => bail!("{}: resumed in {:?} without a sample", MICROWIRE.id, state),
		};
		trace!("{}: {:?} -> {:?}", MICROWIRE.id, self.state, next);
		self.state = next;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::SampleHost;
	use crate::logic::Pins;
	use crate::output::Recorder;

	// cs, sk, si, so per sample, as a string of "CKIO" letters (uppercase = high)
	fn wave(levels: &str) -> Vec<Pins> {
		levels.split_whitespace().map(|s| {
			let b: Vec<char> = s.chars().collect();
			Pins::new(b[0] == 'C', b[1] == 'K', b[2] == 'I', b[3] == 'O')
		}).collect()
	}

	fn run(samples: Vec<Pins>) -> Recorder {
		let mut rec = Recorder::new();
		let mut decoder = MicrowireDecoder::new();
		decoder.start(&mut rec).unwrap();
		decoder.decode(&mut SampleHost::from_pins(samples), &mut rec).unwrap();
		rec
	}

	#[test]
	fn single_bit_transaction() {
		let rec = run(wave("ckio Ckio CKIo CkIo CKIo CkIo ckio"));
		let starts: Vec<_> = rec.annotations_of(AnnotationClass::StartBit).map(|(ss, es, _)| (ss, es)).collect();
		assert_eq!(starts, [(2, 3)]);
		let packets: Vec<_> = rec.packets().collect();
		assert_eq!(packets.len(), 1);
		assert_eq!(packets[0].bits, [BitEvent { ss: 4, es: 5, si: true, so: false }]);
		assert_eq!((packets[0].ss, packets[0].es), (4, 4));
	}

	#[test]
	fn chip_select_drop_before_start_bit() {
		let rec = run(wave("ckio Ckio ckio CKIo CkIo ckio"));
		assert_eq!(rec.events.len(), 0);
	}

	#[test]
	fn chip_select_drop_within_start_bit() {
		// SK falls only after CS went low: no start bit
		let rec = run(wave("ckio Ckio CKIo cKIo ckio"));
		assert_eq!(rec.events.len(), 0);
	}

	#[test]
	fn start_bit_without_data_bits() {
		let rec = run(wave("ckio Ckio CKIo CkIo ckio"));
		assert_eq!(rec.annotations_of(AnnotationClass::StartBit).count(), 1);
		assert_eq!(rec.packets().count(), 0);
	}

	#[test]
	fn emit_before_start_fails() {
		let mut rec = Recorder::new();
		let mut decoder = MicrowireDecoder::new();
		let mut host = SampleHost::from_pins(wave("ckio Ckio CKIo CkIo"));
		assert!(decoder.decode(&mut host, &mut rec).is_err());
	}

	#[test]
	fn start_twice_fails() {
		let mut rec = Recorder::new();
		let mut decoder = MicrowireDecoder::new();
		decoder.start(&mut rec).unwrap();
		assert!(decoder.start(&mut rec).is_err());
	}

	#[test]
	fn reset_drops_partial_transaction() {
		let mut rec = Recorder::new();
		let mut decoder = MicrowireDecoder::new();
		decoder.start(&mut rec).unwrap();
		decoder.decode(&mut SampleHost::from_pins(wave("ckio Ckio CKIo CkIo CKIo Ckio")), &mut rec).unwrap();
		assert_eq!(decoder.state(), State::AwaitBitOrChipSelectDrop);
		assert_eq!(decoder.bits().len(), 1);
		decoder.reset();
		assert_eq!(decoder.state(), State::AwaitChipSelect);
		assert!(decoder.bits().is_empty());
	}

	#[test]
	fn flush_needs_no_sample() {
		let mut rec = Recorder::new();
		let mut decoder = MicrowireDecoder::new();
		decoder.start(&mut rec).unwrap();
		assert!(decoder.resume(None, &mut rec).is_err());
		decoder.state = State::FlushTransaction;
		assert_eq!(decoder.next(), Next::Continue);
		decoder.resume(None, &mut rec).unwrap();
		assert_eq!(decoder.state(), State::AwaitChipSelect);
		assert_eq!(rec.events.len(), 0);
	}

	#[test]
	fn packet_from_bits() {
		assert!(Packet::from_bits(Vec::new()).is_none());
		let bits = vec![
			BitEvent { ss: 10, es: 12, si: true, so: false },
			BitEvent { ss: 14, es: 16, si: false, so: true },
		];
		let packet = Packet::from_bits(bits).unwrap();
		assert_eq!((packet.ss, packet.es), (10, 14));
		assert_eq!(packet.si_bits().collect::<Vec<_>>(), [true, false]);
		assert_eq!(packet.so_bits().collect::<Vec<_>>(), [false, true]);
		assert_eq!(packet.to_string(), "(10, 12, 1, 0) (14, 16, 0, 1)");
	}
}
