//! The decoding engine side: the plugin interface a decoder implements, and
//! two ways of driving it over a sample stream.
//!
//! `SampleHost` pulls samples from an iterator whenever the decoder waits;
//! `Stream` is pushed one sample at a time, for callers that receive a
//! capture in chunks. Both evaluate the same wait conditions on the same
//! samples, so they produce the same events.

use std::iter;

use crate::condition::{
	self,
	Wait,
};
use crate::descriptor::Descriptor;
use crate::logic::{
	Pins,
	SampleNum,
};
use crate::output::Output;

/// A satisfied wait: the sample it matched on and which alternatives held.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Wakeup {
	pub samplenum: SampleNum,
	pub pins: Pins,
	pub matched: Vec<bool>,
}

impl Wakeup {
	pub fn matched(&self, alternative: usize) -> bool {
		self.matched.get(alternative).cloned().unwrap_or(false)
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Next {
	/// Suspend until one of the alternatives holds on a later sample.
	Wait(Vec<Wait>),
	/// Resume right away, without consuming a sample.
	Continue,
}

pub trait Host {
	/// Consume samples until one alternative matches; `None` at end of stream.
	fn wait(&mut self, alternatives: &[Wait]) -> crate::AResult<Option<Wakeup>>;
}

pub trait Decoder {
	fn descriptor(&self) -> &'static Descriptor;

	fn reset(&mut self);

	/// Bind outputs; called once before decoding.
	fn start(&mut self, output: &mut dyn Output) -> crate::AResult<()>;

	fn next(&self) -> Next;

	/// `wakeup` is `None` exactly when `next()` returned `Next::Continue`.
	fn resume(&mut self, wakeup: Option<&Wakeup>, output: &mut dyn Output) -> crate::AResult<()>;

	/// Run until the host runs out of samples.
	fn decode(&mut self, host: &mut dyn Host, output: &mut dyn Output) -> crate::AResult<()> {
		loop {
			match self.next() {
				Next::Continue => self.resume(None, output)?,
				Next::Wait(alternatives) => match host.wait(&alternatives)? {
					Some(wakeup) => self.resume(Some(&wakeup), output)?,
					None => {
						debug!("{}: end of samples", self.descriptor().id);
						return Ok(());
					},
				},
			}
		}
	}
}

pub struct SampleHost<I> {
	samples: I,
	samplenum: Option<SampleNum>,
	last: Option<Pins>,
}

impl<I> SampleHost<I>
where
	I: Iterator<Item = crate::AResult<Pins>>,
{
	pub fn new(samples: I) -> Self {
		SampleHost {
			samples,
			samplenum: None,
			last: None,
		}
	}

	/// Last consumed sample, if any.
	pub fn samplenum(&self) -> Option<SampleNum> {
		self.samplenum
	}
}

impl<J> SampleHost<iter::Map<J, fn(Pins) -> crate::AResult<Pins>>>
where
	J: Iterator<Item = Pins>,
{
	pub fn from_pins<T>(samples: T) -> Self
	where
		T: IntoIterator<IntoIter = J, Item = Pins>,
	{
		SampleHost::new(samples.into_iter().map(Ok as fn(Pins) -> crate::AResult<Pins>))
	}
}

impl<I> Host for SampleHost<I>
where
	I: Iterator<Item = crate::AResult<Pins>>,
{
	fn wait(&mut self, alternatives: &[Wait]) -> crate::AResult<Option<Wakeup>> {
		while let Some(pins) = self.samples.next() {
			let pins = pins?;
			let samplenum = self.samplenum.map_or(0, |n| n + 1);
			self.samplenum = Some(samplenum);
			let prev = self.last.replace(pins);
			if let Some(matched) = condition::match_any(alternatives, prev, pins) {
				return Ok(Some(Wakeup { samplenum, pins, matched }));
			}
		}
		Ok(None)
	}
}

/// Push-driven decoding: owns a started decoder and its output.
pub struct Stream<D, O> {
	decoder: D,
	output: O,
	pending: Vec<Wait>,
	samplenum: SampleNum,
	last: Option<Pins>,
}

impl<D, O> Stream<D, O>
where
	D: Decoder,
	O: Output,
{
	pub fn new(mut decoder: D, mut output: O) -> crate::AResult<Self> {
		decoder.start(&mut output)?;
		let mut stream = Stream {
			decoder,
			output,
			pending: Vec::new(),
			samplenum: 0,
			last: None,
		};
		stream.settle()?;
		Ok(stream)
	}

	// run the decoder up to its next wait
	fn settle(&mut self) -> crate::AResult<()> {
		loop {
			match self.decoder.next() {
				Next::Continue => self.decoder.resume(None, &mut self.output)?,
				Next::Wait(alternatives) => {
					self.pending = alternatives;
					return Ok(());
				},
			}
		}
	}

	pub fn push(&mut self, pins: Pins) -> crate::AResult<()> {
		let samplenum = self.samplenum;
		self.samplenum += 1;
		let prev = self.last.replace(pins);
		if let Some(matched) = condition::match_any(&self.pending, prev, pins) {
			let wakeup = Wakeup { samplenum, pins, matched };
			self.decoder.resume(Some(&wakeup), &mut self.output)?;
			self.settle()?;
		}
		Ok(())
	}

	pub fn push_all<T>(&mut self, samples: T) -> crate::AResult<()>
	where
		T: IntoIterator<Item = Pins>,
	{
		for pins in samples {
			self.push(pins)?;
		}
		Ok(())
	}

	/// Number of samples pushed so far.
	pub fn samples(&self) -> SampleNum {
		self.samplenum
	}

	pub fn decoder(&self) -> &D {
		&self.decoder
	}

	pub fn output(&self) -> &O {
		&self.output
	}

	pub fn into_parts(self) -> (D, O) {
		(self.decoder, self.output)
	}
}
