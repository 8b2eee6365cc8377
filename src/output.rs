//! Output registration and the sinks decoders emit into.

use std::fmt;
use std::io;

use crate::descriptor::{
	AnnotationClass,
	Descriptor,
};
use crate::logic::SampleNum;
use crate::microwire::Packet;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum OutputType {
	/// Structured data for stacked decoders and tools.
	Python,
	/// Human readable annotations.
	Annotation,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OutputId(pub usize);

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Annotation {
	pub class: AnnotationClass,
	/// most verbose first
	pub texts: Vec<String>,
}

impl Annotation {
	pub fn new<S: Into<String>>(class: AnnotationClass, texts: Vec<S>) -> Self {
		Annotation {
			class,
			texts: texts.into_iter().map(Into::into).collect(),
		}
	}

	pub fn text(&self) -> &str {
		self.texts.first().map(String::as_str).unwrap_or("")
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Payload {
	Python(Packet),
	Annotation(Annotation),
}

impl Payload {
	pub fn output_type(&self) -> OutputType {
		match self {
			Payload::Python(_) => OutputType::Python,
			Payload::Annotation(_) => OutputType::Annotation,
		}
	}
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Event {
	pub ss: SampleNum,
	pub es: SampleNum,
	pub output: OutputId,
	pub payload: Payload,
}

pub trait Output {
	fn register(&mut self, output_type: OutputType) -> crate::AResult<OutputId>;

	fn put(&mut self, event: Event) -> crate::AResult<()>;
}

/// Book-keeping shared by the sinks: one output per type.
#[derive(Clone, Debug, Default)]
struct Registrations {
	outputs: Vec<OutputType>,
}

impl Registrations {
	fn register(&mut self, output_type: OutputType) -> crate::AResult<OutputId> {
		ensure!(!self.outputs.contains(&output_type), "output type {:?} already registered", output_type);
		self.outputs.push(output_type);
		Ok(OutputId(self.outputs.len() - 1))
	}

	fn check(&self, event: &Event) -> crate::AResult<()> {
		let registered = match self.outputs.get(event.output.0) {
			Some(t) => *t,
			None => bail!("put to unregistered output {:?}", event.output),
		};
		let payload = event.payload.output_type();
		ensure!(registered == payload,
			"payload {:?} doesn't match output {:?} registered as {:?}", payload, event.output, registered
		);
		ensure!(event.ss <= event.es, "event ends before it starts: {}-{}", event.ss, event.es);
		Ok(())
	}
}

/// Keeps every event in memory.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
	registrations: Registrations,
	pub events: Vec<Event>,
}

impl Recorder {
	pub fn new() -> Self {
		Recorder::default()
	}

	pub fn packets(&self) -> impl Iterator<Item = &Packet> {
		self.events.iter().filter_map(|e| match &e.payload {
			Payload::Python(p) => Some(p),
			_ => None,
		})
	}

	pub fn annotations(&self) -> impl Iterator<Item = (SampleNum, SampleNum, &Annotation)> {
		self.events.iter().filter_map(|e| match &e.payload {
			Payload::Annotation(a) => Some((e.ss, e.es, a)),
			_ => None,
		})
	}

	pub fn annotations_of(&self, class: AnnotationClass) -> impl Iterator<Item = (SampleNum, SampleNum, &Annotation)> {
		self.annotations().filter(move |(_, _, a)| a.class == class)
	}
}

impl Output for Recorder {
	fn register(&mut self, output_type: OutputType) -> crate::AResult<OutputId> {
		self.registrations.register(output_type)
	}

	fn put(&mut self, event: Event) -> crate::AResult<()> {
		self.registrations.check(&event)?;
		self.events.push(event);
		Ok(())
	}
}

/// Prints events as lines of text, one per event.
pub struct TextWriter<W: io::Write> {
	writer: W,
	descriptor: &'static Descriptor,
	registrations: Registrations,
	classes: Vec<AnnotationClass>,
	packets: bool,
	written: usize,
}

impl<W: io::Write> TextWriter<W> {
	/// Prints all annotation classes and no packets.
	pub fn new(writer: W, descriptor: &'static Descriptor) -> Self {
		TextWriter {
			writer,
			descriptor,
			registrations: Registrations::default(),
			classes: AnnotationClass::ALL.to_vec(),
			packets: false,
			written: 0,
		}
	}

	pub fn set_classes(&mut self, classes: Vec<AnnotationClass>) -> &mut Self {
		self.classes = classes;
		self
	}

	pub fn set_packets(&mut self, packets: bool) -> &mut Self {
		self.packets = packets;
		self
	}

	/// Number of lines written so far.
	pub fn written(&self) -> usize {
		self.written
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: io::Write> Output for TextWriter<W> {
	fn register(&mut self, output_type: OutputType) -> crate::AResult<OutputId> {
		self.registrations.register(output_type)
	}

	fn put(&mut self, event: Event) -> crate::AResult<()> {
		self.registrations.check(&event)?;
		match &event.payload {
			Payload::Annotation(a) => {
				if !self.classes.contains(&a.class) {
					return Ok(());
				}
				writeln!(self.writer, "{}-{} {}: {}: {:?}", event.ss, event.es, self.descriptor.id, a.class, a.text())?;
			},
			Payload::Python(p) => {
				if !self.packets {
					return Ok(());
				}
				writeln!(self.writer, "{}-{} {}: packet: {}", event.ss, event.es, self.descriptor.id, p)?;
			},
		}
		self.written += 1;
		Ok(())
	}
}

impl<W: io::Write> fmt::Debug for TextWriter<W> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("TextWriter")
			.field("decoder", &self.descriptor.id)
			.field("classes", &self.classes)
			.field("packets", &self.packets)
			.field("written", &self.written)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::descriptor::MICROWIRE;
	use crate::microwire::BitEvent;

	fn si_annotation(ss: SampleNum, es: SampleNum, output: OutputId) -> Event {
		Event {
			ss,
			es,
			output,
			payload: Payload::Annotation(Annotation::new(AnnotationClass::SiBit, vec!["SI bit: 1", "SI: 1", "1"])),
		}
	}

	#[test]
	fn register_once_per_type() {
		let mut rec = Recorder::new();
		let py = rec.register(OutputType::Python).unwrap();
		let ann = rec.register(OutputType::Annotation).unwrap();
		assert_ne!(py, ann);
		assert!(rec.register(OutputType::Python).is_err());
	}

	#[test]
	fn put_checks_output() {
		let mut rec = Recorder::new();
		let py = rec.register(OutputType::Python).unwrap();
		assert!(rec.put(si_annotation(1, 2, py)).is_err());
		assert!(rec.put(si_annotation(1, 2, OutputId(7))).is_err());
		let ann = rec.register(OutputType::Annotation).unwrap();
		assert!(rec.put(si_annotation(2, 1, ann)).is_err());
		rec.put(si_annotation(1, 2, ann)).unwrap();
		assert_eq!(rec.annotations().count(), 1);
		assert_eq!(rec.annotations_of(AnnotationClass::SoBit).count(), 0);
	}

	#[test]
	fn text_writer_filters() {
		let mut out = TextWriter::new(Vec::new(), &MICROWIRE);
		let py = out.register(OutputType::Python).unwrap();
		let ann = out.register(OutputType::Annotation).unwrap();
		out.set_classes(vec![AnnotationClass::SoBit]);
		out.put(si_annotation(20, 30, ann)).unwrap();

		let packet = Packet::from_bits(vec![BitEvent { ss: 20, es: 30, si: true, so: false }]).unwrap();
		let event = Event { ss: 20, es: 20, output: py, payload: Payload::Python(packet) };
		out.put(event.clone()).unwrap();
		assert_eq!(out.written(), 0);

		out.set_classes(vec![AnnotationClass::SiBit]).set_packets(true);
		out.put(si_annotation(20, 30, ann)).unwrap();
		out.put(event).unwrap();
		assert_eq!(out.written(), 2);

		let text = String::from_utf8(out.into_inner()).unwrap();
		assert_eq!(text, "20-30 microwire: si-bit: \"SI bit: 1\"\n20-20 microwire: packet: (20, 30, 1, 0)\n");
	}
}
