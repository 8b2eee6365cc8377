//! Static capability declaration the host reads before running a decoder.

use std::fmt;

use crate::logic::Channel;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChannelInfo {
	pub channel: Channel,
	pub name: &'static str,
	pub desc: &'static str,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum AnnotationClass {
	StartBit = 0,
	SiBit = 1,
	SoBit = 2,
	// reserved for malformed-input reports; nothing emits it yet
	Warning = 3,
}

impl AnnotationClass {
	pub const ALL: [AnnotationClass; 4] = [
		AnnotationClass::StartBit,
		AnnotationClass::SiBit,
		AnnotationClass::SoBit,
		AnnotationClass::Warning,
	];

	pub fn index(self) -> usize {
		self as usize
	}

	pub fn id(self) -> &'static str {
		MICROWIRE.annotations[self.index()].id
	}

	pub fn desc(self) -> &'static str {
		MICROWIRE.annotations[self.index()].desc
	}
}

impl fmt::Display for AnnotationClass {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.id())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AnnotationInfo {
	pub class: AnnotationClass,
	pub id: &'static str,
	pub desc: &'static str,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RowInfo {
	pub id: &'static str,
	pub desc: &'static str,
	pub classes: &'static [AnnotationClass],
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Descriptor {
	pub id: &'static str,
	pub name: &'static str,
	pub longname: &'static str,
	pub desc: &'static str,
	pub license: &'static str,
	pub inputs: &'static [&'static str],
	pub outputs: &'static [&'static str],
	pub tags: &'static [&'static str],
	pub channels: &'static [ChannelInfo],
	pub annotations: &'static [AnnotationInfo],
	pub annotation_rows: &'static [RowInfo],
}

impl Descriptor {
	pub fn row(&self, id: &str) -> Option<&'static RowInfo> {
		self.annotation_rows.iter().find(|row| row.id == id)
	}

	pub fn annotation(&self, id: &str) -> Option<AnnotationClass> {
		self.annotations.iter().find(|a| a.id == id).map(|a| a.class)
	}

	/// Parse a comma separated list of row ids into the classes they show.
	pub fn classes_for_rows(&self, rows: &str) -> crate::AResult<Vec<AnnotationClass>> {
		let mut classes = Vec::new();
		for id in rows.split(',').map(str::trim).filter(|id| !id.is_empty()) {
			let row = match self.row(id) {
				Some(row) => row,
				None => bail!("unknown annotation row {:?} for decoder {}", id, self.id),
			};
			for class in row.classes {
				if !classes.contains(class) {
					classes.push(*class);
				}
			}
		}
		ensure!(!classes.is_empty(), "no annotation rows selected");
		classes.sort();
		Ok(classes)
	}
}

pub static MICROWIRE: Descriptor = Descriptor {
	id: "microwire",
	name: "Microwire",
	longname: "Microwire",
	desc: "3-wire, half-duplex, synchronous serial bus.",
	license: "gplv2+",
	inputs: &["logic"],
	outputs: &["microwire"],
	tags: &["Embedded/industrial"],
	channels: &[
		ChannelInfo { channel: Channel::Cs, name: "CS", desc: "Chip select" },
		ChannelInfo { channel: Channel::Sk, name: "SK", desc: "Clock" },
		ChannelInfo { channel: Channel::Si, name: "SI", desc: "Slave in" },
		ChannelInfo { channel: Channel::So, name: "SO", desc: "Slave out" },
	],
	annotations: &[
		AnnotationInfo { class: AnnotationClass::StartBit, id: "start-bit", desc: "Start bit" },
		AnnotationInfo { class: AnnotationClass::SiBit, id: "si-bit", desc: "SI bit" },
		AnnotationInfo { class: AnnotationClass::SoBit, id: "so-bit", desc: "SO bit" },
		AnnotationInfo { class: AnnotationClass::Warning, id: "warning", desc: "Warning" },
	],
	annotation_rows: &[
		RowInfo {
			id: "si-bits",
			desc: "SI bits",
			classes: &[AnnotationClass::StartBit, AnnotationClass::SiBit],
		},
		RowInfo { id: "so-bits", desc: "SO bits", classes: &[AnnotationClass::SoBit] },
		RowInfo { id: "warnings", desc: "Warnings", classes: &[AnnotationClass::Warning] },
	],
};

impl fmt::Display for Descriptor {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		writeln!(f, "{} ({}): {}", self.id, self.longname, self.desc)?;
		writeln!(f, "License: {}", self.license)?;
		writeln!(f, "Channels:")?;
		for ch in self.channels {
			writeln!(f, "  {}: {} ({})", ch.channel.index(), ch.channel.id(), ch.desc)?;
		}
		writeln!(f, "Annotation classes:")?;
		for a in self.annotations {
			writeln!(f, "  {}: {} ({})", a.class.index(), a.id, a.desc)?;
		}
		writeln!(f, "Annotation rows:")?;
		for row in self.annotation_rows {
			let classes: Vec<_> = row.classes.iter().map(|c| c.id()).collect();
			writeln!(f, "  {} ({}): {}", row.id, row.desc, classes.join(", "))?;
		}
		Ok(())
	}
}
