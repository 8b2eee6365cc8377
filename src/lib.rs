#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod condition;
pub mod descriptor;
pub mod host;
pub mod input;
pub mod logic;
pub mod microwire;
pub mod output;
pub mod synth;

pub use self::descriptor::{
	AnnotationClass,
	Descriptor,
	MICROWIRE,
};

pub use self::host::{
	Decoder,
	Next,
	SampleHost,
	Stream,
	Wakeup,
};

pub use self::logic::{
	Channel,
	Pins,
	SampleNum,
};

pub use self::microwire::{
	BitEvent,
	MicrowireDecoder,
	Packet,
	State,
};

pub use self::output::{
	Annotation,
	Event,
	Output,
	OutputId,
	OutputType,
	Payload,
	Recorder,
	TextWriter,
};

/// Decode a whole sample sequence, returning everything the decoder emitted.
pub fn decode_all<I>(samples: I) -> AResult<Recorder>
where
	I: IntoIterator<Item = Pins>,
{
	let mut recorder = Recorder::new();
	let mut decoder = MicrowireDecoder::new();
	decoder.start(&mut recorder)?;
	let mut host = SampleHost::from_pins(samples);
	decoder.decode(&mut host, &mut recorder)?;
	Ok(recorder)
}
