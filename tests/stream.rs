extern crate microwire_decode;

use microwire_decode::input::{
	read_samples,
	ChannelMap,
};
use microwire_decode::synth::Synth;
use microwire_decode::*;

// 93C46 (64 x 16 bit): EWEN, WRITE @0x05 0x1234, READ @0x05
fn eeprom_session() -> Vec<Pins> {
	let mut synth = Synth::new(2);
	synth.idle(4);
	synth.select().start_bit().send_bits(0b00_110000, 8).deselect().idle(4);
	synth.select().start_bit().send_bits(0b01_000101, 8).send_bits(0x1234, 16).deselect().idle(4);
	synth.select().start_bit().send_bits(0b10_000101, 8).receive_bits(0x1234, 16).deselect().idle(4);
	synth.into_samples()
}

#[test]
fn push_matches_pull() {
	let samples = eeprom_session();
	let pulled = decode_all(samples.clone()).unwrap();

	let mut stream = Stream::new(MicrowireDecoder::new(), Recorder::new()).unwrap();
	for chunk in samples.chunks(7) {
		stream.push_all(chunk.iter().cloned()).unwrap();
	}
	assert_eq!(stream.samples(), samples.len() as SampleNum);
	assert_eq!(stream.decoder().state(), State::AwaitChipSelect);
	let (_, pushed) = stream.into_parts();

	assert_eq!(pushed.events, pulled.events);
	assert_eq!(pulled.packets().count(), 3);
}

#[test]
fn eeprom_words() {
	let rec = decode_all(eeprom_session()).unwrap();
	let lengths: Vec<usize> = rec.packets().map(|p| p.bits.len()).collect();
	assert_eq!(lengths, [8, 24, 24]);

	let read = rec.packets().nth(2).unwrap();
	let opcode_address = read.si_bits().take(8).fold(0u16, |acc, b| (acc << 1) | b as u16);
	assert_eq!(opcode_address, 0b10_000101);
	let data = read.so_bits().skip(8).fold(0u16, |acc, b| (acc << 1) | b as u16);
	assert_eq!(data, 0x1234);
}

#[test]
fn raw_capture_round_trip_through_channel_map() {
	let mut map = ChannelMap::default();
	map.set_bit(Channel::Cs, 4).set_bit(Channel::Sk, 5).set_bit(Channel::Si, 6).set_bit(Channel::So, 7);
	map.validate().unwrap();

	let samples = eeprom_session();
	let raw: Vec<u8> = samples.iter().map(|p| map.encode(*p)).collect();

	let mut rec = Recorder::new();
	let mut decoder = MicrowireDecoder::new();
	decoder.start(&mut rec).unwrap();
	let mut host = SampleHost::new(read_samples(&raw[..], map));
	decoder.decode(&mut host, &mut rec).unwrap();

	assert_eq!(host.samplenum(), Some(samples.len() as SampleNum - 1));
	assert_eq!(rec.events, decode_all(samples).unwrap().events);
}

#[test]
fn text_output() {
	let mut synth = Synth::new(1);
	synth.idle(1).select().start_bit().clock_bit(true, false).deselect();

	let mut out = TextWriter::new(Vec::new(), &MICROWIRE);
	out.set_packets(true);
	let mut decoder = MicrowireDecoder::new();
	decoder.start(&mut out).unwrap();
	decoder.decode(&mut SampleHost::from_pins(synth.into_samples()), &mut out).unwrap();
	assert_eq!(out.written(), 4);

	let text = String::from_utf8(out.into_inner()).unwrap();
	let lines: Vec<&str> = text.lines().collect();
	assert_eq!(lines, [
		"3-4 microwire: start-bit: \"Start bit\"",
		"6-7 microwire: si-bit: \"SI bit: 1\"",
		"6-7 microwire: so-bit: \"SO bit: 0\"",
		"6-6 microwire: packet: (6, 7, 1, 0)",
	]);
}

#[test]
fn rows_filter_text_output() {
	let mut synth = Synth::new(1);
	synth.idle(1).select().start_bit().clock_bit(false, true).deselect();

	let mut out = TextWriter::new(Vec::new(), &MICROWIRE);
	out.set_classes(MICROWIRE.classes_for_rows("so-bits").unwrap());
	let mut decoder = MicrowireDecoder::new();
	decoder.start(&mut out).unwrap();
	decoder.decode(&mut SampleHost::from_pins(synth.into_samples()), &mut out).unwrap();

	let text = String::from_utf8(out.into_inner()).unwrap();
	assert_eq!(text, "6-7 microwire: so-bit: \"SO bit: 1\"\n");
}
