#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate microwire_decode;
use microwire_decode::*;

use std::io::{
	self,
	Write,
};
use std::path::Path;
use std::process::exit;

use microwire_decode::input::ChannelMap;
use microwire_decode::synth::Synth;

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(None),
	};
	param.parse::<T>().map(Some).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn channel_map(matches: &clap::ArgMatches) -> AResult<ChannelMap> {
	let mut map = ChannelMap::default();
	for ch in Channel::ALL.iter() {
		if let Some(bit) = get_param::<u8>(matches, ch.id())? {
			map.set_bit(*ch, bit);
		}
	}
	map.validate()?;
	Ok(map)
}

fn decode(sub_m: &clap::ArgMatches) -> AResult<()> {
	let map = channel_map(sub_m)?;
	let path = sub_m.value_of("input").unwrap_or("-");
	let reader = input::open_input(Path::new(path))?;

	let stdout = io::stdout();
	let mut output = TextWriter::new(stdout.lock(), &MICROWIRE);
	if let Some(rows) = sub_m.value_of("rows") {
		output.set_classes(MICROWIRE.classes_for_rows(rows)?);
	}
	output.set_packets(sub_m.is_present("packets"));

	let mut decoder = MicrowireDecoder::new();
	decoder.start(&mut output)?;
	let mut host = SampleHost::new(input::read_samples(reader, map));
	decoder.decode(&mut host, &mut output)?;

	let samples = host.samplenum().map_or(0, |n| n + 1);
	info!("{}: decoded {} samples, wrote {} lines", path, samples, output.written());
	Ok(())
}

fn parse_bits(bits: &str) -> AResult<Vec<bool>> {
	bits.chars().filter(|c| *c != '_').map(|c| match c {
		'0' => Ok(false),
		'1' => Ok(true),
		_ => bail!("invalid bit {:?} in {:?}", c, bits),
	}).collect()
}

fn synth(sub_m: &clap::ArgMatches) -> AResult<()> {
	let map = channel_map(sub_m)?;
	let half_period = get_param::<usize>(sub_m, "half_period")?.unwrap_or(4);
	ensure!(half_period > 0, "half period must be at least one sample");

	let mut synth = Synth::new(half_period);
	synth.idle(half_period);
	let transactions = sub_m.values_of("BITS").map(|v| v.collect::<Vec<_>>()).unwrap_or_default();
	for bits in transactions {
		synth.select().start_bit();
		for bit in parse_bits(bits)? {
			synth.clock_bit(bit, false);
		}
		synth.deselect();
		synth.idle(half_period);
	}

	let data: Vec<u8> = synth.samples().iter().map(|pins| map.encode(*pins)).collect();
	io::stdout().write_all(&data)?;
	info!("wrote {} samples", data.len());
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@subcommand decode =>
			(about: "decode a raw capture (one byte per sample)")
			(@arg input: -i --input +takes_value "capture file (default: stdin)")
			(@arg cs: --cs +takes_value "bit of the CS channel (default: 0)")
			(@arg sk: --sk +takes_value "bit of the SK channel (default: 1)")
			(@arg si: --si +takes_value "bit of the SI channel (default: 2)")
			(@arg so: --so +takes_value "bit of the SO channel (default: 3)")
			(@arg rows: -A --rows +takes_value "comma separated annotation rows to show (default: all)")
			(@arg packets: -p --packets "also print structured packets")
		)
		(@subcommand synth =>
			(about: "write a synthesized capture to stdout")
			(@arg cs: --cs +takes_value "bit of the CS channel (default: 0)")
			(@arg sk: --sk +takes_value "bit of the SK channel (default: 1)")
			(@arg si: --si +takes_value "bit of the SI channel (default: 2)")
			(@arg so: --so +takes_value "bit of the SO channel (default: 3)")
			(@arg half_period: -w --width +takes_value "samples per clock edge (default: 4)")
			(@arg BITS: +multiple "SI bits of one transaction after the start bit, e.g. 10_000110")
		)
		(@subcommand describe =>
			(about: "show channels and annotations of the decoder")
		)
	).get_matches();

	match matches.subcommand() {
		("decode", Some(sub_m)) => {
			decode(sub_m)
		},
		("synth", Some(sub_m)) => {
			synth(sub_m)
		},
		("describe", _) => {
			print!("{}", MICROWIRE);
			Ok(())
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
