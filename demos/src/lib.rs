//! Shared plumbing for the demo binaries: argument handling, stdout and stderr logging.

use anyhow::{
    anyhow,
    bail,
    Context,
};
use fatread_rs::{
    fat::{
        Layout,
        Volume,
    },
    hexfmt,
    source::FileSource,
};
use log::{
    LevelFilter,
    Metadata,
    Record,
};
use std::{
    env,
    fs::File,
    io::{
        self,
        BufReader,
        Write,
    },
};
use ufmt::{
    uDisplay,
    uWrite,
    Formatter,
};

pub type ImageSource = FileSource<BufReader<File>>;

/// `uWrite` over stdout.
pub struct Stdout(io::Stdout);

impl Stdout {
    pub fn new() -> Stdout {
        Stdout(io::stdout())
    }
}

impl uWrite for Stdout {
    type Error = io::Error;

    fn write_str(&mut self, s: &str) -> Result<(), io::Error> {
        self.0.write_all(s.as_bytes())
    }
}

/// A number printed with [`hexfmt`].
pub struct Hex(pub u64, pub usize);

impl uDisplay for Hex {
    fn fmt<W>(&self, out: &mut Formatter<W>) -> Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        hexfmt(out, self.0, self.1)
    }
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Log to stderr at the level named by `FATREAD_LOG` (default `warn`).
pub fn init_logging() -> anyhow::Result<()> {
    let level = match env::var("FATREAD_LOG") {
        Ok(name) => name.parse::<LevelFilter>().map_err(|_| anyhow!("bad FATREAD_LOG value {:?}", name))?,
        Err(_) => LevelFilter::Warn,
    };
    log::set_logger(&LOGGER).map_err(|_| anyhow!("logger already installed"))?;
    log::set_max_level(level);
    Ok(())
}

pub struct Args {
    pub image: String,
    pub layout: Layout,
    pub target: Option<String>,
}

/// `<image> <mbr:true|false> [target]`
pub fn parse_args(usage: &str, with_target: bool) -> anyhow::Result<Args> {
    let args: Vec<String> = env::args().skip(1).collect();
    let expected = if with_target { 3 } else { 2 };
    if args.len() != expected {
        bail!("usage: {}", usage);
    }

    let layout = match args[1].as_str() {
        "true" => Layout::WithPartitionTable,
        "false" => Layout::Raw,
        other => bail!("expected true or false for the mbr flag, got {:?}\nusage: {}", other, usage),
    };
    Ok(Args { image: args[0].clone(), layout, target: args.get(2).cloned() })
}

pub fn open_image(args: &Args) -> anyhow::Result<(ImageSource, Volume)> {
    let file = File::open(&args.image).with_context(|| format!("can't open {}", args.image))?;
    let mut source = FileSource::new(BufReader::new(file));
    let volume = Volume::open(&mut source, args.layout)
        .with_context(|| format!("can't read a FAT volume from {}", args.image))?;
    Ok((source, volume))
}
