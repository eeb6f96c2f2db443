use anyhow::{
    anyhow,
    bail,
};
use fatread_rs::source::ByteSource;
use fatread_rs_demos::{
    init_logging,
    open_image,
    parse_args,
    Hex,
    Stdout,
};
use log::warn;
use ufmt::{
    uWrite,
    uwrite,
    uwriteln,
};

const BYTES_PER_LINE: usize = 16;

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = parse_args("filedump <image> <mbr:true|false> <filename>", true)?;
    let path = args.target.clone().ok_or_else(|| anyhow!("missing file name"))?;
    let (mut source, volume) = open_image(&args)?;
    let mut out = Stdout::new();

    let (entry, name) = volume.lookup(&mut source, &path)?;
    if entry.is_directory() {
        bail!("{} is a directory", name);
    }
    let extents = volume.extents(&mut source, &entry).collect::<Result<Vec<_>, _>>()?;

    let mut buf = vec![0u8; volume.boot_sector().cluster_size() as usize];
    let mut offset = 0u64;
    for extent in extents {
        let data = &mut buf[..extent.len as usize];
        source.fetch(extent.address, data)?;
        for line in data.chunks(BYTES_PER_LINE) {
            uwrite!(out, "{}  ", Hex(offset, 8))?;
            for b in line {
                uwrite!(out, "{} ", Hex(*b as u64, 2))?;
            }
            for _ in line.len()..BYTES_PER_LINE {
                uwrite!(out, "     ")?;
            }
            for &b in line {
                let c = if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' };
                out.write_char(c)?;
            }
            uwriteln!(out, "")?;
            offset += line.len() as u64;
        }
    }

    if offset < entry.size() as u64 {
        warn!("{}: chain ended after {} of {} bytes", name, offset, entry.size());
    }
    Ok(())
}
