use fatread_rs::fat::Volume;
use fatread_rs_demos::{
    init_logging,
    open_image,
    parse_args,
    Hex,
    Stdout,
};
use ufmt::{
    uwrite,
    uwriteln,
};

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = parse_args("fatdump <image> <mbr:true|false>", false)?;
    let (mut source, volume) = open_image(&args)?;
    let mut out = Stdout::new();

    uwrite!(out, "{} volume at ", volume.fat_type().name())?;
    uwriteln!(out, "{}", Hex(volume.partition_offset(), 8))?;
    uwrite!(out, "{:?}", volume.boot_sector())?;
    uwriteln!(out, "root directory:")?;

    for maybe_entry in volume.dir(&mut source, Volume::ROOT) {
        let (entry, name) = maybe_entry?;
        let kind = if entry.is_volume_label() {
            "[VOL]"
        } else if entry.is_directory() {
            "[DIR]"
        } else {
            "[FIL]"
        };
        uwriteln!(
            out,
            "  {} {} {} {}",
            kind,
            Hex(entry.first_cluster() as u64, volume.fat_type().entry_digits()),
            entry.size(),
            name
        )?;
    }
    Ok(())
}
