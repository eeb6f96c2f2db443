use anyhow::{
    anyhow,
    Context,
};
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

fn parse_cluster(arg: &str) -> anyhow::Result<u32> {
    let parsed = match arg.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => arg.parse(),
    };
    parsed.with_context(|| format!("bad start cluster {:?}", arg))
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let args = parse_args("chaindump <image> <mbr:true|false> <startcluster>", true)?;
    let start = parse_cluster(args.target.as_deref().ok_or_else(|| anyhow!("missing start cluster"))?)?;
    let (mut source, volume) = open_image(&args)?;
    let digits = volume.fat_type().entry_digits();
    let mut out = Stdout::new();

    let mut chain = volume.chain(&mut source, start);
    for cluster in chain.by_ref() {
        let cluster = cluster?;
        uwrite!(out, "{} ", Hex(cluster as u64, digits))?;
    }
    if let Some(eoc) = chain.terminator() {
        uwrite!(out, "{}", Hex(eoc as u64, digits))?;
    }
    uwriteln!(out, "")?;
    Ok(())
}
