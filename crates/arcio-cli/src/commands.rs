use anyhow::{Context, Result};
use arcio::{Archive, Target};

use crate::app::{PackArg, UnpackArg};

pub fn pack(arg: PackArg) -> Result<()> {
    let mut archive = Archive::new(Target::path(&arg.archive), arg.format.as_deref())
        .with_context(|| format!("Cannot pack into '{}'", arg.archive.display()))?;
    tracing::info!(archive = %arg.archive.display(), extension = archive.extension(), "packing");

    archive
        .save(&arg.paths, arg.base.as_deref())
        .with_context(|| format!("Failed to write archive '{}'", arg.archive.display()))?;

    println!("{}", arg.archive.display());
    Ok(())
}

pub fn unpack(arg: UnpackArg) -> Result<()> {
    let mut archive = Archive::new(Target::path(&arg.archive), arg.format.as_deref())
        .with_context(|| format!("Cannot unpack '{}'", arg.archive.display()))?;
    tracing::info!(archive = %arg.archive.display(), extension = archive.extension(), "unpacking");

    std::fs::create_dir_all(&arg.destination)
        .with_context(|| format!("Failed to create '{}'", arg.destination.display()))?;
    let extracted = archive
        .load(&arg.destination)
        .with_context(|| format!("Failed to extract '{}'", arg.archive.display()))?;

    for path in extracted {
        println!("{}", path.display());
    }
    Ok(())
}

pub fn formats() -> Result<()> {
    for extension in arcio::extensions() {
        println!("{extension}");
    }
    Ok(())
}
