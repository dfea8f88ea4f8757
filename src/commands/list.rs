use std::{
    fs::File,
    io,
    io::{BufReader, Write},
    ptr,
};

use camino::Utf8PathBuf;
use clap::Parser;
use color_eyre::eyre::Result;
use exe_icon::{
    IconExtractor,
    icon::{GroupResource, IconDirEntry},
};
use owo_colors::OwoColorize;

use crate::commands::utils::is_valid_file;

/// Lists the icon groups of an executable and the image chosen from each
#[derive(Parser)]
pub struct List {
    #[arg(value_parser = is_valid_file, value_hint = clap::ValueHint::FilePath)]
    file_path: Utf8PathBuf,
}

impl List {
    pub fn run(self) -> Result<()> {
        let file = File::open(&self.file_path)?;
        let groups = IconExtractor::new(BufReader::new(file))?.icon_groups();

        let mut stdout_lock = anstream::stdout().lock();

        if groups.is_empty() {
            writeln!(stdout_lock, "{} has no icon groups", self.file_path)?;
            return Ok(());
        }

        write_groups(&mut stdout_lock, &groups)?;

        Ok(())
    }
}

/// Writes each group followed by its images, marking the one extraction would select.
fn write_groups<W: Write>(mut writer: W, groups: &[GroupResource]) -> io::Result<()> {
    for GroupResource {
        resource,
        name,
        group,
    } in groups
    {
        writeln!(
            writer,
            "Icon group {} ({} images)",
            name.clone()
                .unwrap_or_else(|| resource.id.to_string())
                .blue()
                .bold(),
            group.entries().len()
        )?;

        let best = group.best();
        for entry in group.entries() {
            if best.is_some_and(|best| ptr::eq(best, entry)) {
                writeln!(
                    writer,
                    "  {} {}",
                    "*".green().bold(),
                    describe(entry).green()
                )?;
            } else {
                writeln!(writer, "    {}", describe(entry))?;
            }
        }
    }

    Ok(())
}

fn describe(entry: &IconDirEntry) -> String {
    format!(
        "{}x{} {}-bit, {} bytes, icon {}",
        entry.width(),
        entry.height(),
        entry.bit_count(),
        entry.bytes_in_res(),
        entry.icon_id()
    )
}
