use std::{fs, io::Write};

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use color_eyre::eyre::{Result, bail};
use exe_icon::try_extract_icon;
use image::ImageFormat;
use indicatif::ProgressStyle;
use owo_colors::OwoColorize;
use tracing::{info_span, warn};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use crate::commands::utils::{is_valid_directory, is_valid_file};

/// Extracts the best icon of each executable and saves it as a PNG
#[derive(Parser)]
pub struct Extract {
    /// The executables to extract icons from
    #[arg(required = true, value_parser = is_valid_file, value_hint = clap::ValueHint::FilePath)]
    files: Vec<Utf8PathBuf>,

    /// Directory to save the PNGs in. Defaults to the directory of each executable
    #[arg(
        short,
        long,
        env = "EXE_ICON_OUTPUT_DIR",
        value_parser = is_valid_directory,
        value_hint = clap::ValueHint::DirPath
    )]
    output_dir: Option<Utf8PathBuf>,

    /// Replace PNGs that already exist
    #[arg(long)]
    overwrite: bool,
}

impl Extract {
    const PROGRESS_TEMPLATE: &'static str =
        "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

    pub fn run(self) -> Result<()> {
        if let Some(output_dir) = &self.output_dir {
            fs::create_dir_all(output_dir)?;
        }

        let span = info_span!("extract");
        span.pb_set_style(&ProgressStyle::with_template(Self::PROGRESS_TEMPLATE)?);
        span.pb_set_length(self.files.len() as u64);
        let _entered = span.enter();

        let mut extracted = 0;
        let mut stdout_lock = anstream::stdout().lock();
        for file in &self.files {
            span.pb_set_message(file.file_name().unwrap_or_else(|| file.as_str()));

            match self.extract_one(file) {
                Ok(output) => {
                    extracted += 1;
                    writeln!(
                        stdout_lock,
                        "{} {file} {} {output}",
                        "Extracted".green().bold(),
                        "->".bright_black()
                    )?;
                }
                Err(error) => warn!("{file}: {error}"),
            }

            span.pb_inc(1);
        }

        if extracted == 0 {
            bail!("No icons were extracted from {} file(s)", self.files.len())
        }

        Ok(())
    }

    fn extract_one(&self, file: &Utf8Path) -> Result<Utf8PathBuf> {
        let output = self.output_path(file);
        if output.exists() && !self.overwrite {
            bail!("{output} already exists. Use --overwrite to replace it")
        }

        let icon = try_extract_icon(file)?;
        icon.save_with_format(&output, ImageFormat::Png)?;
        Ok(output)
    }

    /// `<output dir>/<file stem>.png`, next to the executable if no output directory was given.
    fn output_path(&self, file: &Utf8Path) -> Utf8PathBuf {
        let stem = file.file_stem().unwrap_or("icon");
        let directory = self
            .output_dir
            .as_deref()
            .or_else(|| file.parent())
            .unwrap_or_else(|| Utf8Path::new("."));
        directory.join(format!("{stem}.png"))
    }
}
