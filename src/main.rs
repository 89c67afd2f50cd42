use std::path::{Path, PathBuf};

use anyhow::{Context, Result as R, bail};
use clap::Parser;
use wavcodex_lib::*;

const BUF_SIZE: usize = 5001;

/// Prints the header of each wave file and copies its samples into OUTPUT.
#[derive(Parser, Debug)]
#[command(name = "wavcodex", version, about)]
struct Cli {
    /// Wave files to read
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// File the samples are copied into (rewritten for every input)
    #[arg(short, long, default_value = "out.wav")]
    output: PathBuf,

    /// Frames moved per read/write call
    #[arg(long, default_value_t = BUF_SIZE)]
    batch: usize,
}

fn main() -> R<()> {
    let cli = Cli::parse();
    let batch = cli.batch.max(1);

    if let Some(input_file) = cli.files.iter().find(|f| same_file(f, &cli.output)) {
        bail!(
            "Output {} is the same file as input {}",
            cli.output.display(),
            input_file.display()
        );
    }

    for input_file in &cli.files {
        let start_time = std::time::Instant::now();
        let mut reader = WaveFile::open(input_file)
            .with_context(|| format!("Failed to open {}", input_file.display()))?;
        println!("{}", reader);

        let mut writer = WaveFile::create_with_spec(&cli.output, reader.spec())
            .with_context(|| format!("Failed to create {}", cli.output.display()))?;

        let channels = usize::from(reader.num_channels());
        let mut buffer = vec![0f64; batch * channels];
        loop {
            let frames_read = reader.read_frames(&mut buffer, batch)?;
            let frames_written = writer.write_frames(&buffer, frames_read)?;
            println!("{} {}", frames_read, frames_written);
            if frames_read == 0 {
                break;
            }
        }

        reader.close()?;
        writer.close()?;

        dprintln!(
            "Copied {} in {} seconds",
            input_file.display(),
            start_time.elapsed().as_secs_f32()
        );
    }

    Ok(())
}

// Paths that cannot be resolved yet (an output that does not exist) never match.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_file_resolves_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.wav");
        std::fs::write(&input, b"RIFF").unwrap();

        let alias = dir.path().join(".").join("in.wav");
        assert!(same_file(&input, &alias));
        assert!(!same_file(&input, &dir.path().join("out.wav")));
    }
}
