use clap::Parser;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use thumbjet::{Thumb, Writer};

#[derive(Parser, Debug)]
#[clap(name = "thumbjet")]
struct Cli {
    #[arg(required = true)]
    path: String,

    #[arg(short, long, default_value_t = 128, help = "Maximum output width")]
    width: u32,

    #[arg(short = 'H', long, default_value_t = 128, help = "Maximum output height")]
    height: u32,

    #[arg(short, long, value_parser = ["png", "ppm"], help = "Output format")]
    format: Option<String>,

    #[arg(short = 'o', long = "output-dir", help = "Output directory for thumbnails")]
    output_dir: Option<String>,

    #[arg(long, help = "Print image information instead of writing a thumbnail")]
    info: bool,

    #[arg(long, help = "Decode the image without writing to a file")]
    void: bool,
}

fn get_files(path: &str) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".."));
    let absolute_pattern = if Path::new(path).is_relative() {
        base_dir.join(path).to_string_lossy().into_owned()
    } else {
        path.to_string()
    };

    for entry in glob(&absolute_pattern).expect("Failed to read glob pattern") {
        match entry {
            Ok(path) => {
                if !path.is_file() {
                    continue;
                }

                files.push(path);
            }
            Err(e) => println!("{:?}", e),
        }
    }

    files
}

fn get_output_path(file: &Path, output_dir: Option<&str>, format: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let file_stem = file
        .file_stem()
        .ok_or("Invalid file name")?
        .to_str()
        .ok_or("Invalid file stem")?;

    let output_path = if let Some(dir) = output_dir {
        let output_dir = Path::new(dir);

        // Create output directory if it doesn't exist
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)?;
        }

        // If output_dir is relative, make it relative to current directory
        let output_dir = if output_dir.is_relative() {
            std::env::current_dir()?.join(output_dir)
        } else {
            output_dir.to_path_buf()
        };

        output_dir.join(format!("{}_thumb.{}", file_stem, format))
    } else {
        // If no output directory specified, use the input file's directory
        file.parent()
            .unwrap_or_else(|| Path::new(".."))
            .join(format!("{}_thumb.{}", file_stem, format))
    };

    Ok(output_path)
}

fn process_file(file: &Path, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    println!("File: {}", file.display());

    let mut thumb = Thumb::open(file)?;
    thumb.set_decode_size(cli.width, cli.height)?;

    if cli.void {
        let _ = thumb.pixels();
        return Ok(());
    }

    if cli.info {
        let _ = thumb.decode();
        println!("{:?}", thumb.info());
        return Ok(());
    }

    let pixels = match thumb.pixels() {
        Some(pixels) => pixels,
        None => {
            eprintln!("No thumbnail produced for {}", file.display());
            return Ok(());
        }
    };

    // The rectangle may have been clamped during decode, read it after
    // the pixel fetch.
    let (out_w, out_h) = thumb.output_size();

    let format = cli.format.as_deref().unwrap_or("png");
    let output_path = get_output_path(file, cli.output_dir.as_deref(), format)?;

    if let Some(parent) = output_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    println!("Writing {}x{} thumbnail to: {}", out_w, out_h, output_path.display());
    match format {
        "ppm" => {
            Writer::write_ppm(&output_path, out_w, out_h, &pixels)?;
        }
        _ => {
            Writer::write_png(&output_path, out_w, out_h, &pixels)?;
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let files = get_files(&cli.path);

    if files.is_empty() {
        eprintln!("No files found matching pattern: {}", cli.path);
        return Ok(());
    }

    for file in files {
        if let Err(err) = process_file(&file, &cli) {
            eprintln!("Error processing file: {:?}", err);
            continue;
        }
    }

    Ok(())
}
