use std::fs::File;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use itertools::Itertools;
use memmap2::Mmap;
use rayon::prelude::*;
use rootcause::prelude::*;

use hlmdl::loader::{self, CompanionDecode, LoadOptions, LoadedModel};
use hlmdl::mdl::{self, FileKind, FormatError};

/// Inspect GoldSrc studio model (.mdl) files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a summary of one model, loading its companion files
    Info {
        /// Path to the primary .mdl file
        model: PathBuf,
        /// Decode every section of the external texture file, not just its
        /// texture metadata
        #[clap(long)]
        full_companions: bool,
        /// Emit the summary as JSON
        #[clap(long)]
        json: bool,
    },
    /// Parse every .mdl under a directory and report files that fail
    Scan {
        /// Directory to walk recursively
        dir: PathBuf,
    },
}

#[derive(serde::Serialize)]
struct ModelSummary {
    name: String,
    internal_name: String,
    version: i32,
    bones: usize,
    bone_controllers: usize,
    hitboxes: usize,
    sequences: usize,
    total_frames: u64,
    sequence_groups: usize,
    sequence_files: Vec<String>,
    textures: usize,
    external_texture_file: bool,
    skin_refs: usize,
    body_parts: usize,
    attachments: usize,
    transitions: usize,
}

impl ModelSummary {
    fn new(model: &LoadedModel) -> Self {
        let primary = &model.primary;
        ModelSummary {
            name: model.name.clone(),
            internal_name: primary.header.name.clone(),
            version: primary.header.version,
            bones: primary.bones.len(),
            bone_controllers: primary.bone_controllers.len(),
            hitboxes: primary.hitboxes.len(),
            sequences: primary.sequences.len(),
            total_frames: model.total_frames(),
            sequence_groups: primary.sequence_groups.len(),
            sequence_files: model
                .sequence_files
                .iter()
                .map(|file| file.name.clone())
                .collect(),
            textures: model.textures().len(),
            external_texture_file: model.texture_file.is_some(),
            skin_refs: model.skins().len(),
            body_parts: primary.body_parts.len(),
            attachments: primary.attachments.len(),
            transitions: primary.transitions.len(),
        }
    }
}

fn main() -> Result<(), Report> {
    let args = Args::parse();

    match args.command {
        Command::Info {
            model,
            full_companions,
            json,
        } => info(&model, full_companions, json),
        Command::Scan { dir } => scan(&dir),
    }
}

fn info(path: &Path, full_companions: bool, json: bool) -> Result<(), Report> {
    let companion_decode = if full_companions {
        CompanionDecode::Full
    } else {
        CompanionDecode::Metadata
    };
    let options = LoadOptions::builder()
        .companion_decode(companion_decode)
        .build();
    let model = loader::load_from_disk(path, &options)?;

    if json {
        let summary = ModelSummary::new(&model);
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| rootcause::report!("failed to render summary: {e}"))?;
        println!("{rendered}");
        return Ok(());
    }

    let primary = &model.primary;
    println!("{} (version {})", primary.header.name, primary.header.version);
    println!(
        "  bones: {}  controllers: {}  hit boxes: {}  attachments: {}  body parts: {}",
        primary.bones.len(),
        primary.bone_controllers.len(),
        primary.hitboxes.len(),
        primary.attachments.len(),
        primary.body_parts.len(),
    );
    println!(
        "  sequences: {} ({} frames total)",
        primary.sequences.len(),
        model.total_frames(),
    );
    if !primary.sequences.is_empty() {
        println!(
            "    {}",
            primary
                .sequences
                .iter()
                .map(|sequence| sequence.label.as_str())
                .join(", "),
        );
    }
    if !model.sequence_files.is_empty() {
        println!(
            "  sequence group files: {}",
            model
                .sequence_files
                .iter()
                .map(|file| file.name.as_str())
                .join(", "),
        );
    }
    let textures = model.textures();
    let texture_names = if textures.is_empty() {
        "none".to_owned()
    } else {
        textures
            .iter()
            .map(|texture| texture.name.as_str())
            .join(", ")
    };
    if model.texture_file.is_some() {
        println!("  textures (external): {texture_names}");
    } else {
        println!("  textures: {texture_names}");
    }
    println!("  skin refs: {}", model.skins().len());
    if !primary.transitions.is_empty() {
        println!("  transitions: {}", primary.transitions.len());
    }
    Ok(())
}

enum ScanResult {
    Model,
    SequenceFile,
    Failed(String),
}

fn scan(dir: &Path) -> Result<(), Report> {
    let mut paths = Vec::new();
    collect_mdl_paths(dir, &mut paths)
        .context_with(|| format!("failed to walk {}", dir.display()))?;
    paths.sort();

    let outcomes: Vec<(PathBuf, ScanResult)> = paths
        .into_par_iter()
        .map(|path| {
            let result = scan_one(&path);
            (path, result)
        })
        .collect();

    let mut models = 0usize;
    let mut sequence_files = 0usize;
    let mut failures = Vec::new();
    for (path, result) in outcomes {
        match result {
            ScanResult::Model => models += 1,
            ScanResult::SequenceFile => sequence_files += 1,
            ScanResult::Failed(error) => failures.push((path, error)),
        }
    }

    println!("{models} model files parsed");
    println!("{sequence_files} sequence group files parsed");
    if !failures.is_empty() {
        println!("{} files failed:", failures.len());
        for (path, error) in &failures {
            println!("  {}: {error}", path.display());
        }
        bail!("{} files failed to parse", failures.len());
    }
    Ok(())
}

fn scan_one(path: &Path) -> ScanResult {
    let data = match map_file(path) {
        Ok(data) => data,
        Err(e) => return ScanResult::Failed(e.to_string()),
    };

    match mdl::parse(&data) {
        Ok(_) => ScanResult::Model,
        Err(FormatError::WrongFileKind {
            found: FileKind::SequenceGroup,
            ..
        }) => match mdl::decode_sequence_header(&data) {
            Ok(_) => ScanResult::SequenceFile,
            Err(e) => ScanResult::Failed(e.to_string()),
        },
        Err(e) => ScanResult::Failed(e.to_string()),
    }
}

fn map_file(path: &Path) -> std::io::Result<Mmap> {
    let file = File::open(path)?;
    unsafe { Mmap::map(&file) }
}

fn collect_mdl_paths(dir: &Path, paths: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_mdl_paths(&path, paths)?;
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("mdl"))
        {
            paths.push(path);
        }
    }
    Ok(())
}
