use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use dspbp::catalog::Item;
use dspbp::config::{self, Config};
use dspbp::assess::{destination_folder, TextUpdate};
use dspbp::{Annotation, Assessment, BlueprintData, BlueprintHasher, Envelope, Error, MachineTable, RecipeTable, Validation};

#[derive(Parser)]
#[command(name = "dspbp")]
#[command(about = "Dyson Sphere Program blueprint toolkit")]
struct Cli {
    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Do not validate the checksum when reading blueprint files
    #[arg(long, global = true)]
    ignore_corrupt: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump some information about blueprints
    Dump {
        #[arg(required = true)]
        infile: Vec<PathBuf>,
    },
    /// Check that blueprints re-serialize to identical bytes
    ValidateSerialize {
        /// Blueprint files and/or directories (default: configured root)
        inputs: Vec<PathBuf>,
    },
    /// List buildings whose item id is not in the catalog
    SearchUnknownIds {
        /// Blueprint directories (default: configured root)
        folders: Vec<PathBuf>,
    },
    /// Convert a blueprint to JSON
    Bp2json {
        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
        #[arg(short, long)]
        pretty_print: bool,
        infile: PathBuf,
        outfile: PathBuf,
    },
    /// Edit blueprint descriptions
    Edit {
        #[arg(short, long)]
        force: bool,
        #[arg(long, value_name = "DESCRIPTION")]
        short_desc: Option<String>,
        #[arg(long, value_name = "DESCRIPTION")]
        long_desc: Option<String>,
        infile: PathBuf,
        outfile: PathBuf,
    },
    /// Replace the buildings of one blueprint with another's, keeping its descriptions and icons
    Replace {
        original: PathBuf,
        replacement: PathBuf,
        /// Write here instead of overwriting the original
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Switch every building using one recipe to another
    ReplaceRecipe {
        #[arg(short, long)]
        force: bool,
        from: String,
        to: String,
        infile: PathBuf,
        outfile: PathBuf,
    },
    /// Assess production and footprint of blueprints
    Inspect {
        /// Blueprint files and/or directories (default: configured root)
        inputs: Vec<PathBuf>,
    },
    /// Annotate blueprint descriptions and icons from their assessment
    Annotate {
        /// Blueprint files and/or directories (default: configured root)
        inputs: Vec<PathBuf>,
        /// Also rename blueprints after their short description
        #[arg(short, long)]
        rename: bool,
        /// Also move blueprints into their category folder
        #[arg(short, long = "move")]
        move_files: bool,
        /// Override non-blank descriptions
        #[arg(short = 'b', long)]
        override_text: bool,
        /// Report without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Show or change persisted settings
    Env {
        /// Delete all settings
        #[arg(long)]
        clear: bool,
        /// `key:value` pairs to set; `key:` clears a key
        key_value_pairs: Vec<String>,
    },
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Hash computed by an external program reading the signed text on stdin
struct CommandHasher {
    program: PathBuf,
}

impl BlueprintHasher for CommandHasher {
    fn digest(&self, signed: &[u8]) -> dspbp::Result<String> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(signed)?;
        }
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Io(format!("{} exited with {}", self.program.display(), output.status)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

struct Context {
    config: Config,
    hasher: Option<CommandHasher>,
    ignore_corrupt: bool,
}

impl Context {
    fn new(config: Config, ignore_corrupt: bool) -> Self {
        let hasher = config.hasher.clone().map(|program| CommandHasher { program });
        Self { config, hasher, ignore_corrupt }
    }

    fn hasher(&self) -> Option<&dyn BlueprintHasher> {
        self.hasher.as_ref().map(|h| h as &dyn BlueprintHasher)
    }

    fn validation(&self) -> Validation<'_> {
        match self.hasher() {
            Some(hasher) if !self.ignore_corrupt => Validation::Verify(hasher),
            _ => Validation::Ignore,
        }
    }

    fn read(&self, path: &Path) -> CliResult<(Envelope, BlueprintData)> {
        let envelope = Envelope::read_from_file(path, self.validation())?;
        let data = envelope.data_with(self.config.decode_options())?;
        for anomaly in data.anomalies() {
            debug!("{}: {}", path.display(), anomaly);
        }
        Ok((envelope, data))
    }

    fn write(&self, envelope: &Envelope, path: &Path) -> CliResult<()> {
        envelope.write_to_file(path, self.hasher())?;
        info!("Wrote {}", path.display());
        Ok(())
    }

    /// Inputs as given, or the configured root when none are
    fn inputs(&self, inputs: Vec<PathBuf>) -> Vec<PathBuf> {
        if inputs.is_empty() {
            vec![self.config.root_or_default()]
        } else {
            inputs
        }
    }
}

fn refuse_overwrite(path: &Path, force: bool) -> CliResult<()> {
    if !force && path.exists() {
        return Err(format!("Refusing to overwrite: {}", path.display()).into());
    }
    Ok(())
}

/// Expand directories into the blueprint files below them
fn find_blueprints(inputs: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            walk(input, &mut files)?;
        } else {
            return Err(format!("Unknown input {}", input.display()).into());
        }
    }
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> CliResult<()> {
    debug!("Searching {}...", dir.display());
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()?;
    entries.sort();
    for path in entries {
        if path.file_name().is_some_and(|name| name == "_intro_") {
            continue;
        }
        if path.is_dir() {
            walk(&path, files)?;
        } else if path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    Ok(())
}

fn item_name(item_id: u16) -> String {
    match Item::from_building_id(item_id) {
        Some(item) => item.to_string(),
        None => format!("[{}]", item_id),
    }
}

fn dump(ctx: &Context, infiles: &[PathBuf], verbose: u8) -> CliResult<()> {
    for path in infiles {
        if infiles.len() > 1 {
            println!("{}:", path.display());
        }
        let (envelope, data) = match ctx.read(path) {
            Ok(read) => read,
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                continue;
            }
        };

        let mut counts: BTreeMap<(u16, u16), usize> = BTreeMap::new();
        for building in data.buildings() {
            let h = building.header();
            *counts.entry((h.item_id, h.recipe_id)).or_insert(0) += 1;
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));

        if !envelope.short_desc().is_empty() {
            println!("Text          : {}", envelope.short_desc());
        }
        if let Some(desc) = envelope.long_desc().filter(|d| !d.is_empty()) {
            println!("Description   : {}\n", desc);
        }
        if verbose >= 1 {
            println!("Game version  : {}", envelope.game_version());
        }
        println!("Building count: {}", data.buildings().len());
        for ((item_id, recipe_id), count) in counts {
            println!("{:5}  {} {}", count, item_name(item_id), recipe_id);
        }
        if infiles.len() > 1 {
            println!();
        }
    }
    Ok(())
}

fn validate_serialize(ctx: &Context, inputs: Vec<PathBuf>) -> CliResult<()> {
    let files = find_blueprints(&ctx.inputs(inputs))?;
    let mut validated = 0;
    let mut anomalies = 0;
    for path in &files {
        let result = ctx.read(path).and_then(|(envelope, data)| {
            anomalies += data.anomalies().len();
            Ok(data.serialize()? == envelope.payload())
        });
        match result {
            Ok(true) => validated += 1,
            Ok(false) => println!("Blueprint did not serialize as expected: {}", path.display()),
            Err(e) => println!("Blueprint could not be read: {}: {}", path.display(), e),
        }
    }

    println!("Validated {} of {} blueprints.", validated, files.len());
    if anomalies > 0 {
        info!("{} decode anomalies, run with -v for details", anomalies);
    }
    if validated != files.len() {
        println!("Please submit a bug report for blueprints that did not serialize.");
    }
    Ok(())
}

fn search_unknown_ids(ctx: &Context, folders: Vec<PathBuf>) -> CliResult<()> {
    let files = find_blueprints(&ctx.inputs(folders))?;
    for path in &files {
        let data = match ctx.read(path) {
            Ok((_, data)) => data,
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                continue;
            }
        };
        let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
        for building in data.buildings().iter().filter(|b| b.item().is_none()) {
            *counts.entry(building.header().item_id).or_insert(0) += 1;
        }
        for (item_id, count) in counts {
            println!("{:5}  [{}] {}", count, item_id, path.display());
        }
    }
    Ok(())
}

fn bp2json(ctx: &Context, force: bool, pretty: bool, infile: &Path, outfile: &Path) -> CliResult<()> {
    refuse_overwrite(outfile, force)?;
    let (_, data) = ctx.read(infile)?;
    let json = if pretty {
        format!("{}\n", data.to_json()?)
    } else {
        serde_json::to_string(&data)?
    };
    std::fs::write(outfile, json)?;
    Ok(())
}

fn edit(
    ctx: &Context,
    force: bool,
    short_desc: Option<String>,
    long_desc: Option<String>,
    infile: &Path,
    outfile: &Path,
) -> CliResult<()> {
    refuse_overwrite(outfile, force)?;
    let mut envelope = Envelope::read_from_file(infile, ctx.validation())?;
    if let Some(desc) = short_desc {
        envelope.set_short_desc(&desc);
    }
    if let Some(desc) = long_desc {
        envelope.set_long_desc(&desc);
    }
    ctx.write(&envelope, outfile)
}

fn replace(ctx: &Context, original: &Path, replacement: &Path, output: Option<PathBuf>) -> CliResult<()> {
    let mut envelope = Envelope::read_from_file(original, ctx.validation())?;
    let source = Envelope::read_from_file(replacement, ctx.validation())?;
    envelope.replace_payload(&source);
    let output = output.unwrap_or_else(|| original.to_path_buf());
    ctx.write(&envelope, &output)
}

fn replace_recipe(ctx: &Context, force: bool, from: &str, to: &str, infile: &Path, outfile: &Path) -> CliResult<()> {
    refuse_overwrite(outfile, force)?;
    let (mut envelope, mut data) = ctx.read(infile)?;
    let replaced = data.replace_recipe(from, to)?;
    println!("Replaced {} in {} buildings", from, replaced);
    envelope.set_data(&data)?;
    ctx.write(&envelope, outfile)
}

fn inspect(ctx: &Context, inputs: Vec<PathBuf>) -> CliResult<()> {
    let machines = MachineTable::standard();
    let recipes = RecipeTable::standard();
    let files = find_blueprints(&ctx.inputs(inputs))?;
    let mut failed = 0;
    for path in &files {
        match ctx.read(path) {
            Ok((_, data)) => {
                println!("Blueprint source: {}", path.display());
                println!("{}\n", Assessment::new(&data, &machines, &recipes));
            }
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        info!("Inspected {} of {} blueprints", files.len() - failed, files.len());
    }
    Ok(())
}

struct AnnotateOptions {
    rename: bool,
    move_files: bool,
    override_text: bool,
    dry_run: bool,
}

fn annotate(ctx: &Context, inputs: Vec<PathBuf>, options: &AnnotateOptions, verbose: u8) -> CliResult<()> {
    let machines = MachineTable::standard();
    let recipes = RecipeTable::standard();
    for path in find_blueprints(&ctx.inputs(inputs))? {
        let (mut envelope, data) = match ctx.read(&path) {
            Ok(read) => read,
            Err(e) => {
                warn!("{}: {}", path.display(), e);
                continue;
            }
        };
        let assessment = Assessment::new(&data, &machines, &recipes);
        let annotation = Annotation::new(&assessment, &machines);
        let parent = path.parent().unwrap_or(Path::new("")).to_path_buf();
        let folder = destination_folder(&parent, &assessment);
        if verbose >= 1 {
            println!("Blueprint source: {}", path.display());
            println!("{}", assessment);
            println!("Folder: {}", folder.display());
            println!("Short description: {}", annotation.short_desc);
            println!("Long description:\n{}\n---", annotation.long_desc);
        }

        if path.to_string_lossy().contains(" of ") {
            println!("Skipping annotation of {} as part of set", path.display());
            continue;
        }

        let update = annotation.apply_descriptions(&mut envelope, options.override_text);
        if update.short_desc == TextUpdate::Skipped {
            println!("Skipping short description rewrite");
        }
        if update.long_desc == TextUpdate::Skipped {
            println!("Skipping long description rewrite");
        }
        annotation.apply_icons(&mut envelope);

        let dir = if options.move_files { folder } else { parent };
        let name = if options.rename {
            format!("{}.txt", annotation.short_desc.replace(['/', '\\'], "-"))
        } else {
            path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
        };
        let final_path = dir.join(name);
        let relocated = match (final_path.canonicalize(), path.canonicalize()) {
            (Ok(target), Ok(source)) => target != source,
            _ => true,
        };
        debug!(
            "Final filename: {} ({})",
            final_path.display(),
            if relocated { "will rename" } else { "no rename" }
        );
        if options.dry_run {
            continue;
        }

        if envelope.is_pristine() && !relocated {
            debug!("{} already annotated", path.display());
            continue;
        }
        std::fs::create_dir_all(&dir)?;
        ctx.write(&envelope, &final_path)?;
        if relocated {
            debug!("Removing {}...", path.display());
            std::fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn env(mut config: Config, clear: bool, pairs: &[String]) -> CliResult<()> {
    let path = Config::path();
    if clear {
        config = Config::default();
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
    }
    if !pairs.is_empty() {
        for pair in pairs {
            config.apply(pair)?;
        }
        config.save()?;
    }

    println!("Environment location: {}", path.display());
    if !path.exists() {
        println!("No environment variables defined.");
    }
    for (key, help) in config::KEYS {
        let value = config.get(key).unwrap_or_else(|| "n/a".to_string());
        println!("{:20} {:20}\n\t{}", key, value, help);
    }
    let root = config.root_or_default();
    println!(
        "Blueprint path: {} ({})",
        root.display(),
        if root.is_dir() { "valid" } else { "invalid" }
    );
    Ok(())
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    if let Commands::Env { clear, key_value_pairs } = &cli.command {
        return env(config, *clear, key_value_pairs);
    }

    let ctx = Context::new(config, cli.ignore_corrupt);
    if ctx.hasher.is_none() && !ctx.ignore_corrupt {
        debug!("No hasher configured, checksums are not verified");
    }

    match cli.command {
        Commands::Dump { infile } => dump(&ctx, &infile, cli.verbose),
        Commands::ValidateSerialize { inputs } => validate_serialize(&ctx, inputs),
        Commands::SearchUnknownIds { folders } => search_unknown_ids(&ctx, folders),
        Commands::Bp2json { force, pretty_print, infile, outfile } => {
            bp2json(&ctx, force, pretty_print, &infile, &outfile)
        }
        Commands::Edit { force, short_desc, long_desc, infile, outfile } => {
            edit(&ctx, force, short_desc, long_desc, &infile, &outfile)
        }
        Commands::Replace { original, replacement, output } => replace(&ctx, &original, &replacement, output),
        Commands::ReplaceRecipe { force, from, to, infile, outfile } => {
            replace_recipe(&ctx, force, &from, &to, &infile, &outfile)
        }
        Commands::Inspect { inputs } => inspect(&ctx, inputs),
        Commands::Annotate { inputs, rename, move_files, override_text, dry_run } => {
            let options = AnnotateOptions { rename, move_files, override_text, dry_run };
            annotate(&ctx, inputs, &options, cli.verbose)
        }
        Commands::Env { .. } => Ok(()),
    }
}
