use std::path::PathBuf;

use mdl_render::{Interpreter, PngSink, RandomColors, RenderSettings, Script};

struct Args {
    script: Option<PathBuf>,
    settings: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    seed: Option<u64>,
    list: bool,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args {
        script: None,
        settings: None,
        output_dir: None,
        seed: None,
        list: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--list" | "-l" => parsed.list = true,
            "--out" | "-o" => {
                if i + 1 < args.len() {
                    parsed.output_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--settings" | "-s" => {
                if i + 1 < args.len() {
                    parsed.settings = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            },
            "--seed" => {
                if i + 1 < args.len() {
                    if let Ok(seed) = args[i + 1].parse::<u64>() {
                        parsed.seed = Some(seed);
                    }
                    i += 1;
                }
            },
            "--help" | "-h" => {
                println!("Usage: mdl-render [OPTIONS] SCRIPT.json");
                println!();
                println!("Options:");
                println!("  --out DIR, -o DIR          Output root directory (default: .)");
                println!("  --settings FILE, -s FILE   Load render settings from JSON");
                println!("  --seed N                   Fixed seed for triangle fill colors");
                println!("  --list, -l                 Print commands, symbols and knobs");
                println!("  --help, -h                 Show this help message");
                std::process::exit(0);
            },
            other => parsed.script = Some(PathBuf::from(other)),
        }
        i += 1;
    }

    parsed
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let args = parse_args();

    let mut settings = match &args.settings {
        Some(path) => RenderSettings::load(path).map_err(|e| e.to_string())?,
        None => RenderSettings::default(),
    };
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }
    settings.validate().map_err(|e| e.to_string())?;

    let script_path = args
        .script
        .ok_or_else(|| "no script given (see --help)".to_string())?;
    let script = Script::load(&script_path).map_err(|e| e.to_string())?;

    if args.list {
        print!("{}", script.listing());
    }

    let picker = match settings.seed {
        Some(seed) => RandomColors::seeded(seed),
        None => RandomColors::new(),
    };
    let mut sink = PngSink::new(&settings.output_dir);

    println!("=== mdl-render ===");
    println!("Script: {}", script_path.display());
    println!("Resolution: {}x{}", settings.width, settings.height);

    let report = Interpreter::new(&script, &settings)
        .run(picker, &mut sink)
        .map_err(|e| e.to_string())?;

    println!(
        "Rendered {} frame(s), wrote {} image(s) to {}",
        report.frames_rendered,
        report.images_written,
        sink.root().display()
    );
    if report.write_failures > 0 {
        println!("{} image(s) could not be written", report.write_failures);
    }
    Ok(())
}
