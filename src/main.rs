use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use puremark::allergens::check_allergy_detailed;
use puremark::config::toml_config::{load_config, save_config};
use puremark::config::Config;
use puremark::halal::HalalEvaluator;
use puremark::kosher::{evaluate_kosher_with, kosher_tags};
use puremark::lexicon::Lexicon;
use puremark::pipeline::{analyze_scan, ScanRequest};
use puremark::zones::segment_ocr_text;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("puremark")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Halal, kosher and allergen classification for food ingredient labels")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value("puremark.toml"),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a default configuration file")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("halal")
                .long("halal")
                .value_name("TEXT")
                .help("Evaluate one ingredient for halal compliance")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("original")
                .long("original")
                .value_name("TEXT")
                .help("Original-language ingredient text used for lecithin source resolution")
                .requires("halal")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("lenient")
                .long("lenient")
                .help("Report MUSHBOOH instead of NOT_HALAL_UNVERIFIED")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("kosher")
                .long("kosher")
                .value_name("TEXT")
                .help("Evaluate one ingredient for kosher compliance")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("allergy")
                .long("allergy")
                .value_name("TEXT")
                .help("Check one ingredient against the allergies given with --allergies")
                .requires("allergies")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("allergies")
                .long("allergies")
                .value_name("LIST")
                .help("Comma-separated user allergies")
                .value_delimiter(',')
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("segment")
                .long("segment")
                .value_name("FILE")
                .help("Segment raw OCR label text into zones")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("scan")
                .long("scan")
                .value_name("FILE")
                .help("Analyze a JSON scan request (raw_text, parsed, profile)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("lexicon-stats")
                .long("lexicon-stats")
                .help("Show lexicon table sizes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with rule-level detail")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or("puremark.toml");

    let config_found = Path::new(config_path).exists();
    let config = if config_found {
        match load_config(config_path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e:#}");
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        config.log_level()
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if config_found {
        log::info!("Loaded configuration from: {}", config_path);
    } else {
        log::warn!("Config file not found: {}, using defaults", config_path);
    }

    let lexicon = match Lexicon::load_or_global(config.engine.lexicon_dir.as_deref()) {
        Ok(lexicon) => lexicon,
        Err(e) => {
            eprintln!("Error loading lexicon: {e:#}");
            process::exit(1);
        }
    };

    if let Some(text) = matches.get_one::<String>("halal") {
        let strict = config.engine.strict_mode && !matches.get_flag("lenient");
        let original = matches.get_one::<String>("original").map(String::as_str);
        let verdict = HalalEvaluator::new(&lexicon).evaluate(text, strict, original);
        print_json(&serde_json::json!({
            "ingredient": verdict.ingredient,
            "status": verdict.status,
            "confidence": verdict.confidence,
            "reason_codes": verdict.reason_codes,
            "evidence": verdict.evidence,
            "violations": verdict.violations(),
        }));
        return;
    }

    if let Some(text) = matches.get_one::<String>("kosher") {
        let verdict = evaluate_kosher_with(text, &lexicon);
        print_json(&serde_json::json!({
            "ingredient": verdict.ingredient,
            "status": verdict.status,
            "confidence": verdict.confidence,
            "reason_codes": verdict.reason_codes,
            "evidence": verdict.evidence,
            "tags": kosher_tags(&verdict),
        }));
        return;
    }

    if let Some(text) = matches.get_one::<String>("allergy") {
        let allergies: Vec<String> = matches
            .get_many::<String>("allergies")
            .map(|values| values.map(|v| v.trim().to_string()).collect())
            .unwrap_or_default();
        print_json(&check_allergy_detailed(text, &allergies, &lexicon));
        return;
    }

    if let Some(path) = matches.get_one::<String>("segment") {
        let raw_text = read_input(path);
        print_json(&segment_ocr_text(&raw_text));
        return;
    }

    if let Some(path) = matches.get_one::<String>("scan") {
        let content = read_input(path);
        let request: ScanRequest = match serde_json::from_str(&content) {
            Ok(request) => request,
            Err(e) => {
                eprintln!("Invalid scan request in {}: {}", path, e);
                process::exit(1);
            }
        };

        match analyze_scan(&request, &lexicon, &config) {
            Ok(report) => print_json(&report),
            Err(e) => {
                log::info!("Scan rejected: {:?}", e);
                eprintln!("{}", e);
                process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("lexicon-stats") {
        print_json(&lexicon.stats());
        return;
    }

    eprintln!("Nothing to do. Use --help to see the available commands.");
    process::exit(1);
}

fn generate_default_config(path: &str) {
    match save_config(&Config::sample(), path) {
        Ok(()) => println!("Default configuration written to: {}", path),
        Err(e) => {
            eprintln!("Error generating config: {e:#}");
            process::exit(1);
        }
    }
}

fn read_input(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read {}: {}", path, e);
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            process::exit(1);
        }
    }
}
