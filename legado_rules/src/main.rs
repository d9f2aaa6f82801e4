use legado_rules::classify::{classify_stream, type_histogram, ClassifiedToken, ClassifyContext};
use legado_rules::config::runtime::RuntimeConfig;
use legado_rules::lexical::{self, TokenizerKind};
use legado_rules::{logging, pipeline};
use std::env;
use std::path::Path;

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    input: Option<String>,
    rule: Option<String>,
    kind: Option<TokenizerKind>,
    grouped: bool,
    end_rule: bool,
    json_content: bool,
    json_output: bool,
    config_path: Option<String>,
    verbose: bool,
    help: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("legado_rules");

    let options = match parse_options(&args[1.min(args.len())..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!("Usage: {} <sources.json> [--json]", program);
            eprintln!("       {} --rule <text> [--url|--inner|--page] [--group]", program);
            eprintln!("       {} --help", program);
            std::process::exit(1);
        }
    };

    if options.help {
        print_help(program);
        return Ok(());
    }

    let config = RuntimeConfig::load(options.config_path.as_deref().map(Path::new))?;
    let logging_preferences = if options.verbose {
        logging::config::verbose_preferences()
    } else {
        config.logging.clone()
    };
    logging::config::init_runtime_preferences(logging_preferences)?;
    logging::init_global_logging()?;
    if let Err(message) = pipeline::validate_pipeline() {
        logging::safe_log_error(logging::codes::system::INITIALIZATION_FAILURE, &message);
        return Err(message.into());
    }
    if options.verbose {
        eprintln!("{}", logging::get_system_diagnostics());
    }

    if let Some(rule) = &options.rule {
        analyze_single_rule(rule, &options)?;
    } else if let Some(input) = &options.input {
        process_source_file(input, &config, options.json_output)?;
    }

    Ok(())
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => options.help = true,
            "--rule" => {
                i += 1;
                let text = args.get(i).ok_or("--rule requires a rule string")?;
                options.rule = Some(text.clone());
            }
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or("--config requires a path")?;
                options.config_path = Some(path.clone());
            }
            "--url" => set_kind(&mut options, TokenizerKind::Url)?,
            "--inner" => set_kind(&mut options, TokenizerKind::Inner)?,
            "--page" => set_kind(&mut options, TokenizerKind::Page)?,
            "--group" => options.grouped = true,
            "--end-rule" => options.end_rule = true,
            "--json-content" => options.json_content = true,
            "--json" => options.json_output = true,
            "--verbose" | "-v" => options.verbose = true,
            flag if flag.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", flag);
            }
            path => {
                if options.input.is_some() {
                    return Err(format!("unexpected argument '{}'", path));
                }
                options.input = Some(path.to_string());
            }
        }
        i += 1;
    }

    if options.help {
        return Ok(options);
    }
    if options.rule.is_none() && options.input.is_none() {
        return Err("no input file or --rule given".to_string());
    }
    if options.rule.is_some() && options.input.is_some() {
        return Err("--rule cannot be combined with an input file".to_string());
    }
    Ok(options)
}

fn set_kind(options: &mut CliOptions, kind: TokenizerKind) -> Result<(), String> {
    match options.kind {
        Some(existing) if existing != kind => Err(format!(
            "--{} conflicts with --{}",
            kind.as_str(),
            existing.as_str()
        )),
        _ => {
            options.kind = Some(kind);
            Ok(())
        }
    }
}

fn print_help(program_name: &str) {
    println!("Legado rule analyzer v{}", env!("CARGO_PKG_VERSION"));
    println!("Tokenizes and classifies book-source rules");
    println!();
    println!("USAGE:");
    println!("    {} <sources.json> [--json]          # Analyze a source file", program_name);
    println!("    {} --rule <text> [options]          # Analyze one rule", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print the file report as JSON");
    println!("    --config <path>     Load runtime preferences from a TOML file");
    println!("    --verbose           Log debug events to stderr");
    println!();
    println!("RULE OPTIONS:");
    println!("    --url               Use the URL tokenizer");
    println!("    --inner             Use the inner format tokenizer");
    println!("    --page              Split a comma separated page list");
    println!("    --group             Use the grouped classifier");
    println!("    --end-rule          The rule declares an end sub-rule");
    println!("    --json-content      Classify against JSON content");
    println!();
    println!("EXAMPLES:");
    println!("    {} bookSource.json", program_name);
    println!("    {} --rule 'class.list@tag.a@href'", program_name);
    println!("    {} --rule '/s?q={{{{key}}}}' --url", program_name);
    println!();
    println!("{}", legado_rules::config::build_info::source_info());
}

fn analyze_single_rule(rule: &str, options: &CliOptions) -> Result<(), Box<dyn std::error::Error>> {
    let kind = options.kind.unwrap_or(TokenizerKind::Rule);
    let context = if options.grouped {
        ClassifyContext::grouped()
    } else {
        ClassifyContext::flat(options.end_rule, options.json_content)
    };

    let tokens = match lexical::tokenize_with(kind, rule) {
        Ok(tokens) => tokens,
        Err(error) => {
            eprintln!("FAILED: {}", error);
            eprintln!("  code: {}", error.error_code());
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    };
    let classified = classify_stream(&tokens[..], context);

    if options.json_output {
        println!("{}", serde_json::to_string_pretty(&classified)?);
    } else {
        print_classified(&classified);
    }
    Ok(())
}

fn print_classified(classified: &[ClassifiedToken]) {
    for (index, entry) in classified.iter().enumerate() {
        println!("  {:>3}  {:<14} {:?}", index, entry.rule_type.as_str(), entry.token);
    }
}

fn process_source_file(
    file_path: &str,
    config: &RuntimeConfig,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !json_output {
        println!("Processing file: {}", file_path);
    }

    match pipeline::process_file_with_config(file_path, config) {
        Ok(result) => {
            if json_output {
                println!("{}", serde_json::to_string_pretty(&result.sources)?);
            } else {
                print_pipeline_result(&result);
                println!("\nSUCCESS: Analyzed {} rules", result.total_rules());
            }
            logging::print_cargo_style_summary();

            if result.has_failures() {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("\nFAILED: {}", error);
            eprintln!("  code: {}", error.error_code());
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_pipeline_result(result: &pipeline::PipelineResult) {
    println!("Book-source summary:");
    println!(
        "  File size: {}",
        result.file_metadata.human_readable_size()
    );
    println!("  Sources: {}", result.sources.len());
    println!("  Rules analyzed: {}", result.total_rules());
    println!("  Rules rejected: {}", result.total_failures());
    println!("  Tokens: {}", result.total_tokens());
    println!(
        "  Total time: {:.2}ms",
        result.processing_duration.as_secs_f64() * 1000.0
    );

    for report in &result.sources {
        if report.skipped {
            println!("\n{} (disabled, skipped)", report.name);
            continue;
        }
        println!(
            "\n{}: {} rules, {} tokens",
            report.name,
            report.rules.len(),
            report.token_count()
        );
        for rule in &report.rules {
            let histogram = type_histogram(&rule.tokens);
            let summary: Vec<String> = histogram
                .iter()
                .map(|(rule_type, count)| format!("{}x{}", rule_type, count))
                .collect();
            println!("  {:<28} {}", rule.location, summary.join(" "));
        }
        for failure in &report.failures {
            println!(
                "  {:<28} rejected [{}] {}",
                failure.location, failure.code, failure.message
            );
        }
    }

    let diagnostics = logging::get_processing_summary();
    if diagnostics.has_errors() || diagnostics.has_warnings() {
        println!(
            "\nDiagnostics: {} errors, {} warnings",
            diagnostics.total_errors, diagnostics.total_warnings
        );
    }

    let top = result.lexical_metrics.top_markers(5);
    if !top.is_empty() {
        let markers: Vec<String> = top
            .iter()
            .map(|(marker, count)| format!("{} ({})", marker, count))
            .collect();
        println!("\nMost used markers: {}", markers.join(", "));
    }
}
