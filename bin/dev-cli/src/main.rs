use std::env;
use std::process;

use model_codegen_config::log::{LogFormat, LoggingConfig};
use model_codegen_config::{load_config, CodegenConfig};
use model_codegen_core::ast::document::CompiledDocument;
use model_codegen_core::merge::merged_field::DisplayFields;
use model_codegen_core::merge::{collect_and_merge_fields, collect_fragment_spreads};
use model_codegen_core::models::resolve_all_models;
use model_codegen_core::output::{version_comment, Frontend};
use model_codegen_core::state::schema_state::SchemaState;
use model_codegen_core::type_info::resolve_type_ref;
use model_codegen_core::utils::parsing::{parse_operation, parse_schema};
use model_codegen_core::MergeContext;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_logger(log_config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_config.env_filter_str()));
    let registry = tracing_subscriber::registry().with(filter);

    match log_config.format {
        LogFormat::PrettyTree => {
            let tree_layer = tracing_tree::HierarchicalLayer::new(2)
                .with_bracketed_fields(true)
                .with_deferred_spans(false)
                .with_wraparound(25)
                .with_indent_lines(true)
                .with_timer(tracing_tree::time::Uptime::default())
                .with_thread_names(false)
                .with_thread_ids(false)
                .with_targets(false);

            registry.with(tree_layer).init();
        }
        LogFormat::Json => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

fn main() {
    let mut config_path = None;
    let mut json = false;
    let mut args: Vec<String> = vec![];

    for arg in env::args() {
        if let Some(path) = arg.strip_prefix("--config=") {
            config_path = Some(path.to_string());
        } else if arg == "--json" {
            json = true;
        } else {
            args.push(arg);
        }
    }

    let config = load_config(config_path).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });
    init_logger(&config.log);

    if args.len() < 2 {
        eprintln!("Usage: codegen-dev-cli [--config=<path>] [--json] <command> [...]");
        process::exit(1);
    }

    match args[1].as_str() {
        "models" => {
            let schema_path = args
                .get(2)
                .unwrap_or_else(|| usage_error("models <schema_path>"));
            process_models(schema_path, json);
        }
        "type" => {
            let schema_path = args
                .get(2)
                .unwrap_or_else(|| usage_error("type <schema_path> <type_ref>"));
            let schema = parse_schema(&read_file(schema_path));
            let state = SchemaState::new(&schema);
            let type_ref = args.get(3).unwrap_or_else(|| usage_error("type <schema_path> <type_ref>"));
            let descriptor = resolve_type_ref(type_ref, &state);

            println!(
                "{}",
                serde_json::to_string_pretty(&descriptor).expect("failed to serialize")
            );
        }
        "merge" => {
            let (schema_path, operation_path) = match (args.get(2), args.get(3)) {
                (Some(schema_path), Some(operation_path)) => (schema_path, operation_path),
                _ => usage_error("merge <schema_path> <operation_path> [operation_name]"),
            };
            process_merge(
                &config,
                schema_path,
                operation_path,
                args.get(4).map(String::as_str),
                json,
            );
        }
        "output" => process_output(&config, args.get(2).map(String::as_str)),
        _ => {
            eprintln!("Unknown command. Available commands: models, type, merge, output");
            process::exit(1);
        }
    };
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Usage: codegen-dev-cli {}", usage);
    process::exit(1);
}

fn read_file(path: &str) -> String {
    std::fs::read_to_string(path).expect("Unable to read input file")
}

fn process_models(schema_path: &str, json: bool) {
    let schema = parse_schema(&read_file(schema_path));
    let state = SchemaState::new(&schema);
    let models = resolve_all_models(&state).expect("failed to resolve models");

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&models).expect("failed to serialize")
        );
        return;
    }

    for model in &models {
        println!("{} ({:?})", model.name, model.kind);
        for field in &model.fields {
            let descriptor = &field.type_descriptor;
            println!(
                "  {}: {} nullable={} list={} element_nullable={}",
                field.name,
                descriptor.base_type_name,
                descriptor.is_nullable,
                descriptor.is_list,
                descriptor.is_list_element_nullable
            );
        }
    }
}

fn process_merge(
    config: &CodegenConfig,
    schema_path: &str,
    operation_path: &str,
    operation_name: Option<&str>,
    json: bool,
) {
    let schema = parse_schema(&read_file(schema_path));
    let state = SchemaState::new(&schema);
    let document = parse_operation(&read_file(operation_path));
    let compiled =
        CompiledDocument::compile(&state, &document).expect("failed to compile document");
    let operation = compiled
        .operation(operation_name)
        .expect("operation not found, pass an operation name");

    let mut ctx = MergeContext::new(&state, &compiled.fragments)
        .with_merge_fragment_spreads(config.merge.merge_fragment_spreads)
        .with_max_depth(config.merge.max_depth);
    let fields = collect_and_merge_fields(&mut ctx, &operation.selection_set)
        .expect("failed to merge fields");
    info!(fields = fields.len(), "merged operation");

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&fields).expect("failed to serialize")
        );
    } else {
        print!("{}", DisplayFields(&fields));
    }

    if !config.merge.merge_fragment_spreads {
        for reference in
            collect_fragment_spreads(&state, &compiled.fragments, &operation.selection_set)
        {
            let conditions = reference
                .conditions
                .iter()
                .map(|condition| condition.to_string())
                .collect::<Vec<_>>();
            println!("...{} [{}]", reference.fragment_name, conditions.join(" | "));
        }
    }
}

fn process_output(config: &CodegenConfig, frontend: Option<&str>) {
    let frontend = match frontend {
        Some(name) => name.parse::<Frontend>().unwrap_or_else(|err| {
            eprintln!("{}", err);
            process::exit(1);
        }),
        None => config
            .frontend
            .unwrap_or_else(|| usage_error("output <frontend>")),
    };

    println!("{}", frontend.output_dir().display());
    if let Some(comment) = version_comment(
        config.versions.cli_version.as_deref(),
        config.versions.codegen_version.as_deref(),
    ) {
        println!("{}", comment);
    }
}
