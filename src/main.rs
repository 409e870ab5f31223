//! mkproject's main application entry point and orchestration logic.
//! Handles command-line argument parsing, structure loading, expansion
//! and materialization.

use std::path::Path;

use mkproject::{
    cli::{get_args, Args},
    config::get_config,
    conflict::ConflictPolicy,
    error::{default_error_handler, Result},
    evaluator::MiniJinjaEvaluator,
    expander::Expander,
    logger::init_logger,
    materializer::{materialize, Status},
    parser::parse_structure,
    store::{DirectoryStore, TemplateStore},
    token::TokenContext,
    tree::{file_count, render_listing},
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    match run(args) {
        Ok(Status::CancelledPartway) => std::process::exit(2),
        Ok(_) => {}
        Err(err) => default_error_handler(err),
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads the configuration and opens the template store
/// 2. Reads the structure from a file, or from the store by project template name
/// 3. Builds the token context from built-ins and custom tokens
/// 4. Expands the structure into a resolved tree in memory
/// 5. Writes the tree, resolving conflicts with the selected policy
fn run(args: Args) -> Result<Status> {
    let cwd = std::env::current_dir()?;
    let config = get_config(args.config.as_deref(), &cwd)?;

    let store = DirectoryStore::new(
        args.file_templates.clone().unwrap_or_else(|| config.file_templates_dir()),
        args.project_templates.clone().unwrap_or_else(|| config.project_templates_dir()),
    )?;

    let structure_path = Path::new(&args.structure);
    let (structure, root_template) = if structure_path.is_file() {
        let text = std::fs::read_to_string(structure_path)?;
        (parse_structure(&text)?, None)
    } else {
        (store.resolve_project_template(&args.structure)?, Some(args.structure.as_str()))
    };

    let title = args
        .title
        .clone()
        .or_else(|| structure.title.clone())
        .or_else(|| {
            args.output_dir.file_name().map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    let description =
        args.description.clone().or_else(|| structure.description.clone()).unwrap_or_default();

    let context = TokenContext::new(title, description).with_custom_tokens(config.token_values());
    let evaluator =
        MiniJinjaEvaluator::new().with_preamble(config.preamble.clone().unwrap_or_default());

    let tree = Expander::new(&store, &evaluator).expand_tree(
        &structure.nodes,
        &context,
        root_template,
    )?;

    if args.dry_run {
        print!("{}", render_listing(&tree));
        return Ok(Status::Completed);
    }

    let policy = args.on_conflict.or(config.on_conflict).unwrap_or(ConflictPolicy::Ask);
    let mut resolver = policy.resolver(&args.output_dir);
    let report = materialize(&tree, &args.output_dir, resolver.as_mut());

    for (path, outcome) in &report.entries {
        println!("{}: '{}'", outcome, path.display());
    }

    if let Some(err) = report.error {
        return Err(err);
    }

    match report.status {
        Status::CancelledPartway => println!("Generation cancelled."),
        _ => println!(
            "Project generated in {} ({} files).",
            args.output_dir.display(),
            file_count(&tree)
        ),
    }
    Ok(report.status)
}
