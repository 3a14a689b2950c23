use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use clap_complete::generate;
use colored::Colorize;
use tracing::debug;

use category_agent_core::config::Config;
use category_agent_core::{
    CategoryAgentError, CategoryAssignmentAgent, CategoryTree, ClassificationResult, Confidence,
    LlmBackend, LlmDecisionMaker, Result, SAMPLE_CATEGORIES,
};

mod args;
mod logger;
use args::{Backend, Cli, Commands, ConfigAction, Shell};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // credentials may live in a .env next to the working directory
    dotenvy::dotenv().ok();
    logger::init(cli.verbose, cli.quiet);

    let base_dir = resolve_base_dir(cli.base_dir);
    let file = cli.file.as_deref();
    let quiet = cli.quiet;

    let result = match cli.command {
        Some(Commands::Tree) => handle_tree(&base_dir, file),
        Some(Commands::Children { path, strict }) => {
            handle_children(&base_dir, file, &path, strict, quiet)
        }
        Some(Commands::Categories) => handle_categories(&base_dir, file),
        Some(Commands::Classify {
            description,
            backend,
            model,
            max_steps,
            json,
        }) => handle_classify(
            &base_dir,
            file,
            &description,
            backend,
            model,
            max_steps,
            json,
        ),
        Some(Commands::Config { action }) => handle_config(action, &base_dir),
        Some(Commands::Completions { shell }) => {
            handle_completions(shell);
            Ok(())
        }
        None => {
            Cli::command().print_help().ok();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "[ERROR]".red().bold(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn handle_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let shell = match shell {
        Shell::Bash => clap_complete::Shell::Bash,
        Shell::Zsh => clap_complete::Shell::Zsh,
        Shell::Fish => clap_complete::Shell::Fish,
        Shell::PowerShell => clap_complete::Shell::PowerShell,
        Shell::Elvish => clap_complete::Shell::Elvish,
    };
    generate(shell, &mut cmd, "category-agent", &mut io::stdout());
}

fn resolve_base_dir(cli_base: Option<PathBuf>) -> PathBuf {
    if let Some(base) = cli_base {
        return base;
    }

    if let Ok(base) = std::env::var("CATEGORY_AGENT_BASE") {
        return PathBuf::from(base);
    }

    dirs::home_dir()
        .map(|h| h.join(".category-agent"))
        .unwrap_or_else(|| PathBuf::from(".category-agent"))
}

/// Load the taxonomy: --file, then taxonomy.file / categories.txt, then the samples
fn load_tree(config: &Config, base_dir: &Path, file: Option<&Path>) -> Result<CategoryTree> {
    let path = file
        .map(Path::to_path_buf)
        .or_else(|| config.taxonomy_file(base_dir));

    match path {
        Some(path) => CategoryTree::load_file(&path),
        None => {
            debug!("no taxonomy file configured, using built-in samples");
            Ok(CategoryTree::from_paths(SAMPLE_CATEGORIES))
        }
    }
}

fn handle_tree(base_dir: &Path, file: Option<&Path>) -> Result<()> {
    let config = Config::load(base_dir)?;
    let tree = load_tree(&config, base_dir, file)?;
    print!("{}", tree.render());
    Ok(())
}

fn handle_children(
    base_dir: &Path,
    file: Option<&Path>,
    path: &str,
    strict: bool,
    quiet: bool,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let tree = load_tree(&config, base_dir, file)?;

    if strict && tree.get_category_node(path).is_none() {
        return Err(CategoryAgentError::CategoryNotFound {
            path: path.to_string(),
        });
    }

    let children = tree.get_children(path);
    if children.is_empty() {
        if !quiet {
            eprintln!("{}", format!("No children for: {}", path).dimmed());
        }
        return Ok(());
    }

    for child in children {
        println!("{}", child);
    }
    Ok(())
}

fn handle_categories(base_dir: &Path, file: Option<&Path>) -> Result<()> {
    let config = Config::load(base_dir)?;
    let tree = load_tree(&config, base_dir, file)?;

    for category in tree.get_all_categories() {
        println!("{}", category);
    }
    Ok(())
}

fn handle_classify(
    base_dir: &Path,
    file: Option<&Path>,
    description: &str,
    backend: Option<Backend>,
    model: Option<String>,
    max_steps: Option<usize>,
    json: bool,
) -> Result<()> {
    let config = Config::load(base_dir)?;
    let tree = load_tree(&config, base_dir, file)?;

    let mut llm = config.llm.clone();
    if let Some(backend) = backend {
        llm.backend = match backend {
            Backend::Claude => LlmBackend::Claude,
            Backend::Openai => LlmBackend::OpenAi,
        };
    }
    if model.is_some() {
        llm.model = model;
    }

    let mut options = config.traversal_options();
    if let Some(max_steps) = max_steps {
        options.max_steps = max_steps;
    }

    let maker = LlmDecisionMaker::from_config(&llm, std::env::current_dir()?)?;
    debug!(backend = %maker.backend(), max_steps = options.max_steps, "classifying");

    let agent = CategoryAssignmentAgent::new(tree, maker).with_options(options);
    let result = agent.assign_category(description);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &ClassificationResult) {
    println!();
    println!("{}", "Category Assignment Result:".cyan().bold());
    println!("{}", "-".repeat(60).dimmed());
    println!("  {:<12} {}", "Product:", result.product_description);

    let path = if result.is_unassigned() {
        "(none)".red().to_string()
    } else if result.is_complete {
        result.category_path.green().bold().to_string()
    } else {
        result.category_path.yellow().to_string()
    };
    println!("  {:<12} {}", "Path:", path);
    println!(
        "  {:<12} {}",
        "Confidence:",
        colorize_confidence(result.confidence)
    );
    println!(
        "  {:<12} {}",
        "Complete:",
        if result.is_complete { "yes" } else { "no" }
    );

    if !result.steps.is_empty() {
        println!();
        println!("{}", "Steps:".cyan());
        for step in &result.steps {
            println!(
                "  {}. {} [{}]",
                step.level,
                step.category.bold(),
                colorize_confidence(step.confidence)
            );
            if !step.reasoning.is_empty() {
                println!("     {}", step.reasoning.dimmed());
            }
        }
    }

    println!();
    println!("{}", result.stop_reason.describe());
    println!();
}

fn colorize_confidence(confidence: Confidence) -> String {
    match confidence {
        Confidence::High => confidence.as_str().green().to_string(),
        Confidence::Medium => confidence.as_str().yellow().to_string(),
        Confidence::Low => confidence.as_str().red().to_string(),
    }
}

fn handle_config(action: ConfigAction, base_dir: &Path) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load(base_dir)?;
            match config.get(&key) {
                Some(value) => {
                    println!("{}", value);
                }
                None => {
                    return Err(CategoryAgentError::ConfigKeyNotFound { key });
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load(base_dir)?;
            config.set(&key, &value)?;
            config.save(base_dir)?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
        ConfigAction::List => {
            let config = Config::load(base_dir)?;
            println!();
            for (key, value) in config.list() {
                println!("{} = {}", key.cyan(), value);
            }
            println!();
        }
        ConfigAction::Path => {
            let path = Config::path(base_dir);
            println!("{}", path.display());
        }
        ConfigAction::Init => {
            let path = Config::init(base_dir)?;
            println!("{} {}", "Initialized:".green(), path.display());
        }
    }

    Ok(())
}
