use clap::Parser;
use pwdsync::cli::commands::add::AddArgs;
use pwdsync::cli::{Cli, Commands, Context};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        pwdsync::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Diagnostics go to stderr so stdout stays clean for `show` and
/// `completions`.  `PWDSYNC_LOG` overrides the level filter.
fn init_logging(verbose: bool) {
    let default = if verbose { "pwdsync=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PWDSYNC_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

fn run(cli: &Cli) -> pwdsync::errors::Result<()> {
    use pwdsync::cli::commands;

    // Completions need no directory or config.
    if let Commands::Completions { shell } = cli.command {
        return commands::completions::execute(shell);
    }

    let ctx = Context::load(cli)?;

    match cli.command {
        Commands::Init => commands::init::execute(&ctx),
        Commands::Add {
            ref path,
            ref username,
            ref comment,
            ref value,
            second,
            no_overwrite,
        } => commands::add::execute(
            &ctx,
            &AddArgs {
                path,
                username: username.as_deref(),
                comment: comment.as_deref(),
                value: value.as_deref(),
                second,
                no_overwrite,
            },
        ),
        Commands::Edit {
            ref path,
            ref field,
            ref value,
        } => commands::edit::execute(&ctx, path, field, value.as_deref()),
        Commands::Show { ref path, second } => commands::show::execute(&ctx, path, second),
        Commands::Copy { ref path, second } => commands::copy::execute(&ctx, path, second),
        Commands::List { ref category } => commands::list::execute(&ctx, category.as_deref()),
        Commands::Search { ref query } => commands::search::execute(&ctx, query),
        Commands::History { last } => commands::history::execute(&ctx, last),
        Commands::Merge {
            ref other,
            other_password,
        } => commands::merge::execute(&ctx, other, other_password),
        Commands::Passwd => commands::passwd::execute(&ctx),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
