use clap::Parser;
use miette::Result;
use scaf::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Restore default SIGPIPE so piping into `head` exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => scaf::cli::commands::init::run(args),
        Commands::Part(cmd) => scaf::cli::commands::part::run(cmd, &global),
        Commands::Withdraw(cmd) => scaf::cli::commands::withdraw::run(cmd, &global),
        Commands::Calc(args) => scaf::cli::commands::calc::run(args, &global),
        Commands::Reset(args) => scaf::cli::commands::reset::run(args, &global),
        Commands::Report(cmd) => scaf::cli::commands::report::run(cmd, &global),
        Commands::Categorize(args) => scaf::cli::commands::categorize::run(args, &global),
        Commands::Segment(args) => scaf::cli::commands::segment::run(args, &global),
        Commands::Config(cmd) => scaf::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => scaf::cli::commands::completions::run(args),
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "scaf=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
