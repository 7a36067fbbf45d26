use clap::Parser;
use log::LevelFilter;
use miette::Result;

use craftdex::cli::{Cli, Commands, GlobalOpts};

fn init_logging(global: &GlobalOpts) {
    let level = if global.verbose {
        LevelFilter::Debug
    } else if global.quiet {
        LevelFilter::Error
    } else {
        LevelFilter::Warn
    };
    // RUST_LOG, when set, overrides the flag-derived level
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior so piping into `head` exits quietly
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
    init_logging(&global);

    match cli.command {
        Commands::List(args) => craftdex::cli::commands::list::run(args, &global),
        Commands::Show(args) => craftdex::cli::commands::show::run(args, &global),
        Commands::Cache(cmd) => craftdex::cli::commands::cache::run(cmd, &global),
        Commands::Completions(args) => craftdex::cli::commands::completions::run(args),
    }
}
