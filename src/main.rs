use clap::Parser;
use miette::Result;
use rollaudit::cli::{init_tracing, Cli};

fn main() -> Result<()> {
    // Terminate quietly on a closed pipe (`rollaudit audit doc.json | head`)
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
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.quiet, cli.global.verbose)?;
    rollaudit::cli::run(cli)
}
