//! `scaf completions` command - Shell completion scripts
//!
//! ```bash
//! source <(scaf completions bash)
//! scaf completions fish > ~/.config/fish/completions/scaf.fish
//! ```

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use miette::Result;
use std::io::{self, Write};

use crate::cli::Cli;

#[derive(clap::Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    render(args.shell, &mut io::stdout());
    Ok(())
}

fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_completions_cover_subcommands() {
        let mut buf = Vec::new();
        render(Shell::Bash, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("scaf"));
        assert!(script.contains("calc"));
        assert!(script.contains("withdraw"));
    }
}
