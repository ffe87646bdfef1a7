use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

#[derive(Debug, clap::Args)]
pub struct CompletionsArgs {
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn emit(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout().lock())
}

fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = crate::Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    Ok(())
}
