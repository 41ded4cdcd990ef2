use std::fmt;
use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::Result;
use dialoguer::theme::Theme;
use dialoguer::Input;

const PROMPT: &str = "Sticker pack URL";

/// Renders `<prompt> = ` instead of dialoguer's usual `<prompt>: `.
struct EqualsTheme;

impl Theme for EqualsTheme {
    fn format_input_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        _default: Option<&str>,
    ) -> fmt::Result {
        write!(f, "{prompt} = ")
    }
}

/// Print the prompt to `output` and read a single line from `input`.
/// End of input yields an empty string.
fn read_url(mut input: impl BufRead, mut output: impl Write) -> Result<String> {
    write!(output, "{PROMPT} = ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn pack_url_blocking() -> Result<String> {
    if !(io::stdin().is_terminal() && io::stderr().is_terminal()) {
        return read_url(io::stdin().lock(), io::stdout());
    }
    let url = Input::<String>::with_theme(&EqualsTheme)
        .with_prompt(PROMPT)
        .allow_empty(false)
        .report(false)
        .interact_text()?;
    Ok(url.trim().to_string())
}

/// Ask for the sticker pack URL. Uses an interactive prompt on a terminal
/// and reads one line from stdin otherwise.
pub async fn pack_url() -> Result<String> {
    tokio::task::spawn_blocking(pack_url_blocking).await?
}
