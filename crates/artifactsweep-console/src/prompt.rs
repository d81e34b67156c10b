/// Operator interaction: the delete confirmation and the exit pause.
use std::io::{self, BufRead, Write};

pub const CONFIRM_PROMPT: &str = "Delete directories and files? (Y/N)";
pub const PAUSE_PROMPT: &str = "Press Enter to continue ...";

/// `true` only for a `y` or `Y`, surrounding whitespace ignored.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Ask for confirmation and read one line. End of input means no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<bool> {
    write!(out, "{CONFIRM_PROMPT}  ")?;
    out.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        writeln!(out)?;
        return Ok(false);
    }
    Ok(is_affirmative(&answer))
}

/// Block until a line (or end of input) arrives.
pub fn wait_for_enter<R: BufRead, W: Write>(input: &mut R, out: &mut W) -> io::Result<()> {
    writeln!(out, "{PAUSE_PROMPT}")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}
