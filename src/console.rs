//! Operator interaction on the terminal
//!
//! Startup prompts (seed query, resume confirmation) read whole lines from
//! stdin. During a campaign, a background thread listens for `r` and fires
//! the stalled-page retry trigger.

use crate::campaign::{retry_channel, RetrySignal};
use std::io::{self, BufRead, IsTerminal, Write};

/// Prints `prompt` and reads one trimmed line
///
/// Returns `None` at end of input.
pub fn prompt_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Interprets a yes/no answer
pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

/// Asks a yes/no question until it gets an answer
///
/// End of input counts as "no".
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool> {
    loop {
        let Some(answer) = prompt_line(input, output, &format!("{} (y/n): ", question))? else {
            return Ok(false);
        };
        match parse_yes_no(&answer) {
            Some(yes) => return Ok(yes),
            None => writeln!(output, "Please answer 'y' or 'n'.")?,
        }
    }
}

/// Asks for a non-empty seed query
///
/// Returns `None` at end of input.
pub fn prompt_seed<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Option<String>> {
    loop {
        match prompt_line(input, output, "Enter the seed search query: ")? {
            None => return Ok(None),
            Some(seed) if seed.is_empty() => writeln!(output, "The seed query cannot be empty.")?,
            Some(seed) => return Ok(Some(seed)),
        }
    }
}

/// Returns true if `line` asks for an immediate retry
pub fn is_retry_request(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("r")
}

/// Starts listening for retry requests on stdin
///
/// Returns `None` when stdin is not a terminal, in which case stalled-page
/// pauses always run their full length.
pub fn spawn_retry_listener() -> Option<RetrySignal> {
    if !io::stdin().is_terminal() {
        tracing::debug!("stdin is not a terminal; retry-now signal disabled");
        return None;
    }

    let (trigger, signal) = retry_channel();
    let spawned = std::thread::Builder::new()
        .name("retry-listener".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if is_retry_request(&line) && !trigger.fire() {
                    break;
                }
            }
        });

    match spawned {
        Ok(_) => Some(signal),
        Err(e) => {
            tracing::warn!("Could not start retry listener: {}", e);
            None
        }
    }
}
