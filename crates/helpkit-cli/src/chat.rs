//! Terminal rendition of the widget: a line-based chat loop.
//!
//! Typed lines become user messages. `#N` clicks the N-th chip from the
//! previous reply, `/reset` clears the topic and `/quit` ends the loop.

use std::io::{BufRead, Write};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use helpkit_core::{Session, TurnResult};

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?a\b[^>]*>").expect("Invalid regex: anchor tag pattern"));

/// Strip link markup from a formatted reply and undo the entity escaping.
pub fn plain_text(html: &str) -> String {
    TAG_PATTERN
        .replace_all(html, "")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn print_turn<W: Write>(out: &mut W, turn: &TurnResult) -> Result<()> {
    writeln!(out, "bot: {}", plain_text(&turn.reply))?;
    for (i, label) in turn.suggestions.iter().enumerate() {
        writeln!(out, "  [{}] {label}", i + 1)?;
    }
    Ok(())
}

enum Command<'a> {
    Quit,
    Reset,
    Chip(usize),
    Text(&'a str),
}

fn parse_line(line: &str) -> Command<'_> {
    let line = line.trim();
    match line {
        "/quit" | "/exit" => Command::Quit,
        "/reset" => Command::Reset,
        _ => match line.strip_prefix('#').and_then(|n| n.parse::<usize>().ok()) {
            Some(n) => Command::Chip(n),
            None => Command::Text(line),
        },
    }
}

/// Run the chat loop until `/quit` or end of input. Returns the number of
/// turns that produced a reply.
pub fn chat_loop<R: BufRead, W: Write>(
    session: &mut Session,
    reader: R,
    out: &mut W,
) -> Result<usize> {
    let greeting = session.greeting();
    print_turn(out, &greeting)?;
    let mut chips = greeting.suggestions;
    let mut turns = 0;

    for line in reader.lines() {
        let line = line?;
        let turn = match parse_line(&line) {
            Command::Quit => break,
            Command::Reset => {
                session.reset();
                let greeting = session.greeting();
                print_turn(out, &greeting)?;
                chips = greeting.suggestions;
                continue;
            }
            Command::Chip(n) => match n.checked_sub(1).and_then(|i| chips.get(i)) {
                Some(label) => {
                    writeln!(out, "you: {label}")?;
                    session.handle_chip_click(label)
                }
                None => {
                    writeln!(out, "no chip #{n}")?;
                    continue;
                }
            },
            Command::Text(text) => session.handle_user_message(text),
        };

        // blank input is not a turn
        if let Some(turn) = turn {
            print_turn(out, &turn)?;
            chips = turn.suggestions;
            turns += 1;
        }
        out.flush()?;
    }

    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpkit_core::Catalog;
    use std::sync::Arc;

    fn session() -> Session {
        Session::new(Arc::new(Catalog::builtin().unwrap()))
    }

    fn run(input: &str) -> (usize, String) {
        let mut s = session();
        let mut out = Vec::new();
        let turns = chat_loop(&mut s, input.as_bytes(), &mut out).unwrap();
        (turns, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_plain_text_strips_links_and_entities() {
        let html = "Go to <a href=\"/login\">/login</a> &amp; don&#39;t &lt;panic&gt;";
        assert_eq!(plain_text(html), "Go to /login & don't <panic>");
    }

    #[test]
    fn test_chat_text_and_chip() {
        let (turns, out) = run("how do I register\n#2\n/quit\nalumni\n");
        assert_eq!(turns, 2);
        assert!(out.contains("[1] Login"));
        assert!(out.contains("you: Forgot password"));
        assert!(out.contains("Forgot your password?"));
        // nothing after /quit
        assert!(!out.contains("Open the Alumni page"));
    }

    #[test]
    fn test_chat_blank_lines_are_skipped() {
        let (turns, _) = run("\n   \nalumni\n");
        assert_eq!(turns, 1);
    }

    #[test]
    fn test_chat_bad_chip_number() {
        let (turns, out) = run("#0\n#99\n");
        assert_eq!(turns, 0);
        assert!(out.contains("no chip #0"));
        assert!(out.contains("no chip #99"));
    }

    #[test]
    fn test_chat_reset_shows_greeting_again() {
        let (_, out) = run("alumni\n/reset\n");
        assert_eq!(out.matches("bot: Hi!").count(), 2);
    }
}
