/// A command line broken into its spawnable parts.
///
/// `arguments` is empty only when the line was blank or whitespace-only;
/// nothing is spawned for such a line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub arguments: Vec<String>,
    pub input_redirect: Option<String>,
    pub output_redirect: Option<String>,
    pub background: bool,
}

impl ParsedCommand {
    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// The one builtin: a first argument of literally `exit` shuts the
    /// shell down, whatever follows it.
    pub fn is_exit(&self) -> bool {
        self.arguments.first().map(String::as_str) == Some("exit")
    }
}

/// Breaks a raw command line into arguments, redirect targets and the
/// background flag. Never fails: malformed input degrades to fewer tokens,
/// not an error.
///
/// The scan order matters: the background marker truncates the line first,
/// then output and input redirects are extracted, and only the remainder
/// is split into arguments. Markers are plain character matches and are
/// recognized even inside quotes.
pub fn parse(line: &str) -> ParsedCommand {
    // Everything after the first `&` is discarded.
    let (mut rest, background) = match line.find('&') {
        Some(pos) => (line[..pos].to_string(), true),
        None => (line.to_string(), false),
    };

    let output_redirect = extract_redirect(&mut rest, '>');
    let input_redirect = extract_redirect(&mut rest, '<');

    ParsedCommand {
        arguments: split_arguments(&rest),
        input_redirect,
        output_redirect,
        background,
    }
}

/// Removes every `marker` and its target token from the line, returning
/// the last target seen. A marker with no following token is consumed
/// without updating the target.
fn extract_redirect(line: &mut String, marker: char) -> Option<String> {
    let mut target = None;

    while let Some(pos) = line.find(marker) {
        let rest = &line[pos + 1..];
        let skipped = rest.len() - rest.trim_start().len();
        let token: String = rest[skipped..]
            .chars()
            .take_while(|c| !c.is_whitespace())
            .collect();

        let end = pos + 1 + skipped + token.len();
        line.replace_range(pos..end, " ");

        if !token.is_empty() {
            target = Some(token);
        }
    }

    target
}

/// Splits on whitespace, with a double-quote pair grouping one token. The
/// quote characters are consumed; an unterminated quote runs to the end of
/// the line.
fn split_arguments(line: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    arguments.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        arguments.push(current);
    }

    arguments
}
