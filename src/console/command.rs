/// A parsed console line. Arguments borrow from the submitted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    Clear,
    About,
    Search(&'a str),
    Lookup(&'a str),
    Unknown(String),
}

/// Split on the first whitespace run: `(lower-cased command, remainder)`.
pub fn split(line: &str) -> (String, &str) {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head.to_lowercase(), rest.trim_start()),
        None => (line.to_lowercase(), ""),
    }
}

/// Returns `None` for blank input.
pub fn parse(line: &str) -> Option<Command<'_>> {
    let (name, args) = split(line);
    let command = match name.as_str() {
        "" => return None,
        "help" => Command::Help,
        "clear" => Command::Clear,
        "about" => Command::About,
        "search" => Command::Search(args),
        "lookup" => Command::Lookup(args),
        _ => Command::Unknown(name),
    };
    Some(command)
}
