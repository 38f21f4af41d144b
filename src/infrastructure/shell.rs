//! Shell quoting for commands sent to the remote shell and for log lines.

/// Quote a single argument for POSIX `sh`.
///
/// Plain words pass through; anything else is single-quoted with embedded
/// quotes escaped as `'\''`.
pub fn quote(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }

    let plain = arg
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b"-_./=:@%+,".contains(&b));
    if plain {
        return arg.to_string();
    }

    format!("'{}'", arg.replace('\'', "'\\''"))
}

/// Quote and join a program and its arguments
pub fn join<I, S>(words: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| quote(w.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Quote a remote path, leaving a leading `~/` unquoted so the remote
/// shell still expands it.
pub fn quote_path(path: &str) -> String {
    match path.strip_prefix("~/") {
        Some(rest) if !rest.is_empty() => format!("~/{}", quote(rest)),
        _ if path == "~" || path == "~/" => "~".to_string(),
        _ => quote(path),
    }
}

/// Whether `name` is usable as a shell variable name
pub fn is_env_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}
