// parser.rs

use crate::error::{Result, ShellError};

/// Splits a command line into words with POSIX-like quoting: single quotes are
/// literal, double quotes allow `\\`, `\"` and `\$` escapes, a bare backslash
/// escapes the next character. An unterminated quote is an error.
pub fn split_words(line: &str) -> Result<Vec<String>> {
    enum State { Normal, Single, Double }
    let mut tokens = Vec::new();
    let mut cur = String::new();
    // `""` is still a word even though it adds no characters
    let mut quoted = false;
    let mut state = State::Normal;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match state {
            State::Normal => match ch {
                '\'' => {
                    state = State::Single;
                    quoted = true;
                }
                '"' => {
                    state = State::Double;
                    quoted = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        cur.push(next);
                    }
                }
                c if c.is_whitespace() => {
                    if !cur.is_empty() || quoted {
                        tokens.push(std::mem::take(&mut cur));
                        quoted = false;
                    }
                }
                _ => cur.push(ch),
            },
            State::Single => match ch {
                '\'' => state = State::Normal,
                _ => cur.push(ch),
            },
            State::Double => match ch {
                '"' => state = State::Normal,
                '\\' => match chars.peek() {
                    Some(&next @ ('\\' | '"' | '$')) => {
                        cur.push(next);
                        chars.next();
                    }
                    _ => cur.push('\\'),
                },
                _ => cur.push(ch),
            },
        }
    }
    match state {
        State::Normal => {}
        State::Single => return Err(ShellError::Parse("unterminated single quote".into())),
        State::Double => return Err(ShellError::Parse("unterminated double quote".into())),
    }
    if !cur.is_empty() || quoted {
        tokens.push(cur);
    }
    Ok(tokens)
}

/// Command name (lowercased) and its arguments, or `None` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<(String, Vec<String>)>> {
    let mut words = split_words(line)?.into_iter();
    Ok(words.next().map(|cmd| (cmd.to_lowercase(), words.collect())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(split_words("  cp  -r a   b ").unwrap(), ["cp", "-r", "a", "b"]);
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(split_words(r#"mv "my file.txt" 'other dir'/x"#).unwrap(), ["mv", "my file.txt", "other dir/x"]);
        assert_eq!(split_words(r#"grep "a\"b" 'c\d'"#).unwrap(), ["grep", "a\"b", "c\\d"]);
        assert_eq!(split_words(r"cat my\ file").unwrap(), ["cat", "my file"]);
        assert_eq!(split_words(r#"zip "" x"#).unwrap(), ["zip", "", "x"]);
    }

    #[test]
    fn unterminated_quote_is_a_parse_error() {
        assert_eq!(split_words("cat \"oops").unwrap_err().kind(), ErrorKind::Parse);
        assert_eq!(split_words("cat 'oops").unwrap_err().kind(), ErrorKind::Parse);
    }

    #[test]
    fn command_name_is_lowercased() {
        let (cmd, args) = parse_command("LS -l Docs").unwrap().unwrap();
        assert_eq!(cmd, "ls");
        assert_eq!(args, ["-l", "Docs"]);
        assert!(parse_command("   ").unwrap().is_none());
    }
}
